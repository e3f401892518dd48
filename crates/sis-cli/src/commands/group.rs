use clap::Subcommand;
use sis_core::{Database, Group, Repository};

use super::print_json;

#[derive(Subcommand)]
pub enum GroupAction {
    /// Add a class ("2b") or course ("2x")
    Add {
        /// Full name: year digit followed by the name
        name: String,
    },
    /// List all groups
    List,
}

pub fn run(action: GroupAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        GroupAction::Add { name } => {
            let (year, short) = Group::split_full_name(&name)?;
            let group = db.add_group(short, year)?;
            print_json(&group)?;
        }
        GroupAction::List => {
            print_json(&db.find_groups()?)?;
        }
    }
    Ok(())
}
