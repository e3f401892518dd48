use clap::Subcommand;
use sis_core::{Database, Repository};

use super::print_json;

#[derive(Subcommand)]
pub enum EducatorAction {
    /// Add an educator
    Add {
        first_name: String,
        last_name: String,
        /// Academic title, e.g. "dr"
        #[arg(long)]
        title: Option<String>,
    },
    /// List all educators
    List,
    /// Find educators by last name, `%` matches anything
    Find { last_name: String },
}

pub fn run(action: EducatorAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        EducatorAction::Add {
            first_name,
            last_name,
            title,
        } => {
            let educator = db.add_educator(title.as_deref(), &first_name, &last_name)?;
            print_json(&educator)?;
        }
        EducatorAction::List => {
            print_json(&db.list_educators()?)?;
        }
        EducatorAction::Find { last_name } => {
            print_json(&db.find_educators(&last_name)?)?;
        }
    }
    Ok(())
}
