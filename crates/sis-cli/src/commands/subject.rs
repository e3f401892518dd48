use clap::Subcommand;
use sis_core::Database;

use super::print_json;

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject (no-op when it exists)
    Add { name: String },
    /// List all subjects
    List,
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SubjectAction::Add { name } => print_json(&db.ensure_subject(&name)?)?,
        SubjectAction::List => print_json(&db.list_subjects()?)?,
    }
    Ok(())
}
