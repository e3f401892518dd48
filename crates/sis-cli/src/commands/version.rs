//! Timetable version commands for CLI.

use clap::Subcommand;
use sis_core::{Database, ScheduleId};

use super::print_json;

#[derive(Subcommand)]
pub enum VersionAction {
    /// Add a timetable version
    Add {
        /// Label, e.g. "2024/25 autumn"
        label: String,
        /// Create the version without activating it
        #[arg(long)]
        inactive: bool,
    },
    /// List all versions
    List,
    /// Mark a version active
    Activate { id: i64 },
    /// Mark a version inactive
    Deactivate { id: i64 },
}

fn set_active(db: &Database, id: i64, active: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !db.set_schedule_active(ScheduleId(id), active)? {
        return Err(format!("timetable version {id} not found").into());
    }
    print_json(&db.list_schedules()?)
}

pub fn run(action: VersionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        VersionAction::Add { label, inactive } => {
            print_json(&db.add_schedule(&label, !inactive)?)?;
        }
        VersionAction::List => print_json(&db.list_schedules()?)?,
        VersionAction::Activate { id } => set_active(&db, id, true)?,
        VersionAction::Deactivate { id } => set_active(&db, id, false)?,
    }
    Ok(())
}
