//! Substitution commands for CLI.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use sis_core::repository::{resolve_educator, resolve_group};
use sis_core::{Config, Database, EducatorId, Part, Reconciler, Substitution, SubstitutionTable};

use super::{active_schedules, date_or_next_working_day, print_json};

#[derive(Subcommand)]
pub enum SubsAction {
    /// Record a substitution; without --teacher the group is released
    Add {
        /// Class full name, e.g. "2b"
        group: String,
        /// Lesson order (1-8)
        order: u8,
        /// Date (YYYY-MM-DD), defaults to the next working day
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Group part (1 or 2), the whole group when omitted
        #[arg(long)]
        part: Option<u8>,
        /// Last name of the covering educator
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// List substitutions
    List {
        /// Only substitutions on or after this date
        #[arg(long)]
        since: Option<NaiveDate>,
    },
    /// Delete a substitution by id
    Delete { id: i64 },
    /// Before/after/released table of one day
    Table {
        /// Date (YYYY-MM-DD), defaults to the next working day
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct TableOutput {
    #[serde(flatten)]
    table: SubstitutionTable,
    /// Display names of every educator in the table.
    names: BTreeMap<EducatorId, String>,
}

pub fn run(action: SubsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SubsAction::Add {
            group,
            order,
            date,
            part,
            teacher,
            comment,
        } => {
            let group = resolve_group(&db, &group)?;
            let teacher = teacher
                .map(|t| resolve_educator(&db, &t))
                .transpose()?
                .map(|e| e.id);
            let mut sub = Substitution {
                id: 0,
                date: date_or_next_working_day(date),
                order,
                group: group.id,
                part: Part::from_number(part)?,
                teacher,
                comment,
            };
            sub.id = db.add_substitution(&sub)?;
            print_json(&sub)?;
        }
        SubsAction::List { since } => {
            print_json(&db.list_substitutions(since)?)?;
        }
        SubsAction::Delete { id } => {
            if !db.delete_substitution(id)? {
                return Err(format!("substitution {id} not found").into());
            }
            println!("deleted substitution {id}");
        }
        SubsAction::Table { date } => {
            let config = Config::load()?;
            let schedules = active_schedules(&db, &config)?;
            let table = Reconciler::new(&db)
                .with_schedules(&schedules)
                .table_for(date_or_next_working_day(date))?;

            let mut names = BTreeMap::new();
            for id in table.educators() {
                if let Some(educator) = db.get_educator(id)? {
                    names.insert(id, educator.name_with_title());
                }
            }
            print_json(&TableOutput { table, names })?;
        }
    }
    Ok(())
}
