use chrono::{Local, NaiveDate};
use clap::Subcommand;
use sis_core::repository::resolve_group;
use sis_core::{Database, GroupMembership, MembershipQuery, Part, Repository, StudentId};

use super::print_json;

#[derive(Subcommand)]
pub enum StudentAction {
    /// Add a student
    Add { first_name: String, last_name: String },
    /// List all students
    List,
    /// Find students by last name, `%` matches anything
    Find { last_name: String },
    /// Put a student into one half of a group
    Join {
        student: i64,
        /// Group full name, e.g. "2b"
        group: String,
        /// Half of the group: 1 or 2
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        part: u8,
        /// First day of membership (YYYY-MM-DD), defaults to today
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Last day of membership (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Groups a student belongs to
    Groups { student: i64 },
}

pub fn run(action: StudentAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StudentAction::Add {
            first_name,
            last_name,
        } => {
            print_json(&db.add_student(&first_name, &last_name)?)?;
        }
        StudentAction::List => print_json(&db.list_students()?)?,
        StudentAction::Find { last_name } => print_json(&db.find_students(&last_name)?)?,
        StudentAction::Join {
            student,
            group,
            part,
            since,
            until,
        } => {
            let membership = GroupMembership {
                student: StudentId(student),
                group: resolve_group(&db, &group)?.id,
                part: Part::from_number(Some(part))?,
                since: since.unwrap_or_else(|| Local::now().date_naive()),
                until,
                active: true,
            };
            db.add_membership(&membership)?;
            print_json(&membership)?;
        }
        StudentAction::Groups { student } => {
            let query = MembershipQuery::for_student(StudentId(student));
            print_json(&db.find_memberships(&query)?)?;
        }
    }
    Ok(())
}
