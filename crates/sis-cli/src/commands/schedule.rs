//! Timetable views for CLI.

use clap::Subcommand;
use sis_core::repository::{resolve_educator, resolve_group};
use sis_core::schedule::room_conflicts;
use sis_core::{Config, Database, LessonQuery, Repository, SchoolDay, Timetable};

use super::{active_schedules, print_json};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Timetable of a class, e.g. "2b"
    Group {
        /// Class full name
        name: String,
        /// One day (mon..fri); the whole week when omitted
        #[arg(long)]
        day: Option<SchoolDay>,
        /// Course to merge into the class timetable, e.g. "2x"
        #[arg(long)]
        course: Option<String>,
    },
    /// Timetable of an educator
    Teacher {
        /// Last name, `%` matches anything
        last_name: String,
        /// One day (mon..fri); the whole week when omitted
        #[arg(long)]
        day: Option<SchoolDay>,
    },
    /// Rooms booked by more than one lesson at once
    Rooms,
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let schedules = active_schedules(&db, &config)?;
    let timetable = Timetable::new(&db).with_schedules(&schedules);

    match action {
        ScheduleAction::Group { name, day, course } => {
            let group = resolve_group(&db, &name)?;
            let course = course.map(|c| resolve_group(&db, &c)).transpose()?;
            match (day, course) {
                (Some(day), Some(course)) => {
                    print_json(&timetable.group_with_course_day(group.id, course.id, day)?)?
                }
                (Some(day), None) => print_json(&timetable.group_day(group.id, day)?)?,
                (None, Some(course)) => {
                    print_json(&timetable.group_with_course_week(group.id, course.id)?)?
                }
                (None, None) => print_json(&timetable.group_week(group.id)?)?,
            }
        }
        ScheduleAction::Teacher { last_name, day } => {
            let educator = resolve_educator(&db, &last_name)?;
            match day {
                Some(day) => print_json(&timetable.educator_day(educator.id, day)?)?,
                None => print_json(&timetable.educator_week(educator.id)?)?,
            }
        }
        ScheduleAction::Rooms => {
            let lessons = db.find_lessons(&LessonQuery::default().in_schedules(&schedules))?;
            print_json(&room_conflicts(&lessons, &config.rooms.shared))?;
        }
    }
    Ok(())
}
