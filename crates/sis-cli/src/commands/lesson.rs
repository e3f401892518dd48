//! Canonical lesson commands for CLI.

use clap::Subcommand;
use sis_core::repository::{resolve_educator, resolve_group};
use sis_core::{
    Config, Database, Lesson, LessonQuery, Part, Repository, ScheduleId, SchoolDay,
};

use super::{active_schedules, print_json};

#[derive(Subcommand)]
pub enum LessonAction {
    /// Add a weekly lesson
    Add {
        /// Class full name, e.g. "2b"
        group: String,
        /// Subject name, created when missing
        subject: String,
        /// Educator last name
        teacher: String,
        /// Day of week (mon..fri)
        day: SchoolDay,
        /// Lesson order (1-8)
        order: u8,
        room: u16,
        /// Group part (1 or 2), the whole group when omitted
        #[arg(long)]
        part: Option<u8>,
        /// Timetable version id, defaults to the first active one
        #[arg(long)]
        version: Option<i64>,
    },
    /// List lessons of the active timetable versions
    List {
        #[arg(long)]
        group: Option<String>,
        /// Educator last name
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        day: Option<SchoolDay>,
    },
    /// Delete a lesson by id
    Delete { id: i64 },
}

pub fn run(action: LessonAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        LessonAction::Add {
            group,
            subject,
            teacher,
            day,
            order,
            room,
            part,
            version,
        } => {
            let schedule = match version {
                Some(id) => ScheduleId(id),
                None => db
                    .active_schedules()?
                    .first()
                    .copied()
                    .ok_or("no active timetable version, add one with `sis version add`")?,
            };
            let mut lesson = Lesson {
                id: 0,
                schedule,
                group: resolve_group(&db, &group)?.id,
                part: Part::from_number(part)?,
                subject: db.ensure_subject(&subject)?.id,
                teacher: resolve_educator(&db, &teacher)?.id,
                day,
                order,
                room,
            };
            lesson.id = db.add_lesson(&lesson)?;
            print_json(&lesson)?;
        }
        LessonAction::List {
            group,
            teacher,
            day,
        } => {
            let config = Config::load()?;
            let query = LessonQuery {
                group: group.map(|g| resolve_group(&db, &g)).transpose()?.map(|g| g.id),
                teacher: teacher
                    .map(|t| resolve_educator(&db, &t))
                    .transpose()?
                    .map(|e| e.id),
                day,
                order: None,
                schedules: active_schedules(&db, &config)?,
            };
            print_json(&db.find_lessons(&query)?)?;
        }
        LessonAction::Delete { id } => {
            if !db.delete_lesson(id)? {
                return Err(format!("lesson {id} not found").into());
            }
            println!("deleted lesson {id}");
        }
    }
    Ok(())
}
