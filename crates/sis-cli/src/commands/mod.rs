pub mod config;
pub mod educator;
pub mod group;
pub mod lesson;
pub mod lucky;
pub mod now;
pub mod schedule;
pub mod student;
pub mod subject;
pub mod subs;
pub mod version;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sis_core::{closest_working_day, Config, Database, ScheduleId};

/// Timetable versions views should read: the configured ones, else every
/// version marked active.
pub(crate) fn active_schedules(
    db: &Database,
    config: &Config,
) -> Result<Vec<ScheduleId>, sis_core::CoreError> {
    let versions = match config.schedule_versions() {
        Some(versions) => versions,
        None => db.active_schedules()?,
    };
    tracing::debug!(?versions, "reading timetable versions");
    Ok(versions)
}

/// `date`, or the closest working day after today.
pub(crate) fn date_or_next_working_day(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| closest_working_day(Local::now().date_naive()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
