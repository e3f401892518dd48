//! What a student or educator attends right now, by the bell schedule.

use chrono::{Local, NaiveDate, NaiveTime};
use clap::Args;
use sis_core::{Config, Database, SchoolDay, Timetable};

use super::{active_schedules, print_json};

#[derive(Args)]
pub struct NowArgs {
    /// Student or educator last name, `%` matches anything
    last_name: String,
    /// Date used for group memberships (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Day of week (mon..fri), defaults to the day of `--date`
    #[arg(long)]
    day: Option<SchoolDay>,
    /// Time of day (HH:MM), defaults to now
    #[arg(long)]
    at: Option<String>,
}

pub fn run(args: NowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let bells = config.bell_schedule()?;

    let now = Local::now().naive_local();
    let time = match args.at {
        Some(at) => NaiveTime::parse_from_str(&at, "%H:%M")?,
        None => now.time(),
    };
    let date = args.date.unwrap_or(now.date());
    let day = args.day.or_else(|| SchoolDay::from_date(date));
    let order = bells.current_order(time);

    let schedules = active_schedules(&db, &config)?;
    let answer = Timetable::new(&db)
        .with_schedules(&schedules)
        .now(&args.last_name, date, day, order)?;
    print_json(&answer)
}
