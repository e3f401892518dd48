//! Lucky number commands for CLI.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use sis_core::lucky::{current, current_week, draw, max_number, remaining};
use sis_core::{Config, Database, LuckyNumber, MembershipQuery, Repository};

use super::{date_or_next_working_day, print_json};

#[derive(Subcommand)]
pub enum LuckyAction {
    /// Number shown right now
    Current,
    /// Numbers of this week (or the next one)
    Week,
    /// Numbers not yet drawn in this cycle
    Left,
    /// Draw and store a number
    Draw {
        /// Date (YYYY-MM-DD), defaults to the next working day
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Store a chosen number
    Add {
        number: u16,
        /// Date (YYYY-MM-DD), defaults to the next working day
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: LuckyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let history = db.lucky_numbers()?;
    let now = Local::now().naive_local();
    let memberships = db.find_memberships(&MembershipQuery::default())?;
    let max = max_number(&memberships, now.date(), config.lucky.fallback_max);

    match action {
        LuckyAction::Current => {
            print_json(&current(&history, config.lucky.change_hour, now))?;
        }
        LuckyAction::Week => {
            print_json(&current_week(&history, config.lucky.change_hour, now))?;
        }
        LuckyAction::Left => print_json(&remaining(max, &history))?,
        LuckyAction::Draw { date } => {
            let number = draw(max, &history, &mut rand::thread_rng())
                .first()
                .copied()
                .ok_or("no lucky numbers left to draw")?;
            let lucky = LuckyNumber {
                date: date_or_next_working_day(date),
                number,
            };
            db.add_lucky_number(&lucky)?;
            print_json(&lucky)?;
        }
        LuckyAction::Add { number, date } => {
            if number == 0 || number > max {
                return Err(format!("lucky number must be between 1 and {max}").into());
            }
            let lucky = LuckyNumber {
                date: date_or_next_working_day(date),
                number,
            };
            db.add_lucky_number(&lucky)?;
            print_json(&lucky)?;
        }
    }
    Ok(())
}
