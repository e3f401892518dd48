//! School calendar helpers: weekdays, working days and the bell schedule.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A teaching day. Monday is index 0, Friday is index 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    /// Day index as stored with lessons (0..=4).
    pub fn index(self) -> u8 {
        match self {
            SchoolDay::Monday => 0,
            SchoolDay::Tuesday => 1,
            SchoolDay::Wednesday => 2,
            SchoolDay::Thursday => 3,
            SchoolDay::Friday => 4,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Teaching day of a calendar date, `None` on weekends.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Mon => Some(SchoolDay::Monday),
            Weekday::Tue => Some(SchoolDay::Tuesday),
            Weekday::Wed => Some(SchoolDay::Wednesday),
            Weekday::Thu => Some(SchoolDay::Thursday),
            Weekday::Fri => Some(SchoolDay::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    /// Like [`SchoolDay::from_date`] but treats weekends as malformed input.
    pub fn of_date(date: NaiveDate) -> Result<Self, ValidationError> {
        Self::from_date(date).ok_or(ValidationError::WeekendDate(date))
    }

    pub fn short_name(self) -> &'static str {
        match self {
            SchoolDay::Monday => "mon",
            SchoolDay::Tuesday => "tue",
            SchoolDay::Wednesday => "wed",
            SchoolDay::Thursday => "thu",
            SchoolDay::Friday => "fri",
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for SchoolDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(SchoolDay::Monday),
            "tue" | "tuesday" => Ok(SchoolDay::Tuesday),
            "wed" | "wednesday" => Ok(SchoolDay::Wednesday),
            "thu" | "thursday" => Ok(SchoolDay::Thursday),
            "fri" | "friday" => Ok(SchoolDay::Friday),
            other => Err(ValidationError::InvalidValue {
                field: "day".to_string(),
                message: format!("'{other}' is not one of mon, tue, wed, thu, fri"),
            }),
        }
    }
}

/// The closest working day after `date`, never `date` itself.
///
/// Monday to Thursday advance by one day; Friday, Saturday and Sunday all
/// land on the following Monday.
pub fn closest_working_day(date: NaiveDate) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_monday());
    let step = if weekday < 4 { 1 } else { 7 - weekday };
    date + Duration::days(step)
}

/// Lesson start times for one school day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellSchedule {
    starts: Vec<NaiveTime>,
    lesson_length: Duration,
}

impl BellSchedule {
    /// Build a schedule from start times (sorted here) and a lesson length.
    pub fn new(mut starts: Vec<NaiveTime>, lesson_minutes: u32) -> Self {
        starts.sort();
        Self {
            starts,
            lesson_length: Duration::minutes(i64::from(lesson_minutes)),
        }
    }

    /// Parse `HH:MM` start times.
    pub fn parse(starts: &[String], lesson_minutes: u32) -> Result<Self, ValidationError> {
        let parsed = starts
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| ValidationError::InvalidValue {
                    field: "bells.starts".to_string(),
                    message: format!("'{s}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed, lesson_minutes))
    }

    pub fn starts(&self) -> &[NaiveTime] {
        &self.starts
    }

    /// Lesson order in progress at `now`.
    ///
    /// Counts the bells that already rang, so a break reports the lesson
    /// that just ended. `None` before the first bell and after the last
    /// lesson is over.
    pub fn current_order(&self, now: NaiveTime) -> Option<u8> {
        let first = *self.starts.first()?;
        let last = *self.starts.last()?;
        if now < first || now >= last + self.lesson_length {
            return None;
        }
        let rang = self.starts.iter().take_while(|start| **start <= now).count();
        u8::try_from(rang).ok()
    }
}

impl Default for BellSchedule {
    fn default() -> Self {
        let starts = [(7, 55), (8, 55), (10, 0), (10, 55), (12, 0), (12, 55), (13, 50), (14, 45)]
            .iter()
            .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect();
        Self::new(starts, 45)
    }
}
