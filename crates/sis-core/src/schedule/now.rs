//! Lookup of what a person is attending at a given period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Timetable;
use crate::calendar::SchoolDay;
use crate::error::Result;
use crate::model::{Lesson, Person};
use crate::repository::{find_people, Repository};

/// Outcome of [`Timetable::now`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NowAnswer {
    /// Exactly one person matched. `order` is `None` outside lesson time.
    Found {
        person: Person,
        day: Option<SchoolDay>,
        order: Option<u8>,
        lessons: Vec<Lesson>,
    },
    /// Nobody, or more than one person, matched the name.
    Matches { people: Vec<Person> },
}

impl<'r, R: Repository + ?Sized> Timetable<'r, R> {
    /// Resolve `last_name` among students and educators and list what the
    /// single match attends at `order` of `day`.
    pub fn now(
        &self,
        last_name: &str,
        date: NaiveDate,
        day: Option<SchoolDay>,
        order: Option<u8>,
    ) -> Result<NowAnswer> {
        let mut people = find_people(self.repo, last_name)?;
        if people.len() != 1 {
            tracing::debug!(query = last_name, matches = people.len(), "no single match");
            return Ok(NowAnswer::Matches { people });
        }
        let person = people.remove(0);
        let lessons = match (day, order) {
            (Some(day), Some(order)) => self.person_lessons_at(&person, date, day, order)?,
            _ => Vec::new(),
        };
        Ok(NowAnswer::Found {
            person,
            day,
            order,
            lessons,
        })
    }

    pub fn person_lessons_at(
        &self,
        person: &Person,
        date: NaiveDate,
        day: SchoolDay,
        order: u8,
    ) -> Result<Vec<Lesson>> {
        match person {
            Person::Student(student) => self.student_lessons_at(student.id, date, day, order),
            Person::Educator(educator) => self.educator_lessons_at(educator.id, day, order),
        }
    }
}
