//! Domain records: groups, educators, lessons and substitutions.
//!
//! These are plain values. Persistence lives in [`crate::storage`] and the
//! data-access seam is [`crate::repository::Repository`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::SchoolDay;
use crate::error::ValidationError;

/// Highest lesson order in a school day.
pub const MAX_ORDER: u8 = 8;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a class or course.
    GroupId
);
id_type!(
    /// Identifier of a teacher.
    EducatorId
);
id_type!(
    /// Identifier of a student.
    StudentId
);
id_type!(SubjectId);
id_type!(
    /// Identifier of a timetable version (e.g. the autumn and spring plans).
    ScheduleId
);

/// Which half of a group a lesson or substitution concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    /// The entire group.
    Whole,
    First,
    Second,
}

impl Part {
    /// Decode the two-flag storage encoding.
    ///
    /// `(false, false)` selects nobody and has no `Part`.
    pub fn from_flags(first: bool, second: bool) -> Option<Self> {
        match (first, second) {
            (true, true) => Some(Part::Whole),
            (true, false) => Some(Part::First),
            (false, true) => Some(Part::Second),
            (false, false) => None,
        }
    }

    pub fn to_flags(self) -> (bool, bool) {
        match self {
            Part::Whole => (true, true),
            Part::First => (true, false),
            Part::Second => (false, true),
        }
    }

    /// Decode the numeric form used on the command line (`None`/0, 1, 2).
    pub fn from_number(number: Option<u8>) -> Result<Self, ValidationError> {
        match number {
            None | Some(0) => Ok(Part::Whole),
            Some(1) => Ok(Part::First),
            Some(2) => Ok(Part::Second),
            Some(other) => Err(ValidationError::OutOfRange {
                field: "part".to_string(),
                value: i64::from(other),
                min: 0,
                max: 2,
            }),
        }
    }

    pub fn number(self) -> Option<u8> {
        match self {
            Part::Whole => None,
            Part::First => Some(1),
            Part::Second => Some(2),
        }
    }

    /// The other half, `None` for the whole group.
    pub fn opposite(self) -> Option<Self> {
        match self {
            Part::Whole => None,
            Part::First => Some(Part::Second),
            Part::Second => Some(Part::First),
        }
    }

    /// Whether students of `other` attend something held for `self`.
    pub fn covers(self, other: Part) -> bool {
        self == Part::Whole || self == other
    }

    pub fn is_whole(self) -> bool {
        self == Part::Whole
    }

    /// Sort rank: whole group first, then part 1, then part 2.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Part::Whole => 0,
            Part::First => 1,
            Part::Second => 2,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "{n}"),
            None => Ok(()),
        }
    }
}

/// A class (`"2b"`) or a course shared by all classes of a year (`"2x"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Year index, 1 for first-year students.
    pub year: u8,
}

impl Group {
    pub fn full_name(&self) -> String {
        format!("{}{}", self.year, self.name)
    }

    /// Courses carry a single-letter name.
    pub fn is_course(&self) -> bool {
        self.name.chars().count() == 1
    }

    /// Split `"2b"` into `(2, "b")`.
    pub fn split_full_name(full_name: &str) -> Result<(u8, &str), ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            field: "group".to_string(),
            message: format!("'{full_name}' is not '<year><name>'"),
        };
        let mut chars = full_name.char_indices();
        let (_, first) = chars.next().ok_or_else(invalid)?;
        let year = first.to_digit(10).ok_or_else(invalid)?;
        let rest = chars.next().map(|(i, _)| &full_name[i..]).ok_or_else(invalid)?;
        Ok((year as u8, rest))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Educator {
    pub id: EducatorId,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl Educator {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn name_with_title(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} {}", self.name()),
            None => self.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A student attending one half of a group over a period of time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub student: StudentId,
    pub group: GroupId,
    /// `First` or `Second`; every student sits in one half.
    pub part: Part,
    pub since: NaiveDate,
    /// Last day of membership, open-ended when `None`.
    #[serde(default)]
    pub until: Option<NaiveDate>,
    pub active: bool,
}

impl GroupMembership {
    /// Whether the membership holds on `date`.
    pub fn is_current(&self, date: NaiveDate) -> bool {
        self.active && self.since <= date && self.until.map_or(true, |until| date <= until)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.part.is_whole() {
            return Err(ValidationError::InvalidValue {
                field: "part".to_string(),
                message: "a membership belongs to part 1 or part 2".to_string(),
            });
        }
        match self.until {
            Some(until) if until < self.since => Err(ValidationError::InvalidValue {
                field: "until".to_string(),
                message: format!("{until} is before {}", self.since),
            }),
            _ => Ok(()),
        }
    }
}

/// Anyone a name lookup can find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Person {
    Student(Student),
    Educator(Educator),
}

impl Person {
    pub fn name(&self) -> String {
        match self {
            Person::Student(student) => student.name(),
            Person::Educator(educator) => educator.name_with_title(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

/// A timetable version; lessons belong to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    pub id: ScheduleId,
    pub label: String,
    pub active: bool,
}

/// A weekly recurring lesson of the canonical timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub schedule: ScheduleId,
    pub group: GroupId,
    pub part: Part,
    pub subject: SubjectId,
    pub teacher: EducatorId,
    pub day: SchoolDay,
    pub order: u8,
    pub room: u16,
}

impl Lesson {
    /// Check the lesson order lies within the school day.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_order(self.order)
    }
}

/// A one-off override of the timetable for one date, order and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub id: i64,
    pub date: NaiveDate,
    pub order: u8,
    pub group: GroupId,
    pub part: Part,
    /// Covering educator; `None` releases the group home.
    pub teacher: Option<EducatorId>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Substitution {
    pub fn is_release(&self) -> bool {
        self.teacher.is_none()
    }

    /// Weekday whose canonical lessons this substitution overrides.
    pub fn day(&self) -> Result<SchoolDay, ValidationError> {
        SchoolDay::of_date(self.date)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_order(self.order)?;
        self.day().map(|_| ())
    }
}

pub(crate) fn validate_order(order: u8) -> Result<(), ValidationError> {
    if (1..=MAX_ORDER).contains(&order) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "order".to_string(),
            value: i64::from(order),
            min: 1,
            max: i64::from(MAX_ORDER),
        })
    }
}
