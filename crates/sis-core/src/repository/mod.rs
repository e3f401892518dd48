//! Data-access seam between the timetable algorithms and storage.
//!
//! The composer and the reconciler only read through [`Repository`]. Errors
//! raised by an implementation propagate to their callers untouched.

mod memory;

pub use memory::MemoryRepository;

use chrono::NaiveDate;

use crate::calendar::SchoolDay;
use crate::error::{LookupError, Result};
use crate::lucky::LuckyNumber;
use crate::model::{
    Educator, EducatorId, Group, GroupId, GroupMembership, Lesson, Person, ScheduleId, Student,
    StudentId, Substitution,
};

/// Filter for canonical lessons. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonQuery {
    pub group: Option<GroupId>,
    pub teacher: Option<EducatorId>,
    pub day: Option<SchoolDay>,
    pub order: Option<u8>,
    /// Timetable versions to search; empty means all of them.
    pub schedules: Vec<ScheduleId>,
}

impl LessonQuery {
    pub fn for_group(group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..Self::default()
        }
    }

    pub fn for_teacher(teacher: EducatorId) -> Self {
        Self {
            teacher: Some(teacher),
            ..Self::default()
        }
    }

    pub fn on_day(mut self, day: SchoolDay) -> Self {
        self.day = Some(day);
        self
    }

    pub fn at_order(mut self, order: u8) -> Self {
        self.order = Some(order);
        self
    }

    pub fn in_schedules(mut self, schedules: &[ScheduleId]) -> Self {
        self.schedules = schedules.to_vec();
        self
    }

    pub fn matches(&self, lesson: &Lesson) -> bool {
        self.group.map_or(true, |g| g == lesson.group)
            && self.teacher.map_or(true, |t| t == lesson.teacher)
            && self.day.map_or(true, |d| d == lesson.day)
            && self.order.map_or(true, |o| o == lesson.order)
            && (self.schedules.is_empty() || self.schedules.contains(&lesson.schedule))
    }
}

/// Filter for group memberships. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipQuery {
    pub student: Option<StudentId>,
    pub group: Option<GroupId>,
}

impl MembershipQuery {
    pub fn for_student(student: StudentId) -> Self {
        Self {
            student: Some(student),
            ..Self::default()
        }
    }

    pub fn for_group(group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..Self::default()
        }
    }

    pub fn matches(&self, membership: &GroupMembership) -> bool {
        self.student.map_or(true, |s| s == membership.student)
            && self.group.map_or(true, |g| g == membership.group)
    }
}

/// Read access to timetable data.
pub trait Repository {
    /// Canonical lessons matching `query`, in no particular order.
    fn find_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>>;

    /// Substitutions dated `date`.
    fn find_substitutions(&self, date: NaiveDate) -> Result<Vec<Substitution>>;

    /// Educators whose last name matches `last_name`, case-insensitively.
    /// `%` matches any run of characters.
    fn find_educators(&self, last_name: &str) -> Result<Vec<Educator>>;

    fn find_groups(&self) -> Result<Vec<Group>>;

    /// Students whose last name matches `last_name`, as in
    /// [`Repository::find_educators`].
    fn find_students(&self, last_name: &str) -> Result<Vec<Student>>;

    /// Memberships matching `query`, current or not.
    fn find_memberships(&self, query: &MembershipQuery) -> Result<Vec<GroupMembership>>;

    /// Every drawn lucky number, any order.
    fn lucky_numbers(&self) -> Result<Vec<LuckyNumber>>;
}

/// Resolve exactly one educator by last name.
pub fn resolve_educator<R: Repository + ?Sized>(repo: &R, last_name: &str) -> Result<Educator> {
    let mut found = repo.find_educators(last_name)?;
    match found.len() {
        0 => Err(LookupError::NotFound {
            kind: "educator",
            query: last_name.to_string(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        count => Err(LookupError::MultipleMatches {
            kind: "educator",
            query: last_name.to_string(),
            count,
        }
        .into()),
    }
}

/// Everyone, students first, whose last name matches `last_name`.
pub fn find_people<R: Repository + ?Sized>(repo: &R, last_name: &str) -> Result<Vec<Person>> {
    let students = repo.find_students(last_name)?.into_iter().map(Person::Student);
    let educators = repo.find_educators(last_name)?.into_iter().map(Person::Educator);
    Ok(students.chain(educators).collect())
}

/// Resolve a group by its full name, e.g. `"2b"`.
pub fn resolve_group<R: Repository + ?Sized>(repo: &R, full_name: &str) -> Result<Group> {
    let (year, name) = Group::split_full_name(full_name)?;
    let mut found: Vec<Group> = repo
        .find_groups()?
        .into_iter()
        .filter(|g| g.year == year && g.name == name)
        .collect();
    match found.len() {
        0 => Err(LookupError::NotFound {
            kind: "group",
            query: full_name.to_string(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        count => Err(LookupError::MultipleMatches {
            kind: "group",
            query: full_name.to_string(),
            count,
        }
        .into()),
    }
}

/// Case-insensitive match supporting `%` wildcards, as SQL `LIKE` does.
pub(crate) fn like(pattern: &str, value: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let value = value.to_lowercase();
    let pieces: Vec<&str> = pattern.split('%').collect();
    if pieces.len() == 1 {
        return pattern == value;
    }

    let mut rest = value.as_str();
    for (i, piece) in pieces.iter().enumerate() {
        if i == 0 {
            match rest.strip_prefix(piece) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == pieces.len() - 1 {
            return rest.ends_with(piece);
        } else {
            match rest.find(piece) {
                Some(pos) => rest = &rest[pos + piece.len()..],
                None => return false,
            }
        }
    }
    true
}
