//! In-memory repository over already-fetched records.

use chrono::NaiveDate;

use super::{like, LessonQuery, MembershipQuery, Repository};
use crate::error::Result;
use crate::lucky::LuckyNumber;
use crate::model::{Educator, Group, GroupMembership, Lesson, Student, Substitution};

/// A [`Repository`] backed by plain vectors.
///
/// Handy when the caller already holds a consistent snapshot of the
/// timetable, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    pub lessons: Vec<Lesson>,
    pub substitutions: Vec<Substitution>,
    pub educators: Vec<Educator>,
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub memberships: Vec<GroupMembership>,
    pub lucky_numbers: Vec<LuckyNumber>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    pub fn with_lessons(mut self, lessons: impl IntoIterator<Item = Lesson>) -> Self {
        self.lessons.extend(lessons);
        self
    }

    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitutions.push(substitution);
        self
    }

    pub fn with_educator(mut self, educator: Educator) -> Self {
        self.educators.push(educator);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    pub fn with_membership(mut self, membership: GroupMembership) -> Self {
        self.memberships.push(membership);
        self
    }

    pub fn with_lucky_number(mut self, number: LuckyNumber) -> Self {
        self.lucky_numbers.push(number);
        self
    }
}

impl Repository for MemoryRepository {
    fn find_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
        Ok(self
            .lessons
            .iter()
            .filter(|lesson| query.matches(lesson))
            .cloned()
            .collect())
    }

    fn find_substitutions(&self, date: NaiveDate) -> Result<Vec<Substitution>> {
        Ok(self
            .substitutions
            .iter()
            .filter(|sub| sub.date == date)
            .cloned()
            .collect())
    }

    fn find_educators(&self, last_name: &str) -> Result<Vec<Educator>> {
        Ok(self
            .educators
            .iter()
            .filter(|e| like(last_name, &e.last_name))
            .cloned()
            .collect())
    }

    fn find_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.clone())
    }

    fn find_students(&self, last_name: &str) -> Result<Vec<Student>> {
        Ok(self
            .students
            .iter()
            .filter(|s| like(last_name, &s.last_name))
            .cloned()
            .collect())
    }

    fn find_memberships(&self, query: &MembershipQuery) -> Result<Vec<GroupMembership>> {
        Ok(self
            .memberships
            .iter()
            .filter(|m| query.matches(m))
            .cloned()
            .collect())
    }

    fn lucky_numbers(&self) -> Result<Vec<LuckyNumber>> {
        Ok(self.lucky_numbers.clone())
    }
}
