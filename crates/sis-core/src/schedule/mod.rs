//! Schedule composition: turning loose lesson records into padded timetables.
//!
//! A day is a sequence of [`Slot`]s where index `i` holds lesson order
//! `i + 1`. The sequence is as long as the latest lesson of the day and every
//! free period before it is an explicit [`Slot::Empty`].
//!
//! Educator timetables use [`EducatorSlot`] instead: one educator may teach
//! several groups in the same period, so a slot holds a list of lessons.
//!
//! ```rust,ignore
//! use sis_core::schedule::compose_day;
//!
//! let day = compose_day(lessons);
//! for (i, slot) in day.iter().enumerate() {
//!     println!("{}: {:?}", i + 1, slot);
//! }
//! ```

mod now;
pub mod rooms;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::SchoolDay;
use crate::error::Result;
use crate::model::{EducatorId, GroupId, Lesson, Part, ScheduleId, StudentId};
use crate::repository::{LessonQuery, MembershipQuery, Repository};

pub use now::NowAnswer;
pub use rooms::{room_conflicts, RoomConflict};

/// One lesson period of a composed timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Free period.
    Empty,
    /// A lesson for the whole group.
    Single(Lesson),
    /// Split group: part 1 and part 2, either of which may be free.
    Pair(Option<Lesson>, Option<Lesson>),
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Lessons held in this slot, part 1 before part 2.
    pub fn lessons(&self) -> Vec<&Lesson> {
        match self {
            Slot::Empty => Vec::new(),
            Slot::Single(lesson) => vec![lesson],
            Slot::Pair(first, second) => first.iter().chain(second.iter()).collect(),
        }
    }

    /// Put `lesson` into this slot according to its part.
    ///
    /// A lesson that lands on an occupied position replaces the occupant.
    fn place(&mut self, lesson: Lesson) {
        match lesson.part {
            Part::Whole => {
                if !self.is_empty() {
                    tracing::warn!(
                        lesson = lesson.id,
                        order = lesson.order,
                        "whole-group lesson replaces an occupied slot"
                    );
                }
                *self = Slot::Single(lesson);
            }
            Part::First | Part::Second => {
                let is_first = lesson.part == Part::First;
                if let Slot::Single(existing) = self {
                    tracing::warn!(
                        lesson = lesson.id,
                        replaced = existing.id,
                        order = lesson.order,
                        "parted lesson replaces a whole-group lesson"
                    );
                    *self = Slot::Empty;
                }
                if self.is_empty() {
                    *self = Slot::Pair(None, None);
                }
                if let Slot::Pair(first, second) = self {
                    let position = if is_first { first } else { second };
                    if let Some(existing) = position.as_ref() {
                        tracing::warn!(
                            lesson = lesson.id,
                            replaced = existing.id,
                            order = lesson.order,
                            "duplicate lesson for the same part"
                        );
                    }
                    *position = Some(lesson);
                }
            }
        }
    }
}

/// Compose one day of lessons into a padded slot sequence.
///
/// Lessons are sorted by order, whole-group lessons first and part 1 before
/// part 2. Pure: the same input always yields the same sequence.
pub fn compose_day<I>(lessons: I) -> Vec<Slot>
where
    I: IntoIterator<Item = Lesson>,
{
    let mut sorted: Vec<Lesson> = lessons.into_iter().collect();
    sorted.sort_by_key(|lesson| (lesson.order, lesson.part.rank()));

    let mut slots: Vec<Slot> = Vec::new();
    for lesson in sorted {
        if lesson.order == 0 {
            tracing::warn!(lesson = lesson.id, "lesson without an order skipped");
            continue;
        }
        let index = usize::from(lesson.order) - 1;
        // Pad free periods up to and including this order
        while slots.len() <= index {
            slots.push(Slot::Empty);
        }
        slots[index].place(lesson);
    }
    slots
}

/// Every lesson an educator holds in one period, ordered by group then part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EducatorSlot(Vec<Lesson>);

impl EducatorSlot {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.0
    }
}

/// Compose one day of an educator's lessons into a padded slot sequence.
///
/// Nothing is dropped: lessons sharing an order all land in that slot.
pub fn compose_educator_day<I>(lessons: I) -> Vec<EducatorSlot>
where
    I: IntoIterator<Item = Lesson>,
{
    let mut sorted: Vec<Lesson> = lessons.into_iter().collect();
    sorted.sort_by_key(|lesson| (lesson.order, lesson.group, lesson.part.rank(), lesson.id));

    let mut slots: Vec<EducatorSlot> = Vec::new();
    for lesson in sorted {
        if lesson.order == 0 {
            tracing::warn!(lesson = lesson.id, "lesson without an order skipped");
            continue;
        }
        let index = usize::from(lesson.order) - 1;
        if slots.len() <= index {
            slots.resize_with(index + 1, EducatorSlot::default);
        }
        slots[index].0.push(lesson);
    }
    slots
}

/// Timetable for Monday to Friday. All five days are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekSchedule<S = Slot>(BTreeMap<SchoolDay, Vec<S>>);

impl<S> WeekSchedule<S> {
    pub fn day(&self, day: SchoolDay) -> &[S] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchoolDay, &[S])> {
        self.0.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    /// Longest day, useful for rendering a grid.
    pub fn max_len(&self) -> usize {
        self.0.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl<S> Default for WeekSchedule<S> {
    fn default() -> Self {
        Self(SchoolDay::ALL.iter().map(|day| (*day, Vec::new())).collect())
    }
}

fn compose_week_with<I, S, F>(lessons: I, compose: F) -> WeekSchedule<S>
where
    I: IntoIterator<Item = Lesson>,
    F: Fn(Vec<Lesson>) -> Vec<S>,
{
    let mut buckets: BTreeMap<SchoolDay, Vec<Lesson>> =
        SchoolDay::ALL.iter().map(|day| (*day, Vec::new())).collect();
    for lesson in lessons {
        buckets.entry(lesson.day).or_default().push(lesson);
    }
    WeekSchedule(
        buckets
            .into_iter()
            .map(|(day, lessons)| (day, compose(lessons)))
            .collect(),
    )
}

/// Partition lessons by weekday and compose each day.
pub fn compose_week<I>(lessons: I) -> WeekSchedule
where
    I: IntoIterator<Item = Lesson>,
{
    compose_week_with(lessons, |day| compose_day(day))
}

/// [`compose_week`] for an educator, see [`compose_educator_day`].
pub fn compose_educator_week<I>(lessons: I) -> WeekSchedule<EducatorSlot>
where
    I: IntoIterator<Item = Lesson>,
{
    compose_week_with(lessons, |day| compose_educator_day(day))
}

/// Fill the free periods of a class timetable with its course timetable.
///
/// Occupied class slots are kept; the class day is padded when the course
/// runs later than the class.
pub fn overlay_course(base: &mut Vec<Slot>, course: &[Slot]) {
    for (index, slot) in course.iter().enumerate() {
        while base.len() <= index {
            base.push(Slot::Empty);
        }
        if base[index].is_empty() {
            base[index] = slot.clone();
        }
    }
}

/// [`overlay_course`] applied to every day of the week.
pub fn overlay_course_week(base: &mut WeekSchedule, course: &WeekSchedule) {
    for day in SchoolDay::ALL {
        let slots = base.0.entry(day).or_default();
        overlay_course(slots, course.day(day));
    }
}

/// Composes timetables of groups and educators from a repository.
pub struct Timetable<'r, R: Repository + ?Sized> {
    repo: &'r R,
    schedules: Vec<ScheduleId>,
}

impl<'r, R: Repository + ?Sized> Timetable<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self {
            repo,
            schedules: Vec::new(),
        }
    }

    /// Restrict to the given timetable versions (empty means all).
    pub fn with_schedules(mut self, schedules: &[ScheduleId]) -> Self {
        self.schedules = schedules.to_vec();
        self
    }

    fn lessons(&self, query: LessonQuery) -> Result<Vec<Lesson>> {
        self.repo.find_lessons(&query.in_schedules(&self.schedules))
    }

    pub fn group_day(&self, group: GroupId, day: SchoolDay) -> Result<Vec<Slot>> {
        Ok(compose_day(self.lessons(LessonQuery::for_group(group).on_day(day))?))
    }

    pub fn group_week(&self, group: GroupId) -> Result<WeekSchedule> {
        Ok(compose_week(self.lessons(LessonQuery::for_group(group))?))
    }

    /// Class day merged with one of its courses.
    pub fn group_with_course_day(
        &self,
        group: GroupId,
        course: GroupId,
        day: SchoolDay,
    ) -> Result<Vec<Slot>> {
        let mut slots = self.group_day(group, day)?;
        overlay_course(&mut slots, &self.group_day(course, day)?);
        Ok(slots)
    }

    pub fn group_with_course_week(&self, group: GroupId, course: GroupId) -> Result<WeekSchedule> {
        let mut week = self.group_week(group)?;
        overlay_course_week(&mut week, &self.group_week(course)?);
        Ok(week)
    }

    pub fn educator_day(&self, teacher: EducatorId, day: SchoolDay) -> Result<Vec<EducatorSlot>> {
        Ok(compose_educator_day(
            self.lessons(LessonQuery::for_teacher(teacher).on_day(day))?,
        ))
    }

    pub fn educator_week(&self, teacher: EducatorId) -> Result<WeekSchedule<EducatorSlot>> {
        Ok(compose_educator_week(
            self.lessons(LessonQuery::for_teacher(teacher))?,
        ))
    }

    /// Lessons an educator teaches at one period.
    pub fn educator_lessons_at(
        &self,
        teacher: EducatorId,
        day: SchoolDay,
        order: u8,
    ) -> Result<Vec<Lesson>> {
        let mut lessons =
            self.lessons(LessonQuery::for_teacher(teacher).on_day(day).at_order(order))?;
        lessons.sort_by_key(|lesson| (lesson.group, lesson.part.rank()));
        Ok(lessons)
    }

    /// Lessons a student attends at one period.
    ///
    /// Walks the groups the student belongs to on `date` and keeps the
    /// lessons held for the student's half.
    pub fn student_lessons_at(
        &self,
        student: StudentId,
        date: NaiveDate,
        day: SchoolDay,
        order: u8,
    ) -> Result<Vec<Lesson>> {
        let mut lessons = Vec::new();
        for membership in self
            .repo
            .find_memberships(&MembershipQuery::for_student(student))?
            .into_iter()
            .filter(|m| m.is_current(date))
        {
            let held = self.lessons(
                LessonQuery::for_group(membership.group)
                    .on_day(day)
                    .at_order(order),
            )?;
            lessons.extend(
                held.into_iter()
                    .filter(|lesson| lesson.part.covers(membership.part)),
            );
        }
        lessons.sort_by_key(|lesson| (lesson.group, lesson.part.rank(), lesson.id));
        Ok(lessons)
    }
}
