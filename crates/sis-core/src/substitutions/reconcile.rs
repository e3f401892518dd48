//! Reconciling a day's substitutions against the canonical timetable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::{EntryTable, GroupPart, ReleasedTable};
use crate::error::{Result, ValidationError};
use crate::model::{EducatorId, Lesson, ScheduleId, Substitution};
use crate::repository::{LessonQuery, Repository};

/// Before, after and released views of one school day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionTable {
    pub date: NaiveDate,
    /// What each affected educator normally teaches.
    pub before: EntryTable,
    /// What each affected educator actually teaches.
    pub after: EntryTable,
    /// Groups or parts sent home, by lesson order.
    pub released: ReleasedTable,
}

impl SubstitutionTable {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            before: EntryTable::new(),
            after: EntryTable::new(),
            released: ReleasedTable::new(),
        }
    }

    /// Educators showing up in either view, ascending.
    pub fn educators(&self) -> Vec<EducatorId> {
        let mut all: Vec<EducatorId> = self.before.educators().chain(self.after.educators()).collect();
        all.sort();
        all.dedup();
        all
    }
}

/// Whether `teacher` still holds the opposite part of `sub`'s group.
///
/// Looks at the other substitutions of the same order (`sub` itself is
/// recognised by value, so it may be a copy). True when none of
/// them takes over the opposite part (or the whole group) and none of them
/// sends `teacher` elsewhere.
pub fn opposite_part_is_covered(
    subs: &[Substitution],
    sub: &Substitution,
    teacher: EducatorId,
) -> bool {
    let Some(opposite) = sub.part.opposite() else {
        return false;
    };

    subs.iter()
        .filter(|other| *other != sub && other.order == sub.order)
        .all(|other| {
            let takes_opposite = other.group == sub.group && other.part.covers(opposite);
            let moves_teacher = other.teacher == Some(teacher);
            !takes_opposite && !moves_teacher
        })
}

/// Builds a [`SubstitutionTable`] from substitutions and a repository.
pub struct Reconciler<'r, R: Repository + ?Sized> {
    repo: &'r R,
    schedules: Vec<ScheduleId>,
}

impl<'r, R: Repository + ?Sized> Reconciler<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self {
            repo,
            schedules: Vec::new(),
        }
    }

    /// Restrict canonical lessons to the given timetable versions.
    pub fn with_schedules(mut self, schedules: &[ScheduleId]) -> Self {
        self.schedules = schedules.to_vec();
        self
    }

    /// Fetch the substitutions of `date` and reconcile them.
    pub fn table_for(&self, date: NaiveDate) -> Result<SubstitutionTable> {
        let subs = self.repo.find_substitutions(date)?;
        self.reconcile(date, &subs)
    }

    /// Reconcile `subs`, all of which must be dated `date`.
    pub fn reconcile(&self, date: NaiveDate, subs: &[Substitution]) -> Result<SubstitutionTable> {
        for sub in subs {
            if sub.date != date {
                return Err(ValidationError::DateMismatch {
                    expected: date,
                    found: sub.date,
                }
                .into());
            }
            sub.validate()?;
        }

        // Fixed processing order so list contents come out the same for any
        // input order.
        let mut ordered: Vec<&Substitution> = subs.iter().collect();
        ordered.sort_by_key(|s| (s.order, s.group, s.part, s.teacher, s.id));

        let mut table = SubstitutionTable::new(date);
        for sub in ordered {
            self.apply(&mut table, subs, sub)?;
        }
        Ok(table)
    }

    fn apply(
        &self,
        table: &mut SubstitutionTable,
        subs: &[Substitution],
        sub: &Substitution,
    ) -> Result<()> {
        let day = sub.day()?;
        let group_lessons = self.repo.find_lessons(
            &LessonQuery::for_group(sub.group)
                .on_day(day)
                .at_order(sub.order)
                .in_schedules(&self.schedules),
        )?;

        match sub.teacher {
            None => {
                tracing::debug!(sub = sub.id, group = %sub.group, order = sub.order, "release");
                for lesson in &group_lessons {
                    table.before.record(lesson.teacher, lesson.order, GroupPart::of(lesson));
                    if let Some(opposite) = sub.part.opposite() {
                        if lesson.part.covers(opposite)
                            && opposite_part_is_covered(subs, sub, lesson.teacher)
                        {
                            table.after.record(
                                lesson.teacher,
                                lesson.order,
                                GroupPart::new(lesson.group, opposite),
                            );
                        }
                    }
                }
                table
                    .released
                    .record(sub.order, GroupPart::new(sub.group, sub.part));
            }
            Some(cover) => {
                tracing::debug!(
                    sub = sub.id,
                    group = %sub.group,
                    order = sub.order,
                    teacher = %cover,
                    "cover"
                );
                for lesson in &group_lessons {
                    table.before.record(lesson.teacher, lesson.order, GroupPart::of(lesson));
                    if let Some(opposite) = sub.part.opposite() {
                        if lesson.part.is_whole()
                            && opposite_part_is_covered(subs, sub, lesson.teacher)
                        {
                            table.after.record(
                                lesson.teacher,
                                lesson.order,
                                GroupPart::new(lesson.group, opposite),
                            );
                        }
                    }
                }

                // The cover teacher's own lessons stay visible so clashes show
                let own_lessons: Vec<Lesson> = self.repo.find_lessons(
                    &LessonQuery::for_teacher(cover)
                        .on_day(day)
                        .at_order(sub.order)
                        .in_schedules(&self.schedules),
                )?;
                for lesson in &own_lessons {
                    table.after.record(lesson.teacher, lesson.order, GroupPart::of(lesson));
                }

                table
                    .after
                    .record(cover, sub.order, GroupPart::new(sub.group, sub.part));
            }
        }
        Ok(())
    }
}

/// Reconcile the substitutions of one date against `lookup`.
pub fn reconcile_substitutions<R: Repository + ?Sized>(
    date: NaiveDate,
    subs: &[Substitution],
    lookup: &R,
) -> Result<SubstitutionTable> {
    Reconciler::new(lookup).reconcile(date, subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SchoolDay;
    use crate::error::CoreError;
    use crate::model::{GroupId, Part, SubjectId};
    use crate::repository::MemoryRepository;

    const CLASS_1A: GroupId = GroupId(1);
    const CLASS_2B: GroupId = GroupId(2);
    const SMITH: EducatorId = EducatorId(1);
    const JONES: EducatorId = EducatorId(2);
    const BROWN: EducatorId = EducatorId(3);

    /// 2024-09-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn lesson(id: i64, group: GroupId, teacher: EducatorId, order: u8, part: Part) -> Lesson {
        Lesson {
            id,
            schedule: ScheduleId(1),
            group,
            part,
            subject: SubjectId(1),
            teacher,
            day: SchoolDay::Monday,
            order,
            room: 20 + id as u16,
        }
    }

    fn sub(
        id: i64,
        group: GroupId,
        teacher: Option<EducatorId>,
        order: u8,
        part: Part,
    ) -> Substitution {
        Substitution {
            id,
            date: monday(),
            order,
            group,
            part,
            teacher,
            comment: None,
        }
    }

    fn gp(group: GroupId, part: Part) -> GroupPart {
        GroupPart::new(group, part)
    }

    #[test]
    fn whole_group_release() {
        let repo = MemoryRepository::new().with_lesson(lesson(1, CLASS_1A, SMITH, 3, Part::Whole));
        let subs = vec![sub(1, CLASS_1A, None, 3, Part::Whole)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert_eq!(table.before.get(SMITH, 3), &[gp(CLASS_1A, Part::Whole)]);
        assert_eq!(table.released.get(3), &[gp(CLASS_1A, Part::Whole)]);
        assert!(!table.after.contains(SMITH, 3));
    }

    #[test]
    fn release_of_one_part_keeps_teacher_with_other_part() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 4, Part::First))
            .with_lesson(lesson(2, CLASS_1A, SMITH, 4, Part::Second));
        let subs = vec![sub(1, CLASS_1A, None, 4, Part::First)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(table.after.get(SMITH, 4).contains(&gp(CLASS_1A, Part::Second)));
        assert_eq!(
            table.before.get(SMITH, 4),
            &[gp(CLASS_1A, Part::First), gp(CLASS_1A, Part::Second)]
        );
        assert_eq!(table.released.get(4), &[gp(CLASS_1A, Part::First)]);
    }

    #[test]
    fn release_of_one_part_of_whole_lesson() {
        let repo = MemoryRepository::new().with_lesson(lesson(1, CLASS_1A, SMITH, 2, Part::Whole));
        let subs = vec![sub(1, CLASS_1A, None, 2, Part::Second)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert_eq!(table.before.get(SMITH, 2), &[gp(CLASS_1A, Part::Whole)]);
        assert_eq!(table.after.get(SMITH, 2), &[gp(CLASS_1A, Part::First)]);
    }

    #[test]
    fn released_part_frees_only_its_own_teacher() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 5, Part::First))
            .with_lesson(lesson(2, CLASS_1A, JONES, 5, Part::Second));
        let subs = vec![sub(1, CLASS_1A, None, 5, Part::First)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(!table.after.contains(SMITH, 5));
        assert_eq!(table.after.get(JONES, 5), &[gp(CLASS_1A, Part::Second)]);
    }

    #[test]
    fn releasing_both_parts_frees_the_teacher() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 4, Part::First))
            .with_lesson(lesson(2, CLASS_1A, SMITH, 4, Part::Second));
        let subs = vec![
            sub(1, CLASS_1A, None, 4, Part::First),
            sub(2, CLASS_1A, None, 4, Part::Second),
        ];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(!table.after.contains(SMITH, 4));
        assert_eq!(
            table.released.get(4),
            &[gp(CLASS_1A, Part::First), gp(CLASS_1A, Part::Second)]
        );
    }

    #[test]
    fn cover_teacher_takes_group() {
        let repo = MemoryRepository::new().with_lesson(lesson(1, CLASS_1A, SMITH, 1, Part::Whole));
        let subs = vec![sub(1, CLASS_1A, Some(JONES), 1, Part::Whole)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert_eq!(table.before.get(SMITH, 1), &[gp(CLASS_1A, Part::Whole)]);
        assert!(!table.after.contains(SMITH, 1));
        assert_eq!(table.after.get(JONES, 1), &[gp(CLASS_1A, Part::Whole)]);
        assert!(table.released.is_empty());
        assert_eq!(table.educators(), vec![SMITH, JONES]);
    }

    #[test]
    fn cover_of_one_part_leaves_regular_teacher_with_the_other() {
        let repo = MemoryRepository::new().with_lesson(lesson(1, CLASS_1A, SMITH, 6, Part::Whole));
        let subs = vec![sub(1, CLASS_1A, Some(JONES), 6, Part::First)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert_eq!(table.after.get(SMITH, 6), &[gp(CLASS_1A, Part::Second)]);
        assert_eq!(table.after.get(JONES, 6), &[gp(CLASS_1A, Part::First)]);
    }

    #[test]
    fn cover_teacher_conflict_stays_visible() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 2, Part::Whole))
            .with_lesson(lesson(2, CLASS_2B, JONES, 2, Part::First));
        let subs = vec![sub(1, CLASS_1A, Some(JONES), 2, Part::Whole)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        let after = table.after.get(JONES, 2);
        assert!(after.contains(&gp(CLASS_1A, Part::Whole)));
        assert!(after.contains(&gp(CLASS_2B, Part::First)));
    }

    #[test]
    fn regular_teacher_sent_elsewhere_loses_opposite_part() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 3, Part::Whole))
            .with_lesson(lesson(2, CLASS_2B, JONES, 3, Part::Whole));
        let subs = vec![
            // Jones covers part 1 of 1a, Smith is sent to 2b
            sub(1, CLASS_1A, Some(JONES), 3, Part::First),
            sub(2, CLASS_2B, Some(SMITH), 3, Part::Whole),
        ];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(!table.after.get(SMITH, 3).contains(&gp(CLASS_1A, Part::Second)));
        assert!(table.after.get(SMITH, 3).contains(&gp(CLASS_2B, Part::Whole)));
    }

    #[test]
    fn opposite_part_substituted_elsewhere() {
        let repo = MemoryRepository::new().with_lesson(lesson(1, CLASS_1A, SMITH, 3, Part::Whole));
        let subs = vec![
            sub(1, CLASS_1A, Some(JONES), 3, Part::First),
            sub(2, CLASS_1A, Some(BROWN), 3, Part::Second),
        ];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(!table.after.contains(SMITH, 3));
        assert_eq!(table.after.get(JONES, 3), &[gp(CLASS_1A, Part::First)]);
        assert_eq!(table.after.get(BROWN, 3), &[gp(CLASS_1A, Part::Second)]);
    }

    #[test]
    fn missing_canonical_lesson_is_not_an_error() {
        let repo = MemoryRepository::new();
        let subs = vec![sub(1, CLASS_1A, Some(JONES), 7, Part::Whole)];

        let table = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert!(table.before.is_empty());
        assert_eq!(table.after.get(JONES, 7), &[gp(CLASS_1A, Part::Whole)]);
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 1, Part::Whole))
            .with_lesson(lesson(2, CLASS_2B, SMITH, 2, Part::First))
            .with_lesson(lesson(3, CLASS_2B, JONES, 2, Part::Second));
        let mut subs = vec![
            sub(1, CLASS_1A, None, 1, Part::First),
            sub(2, CLASS_2B, Some(BROWN), 2, Part::Second),
            sub(3, CLASS_1A, Some(BROWN), 1, Part::Second),
        ];

        let forward = reconcile_substitutions(monday(), &subs, &repo).unwrap();
        subs.reverse();
        let backward = reconcile_substitutions(monday(), &subs, &repo).unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn lessons_of_other_versions_are_ignored() {
        let mut old = lesson(1, CLASS_1A, SMITH, 1, Part::Whole);
        old.schedule = ScheduleId(9);
        let repo = MemoryRepository::new().with_lesson(old);
        let subs = vec![sub(1, CLASS_1A, None, 1, Part::Whole)];

        let table = Reconciler::new(&repo)
            .with_schedules(&[ScheduleId(1)])
            .reconcile(monday(), &subs)
            .unwrap();

        assert!(table.before.is_empty());
        assert_eq!(table.released.get(1), &[gp(CLASS_1A, Part::Whole)]);
    }

    #[test]
    fn table_for_fetches_substitutions_of_the_day() {
        let tuesday = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        let mut other_day = sub(2, CLASS_2B, None, 1, Part::Whole);
        other_day.date = tuesday;
        let repo = MemoryRepository::new()
            .with_lesson(lesson(1, CLASS_1A, SMITH, 1, Part::Whole))
            .with_substitution(sub(1, CLASS_1A, None, 1, Part::Whole))
            .with_substitution(other_day);

        let table = Reconciler::new(&repo).table_for(monday()).unwrap();

        assert_eq!(table.released.get(1), &[gp(CLASS_1A, Part::Whole)]);
        assert_eq!(table.before.get(SMITH, 1), &[gp(CLASS_1A, Part::Whole)]);
    }

    #[test]
    fn mismatched_date_is_rejected() {
        let repo = MemoryRepository::new();
        let mut wrong = sub(1, CLASS_1A, None, 1, Part::Whole);
        wrong.date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();

        let err = reconcile_substitutions(monday(), &[wrong], &repo).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::DateMismatch { .. })
        ));
    }

    #[test]
    fn weekend_substitution_is_rejected() {
        let saturday = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        let mut weekend = sub(1, CLASS_1A, None, 1, Part::Whole);
        weekend.date = saturday;

        let err = reconcile_substitutions(saturday, &[weekend], &MemoryRepository::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::WeekendDate(_))
        ));
    }

    #[test]
    fn repository_errors_propagate() {
        struct Broken;
        impl Repository for Broken {
            fn find_lessons(&self, _: &LessonQuery) -> Result<Vec<Lesson>> {
                Err(CoreError::Custom("storage offline".to_string()))
            }
            fn find_substitutions(&self, _: NaiveDate) -> Result<Vec<Substitution>> {
                Ok(Vec::new())
            }
            fn find_educators(&self, _: &str) -> Result<Vec<crate::model::Educator>> {
                Ok(Vec::new())
            }
            fn find_groups(&self) -> Result<Vec<crate::model::Group>> {
                Ok(Vec::new())
            }
            fn find_students(&self, _: &str) -> Result<Vec<crate::model::Student>> {
                Ok(Vec::new())
            }
            fn find_memberships(
                &self,
                _: &crate::repository::MembershipQuery,
            ) -> Result<Vec<crate::model::GroupMembership>> {
                Ok(Vec::new())
            }
            fn lucky_numbers(&self) -> Result<Vec<crate::lucky::LuckyNumber>> {
                Ok(Vec::new())
            }
        }

        let subs = vec![sub(1, CLASS_1A, None, 1, Part::Whole)];
        let err = reconcile_substitutions(monday(), &subs, &Broken).unwrap_err();
        assert_eq!(err.to_string(), "storage offline");
    }

    #[test]
    fn opposite_part_helper() {
        let subs = vec![
            sub(1, CLASS_1A, None, 1, Part::First),
            sub(2, CLASS_2B, Some(JONES), 1, Part::Whole),
            sub(3, CLASS_1A, None, 2, Part::Second),
        ];
        assert!(opposite_part_is_covered(&subs, &subs[0], SMITH));
        // Jones is sent to 2b at the same order
        assert!(!opposite_part_is_covered(&subs, &subs[0], JONES));
        // a whole-group substitution has no opposite part
        assert!(!opposite_part_is_covered(&subs, &subs[1], SMITH));
        // other orders do not interfere
        assert!(opposite_part_is_covered(&subs, &subs[2], JONES));
    }

    #[test]
    fn opposite_part_helper_accepts_a_copy() {
        let subs = vec![
            sub(1, CLASS_1A, Some(JONES), 1, Part::First),
            sub(2, CLASS_1A, None, 1, Part::Second),
        ];
        // a copy of the first substitution must not count as another one
        let copy = subs[0].clone();
        assert!(!opposite_part_is_covered(&subs, &copy, SMITH));
        let alone = vec![subs[0].clone()];
        assert!(opposite_part_is_covered(&alone, &copy, SMITH));
        // the copy sends Jones elsewhere, yet it is the substitution itself
        assert!(opposite_part_is_covered(&alone, &copy, JONES));
    }
}
