//! Lucky numbers: a daily student register number exempt from being called.
//!
//! Numbers are drawn in cycles. A cycle covers every number from 1 up to the
//! size of the largest group; a number comes back only once all the others
//! were drawn.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{GroupId, GroupMembership, StudentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckyNumber {
    pub date: NaiveDate,
    pub number: u16,
}

/// Highest number in a cycle: the number of students in the largest group
/// on `date`, or `fallback` when no group has members.
pub fn max_number(memberships: &[GroupMembership], date: NaiveDate, fallback: u16) -> u16 {
    let mut students: BTreeMap<GroupId, BTreeSet<StudentId>> = BTreeMap::new();
    for membership in memberships.iter().filter(|m| m.is_current(date)) {
        students
            .entry(membership.group)
            .or_default()
            .insert(membership.student);
    }
    match students.values().map(BTreeSet::len).max() {
        Some(max) if max > 0 => u16::try_from(max).unwrap_or(u16::MAX),
        _ => fallback,
    }
}

/// Numbers not yet drawn in the current cycle, ascending.
pub fn remaining(max: u16, history: &[LuckyNumber]) -> Vec<u16> {
    if max == 0 {
        return Vec::new();
    }
    let mut recent: Vec<&LuckyNumber> = history.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let in_cycle = history.len() % usize::from(max);
    let past: Vec<u16> = recent.iter().take(in_cycle).map(|n| n.number).collect();

    (1..=max).filter(|n| !past.contains(n)).collect()
}

/// The remaining numbers in random order.
pub fn draw<R: Rng + ?Sized>(max: u16, history: &[LuckyNumber], rng: &mut R) -> Vec<u16> {
    let mut left = remaining(max, history);
    left.shuffle(rng);
    left
}

/// First day whose number is shown at `now`; after `change_hour` the
/// next day's number is shown.
fn closest_day(change_hour: u32, now: NaiveDateTime) -> NaiveDate {
    if now.hour() >= change_hour {
        now.date() + Duration::days(1)
    } else {
        now.date()
    }
}

/// The number to display at `now`: the earliest one not in the past.
pub fn current(numbers: &[LuckyNumber], change_hour: u32, now: NaiveDateTime) -> Option<LuckyNumber> {
    let start = closest_day(change_hour, now);
    numbers
        .iter()
        .filter(|n| n.date >= start)
        .min_by_key(|n| n.date)
        .cloned()
}

/// Numbers of the current week, or of the next week that has any once the
/// current week has none left.
pub fn current_week(
    numbers: &[LuckyNumber],
    change_hour: u32,
    now: NaiveDateTime,
) -> Vec<LuckyNumber> {
    let closest = closest_day(change_hour, now);
    let week_start = closest - Duration::days(i64::from(closest.weekday().num_days_from_monday()));
    let first_week_end = week_start + Duration::days(7);

    let mut upcoming: Vec<&LuckyNumber> = numbers.iter().filter(|n| n.date >= week_start).collect();
    upcoming.sort_by_key(|n| n.date);

    let mut first_week = Vec::new();
    let mut second_week = Vec::new();
    let mut second_week_end: Option<NaiveDate> = None;
    for number in upcoming {
        if number.date < first_week_end {
            first_week.push(number.clone());
            continue;
        }
        let end = *second_week_end.get_or_insert(number.date + Duration::days(7));
        if number.date < end {
            second_week.push(number.clone());
        }
    }

    match first_week.last() {
        Some(last) if last.date >= closest => first_week,
        _ => second_week,
    }
}
