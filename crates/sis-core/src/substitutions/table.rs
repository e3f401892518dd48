//! Ordered tables of (group, part) entries built by the reconciler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{EducatorId, GroupId, Lesson, Part};

/// A group, or one half of it, attending a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupPart {
    pub group: GroupId,
    pub part: Part,
}

impl GroupPart {
    pub fn new(group: GroupId, part: Part) -> Self {
        Self { group, part }
    }

    pub fn of(lesson: &Lesson) -> Self {
        Self::new(lesson.group, lesson.part)
    }
}

/// Append `entry` to one slot's list, keeping whole groups dominant.
///
/// - a part of a group already present as a whole is dropped;
/// - a whole group evicts the parts of that group recorded earlier;
/// - exact duplicates are dropped.
fn merge(entries: &mut Vec<GroupPart>, entry: GroupPart) {
    if entries.contains(&entry) || entries.contains(&GroupPart::new(entry.group, Part::Whole)) {
        return;
    }
    if entry.part.is_whole() {
        entries.retain(|e| e.group != entry.group);
    }
    entries.push(entry);
}

/// educator -> lesson order -> entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryTable(BTreeMap<EducatorId, BTreeMap<u8, Vec<GroupPart>>>);

impl EntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutation: record `entry` for `educator` at `order`.
    pub fn record(&mut self, educator: EducatorId, order: u8, entry: GroupPart) {
        let entries = self.0.entry(educator).or_default().entry(order).or_default();
        merge(entries, entry);
    }

    /// Entries for one educator and order; empty when nothing was recorded.
    pub fn get(&self, educator: EducatorId, order: u8) -> &[GroupPart] {
        self.0
            .get(&educator)
            .and_then(|orders| orders.get(&order))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn educator(&self, educator: EducatorId) -> Option<&BTreeMap<u8, Vec<GroupPart>>> {
        self.0.get(&educator)
    }

    pub fn contains(&self, educator: EducatorId, order: u8) -> bool {
        self.0
            .get(&educator)
            .map_or(false, |orders| orders.contains_key(&order))
    }

    /// Educators in ascending id order.
    pub fn educators(&self) -> impl Iterator<Item = EducatorId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EducatorId, &BTreeMap<u8, Vec<GroupPart>>)> {
        self.0.iter().map(|(educator, orders)| (*educator, orders))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// lesson order -> groups (or parts) sent home.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleasedTable(BTreeMap<u8, Vec<GroupPart>>);

impl ReleasedTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, order: u8, entry: GroupPart) {
        self.0.entry(order).or_default().push(entry);
    }

    pub fn get(&self, order: u8) -> &[GroupPart] {
        self.0.get(&order).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[GroupPart])> {
        self.0.iter().map(|(order, entries)| (*order, entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
