//! Detection of rooms booked by more than one lesson at the same time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::SchoolDay;
use crate::model::Lesson;

/// A room occupied by several lessons in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConflict {
    pub day: SchoolDay,
    pub order: u8,
    pub room: u16,
    pub lessons: Vec<Lesson>,
}

/// Report every (day, order, room) holding more than one lesson.
///
/// Rooms listed in `shared_rooms` (e.g. the sports hall) may host several
/// groups at once and are never reported. Conflicts come out sorted by day,
/// order and room.
pub fn room_conflicts(lessons: &[Lesson], shared_rooms: &[u16]) -> Vec<RoomConflict> {
    let mut bookings: BTreeMap<(SchoolDay, u8, u16), Vec<Lesson>> = BTreeMap::new();
    for lesson in lessons {
        if shared_rooms.contains(&lesson.room) {
            continue;
        }
        bookings
            .entry((lesson.day, lesson.order, lesson.room))
            .or_default()
            .push(lesson.clone());
    }

    bookings
        .into_iter()
        .filter(|(_, booked)| booked.len() > 1)
        .map(|((day, order, room), mut lessons)| {
            lessons.sort_by_key(|l| l.id);
            RoomConflict {
                day,
                order,
                room,
                lessons,
            }
        })
        .collect()
}
