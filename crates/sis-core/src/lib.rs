//! # SIS Core Library
//!
//! This library provides the timetable logic of a school information system.
//! Everything is available through the standalone `sis` CLI binary, which is a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Schedule**: Composes loose lesson records into padded day and week
//!   timetables, with split groups shown side by side
//! - **Substitutions**: Reconciles a day's substitutions into before/after
//!   views per educator plus the groups released home
//! - **Storage**: SQLite-based timetable storage and TOML-based configuration
//! - **Lucky numbers**: Cyclic daily draws bounded by the largest group
//!
//! ## Key Components
//!
//! - [`compose_day`] / [`compose_week`]: Pure timetable composition
//! - [`Timetable`]: Group and educator views read through a [`Repository`]
//! - [`Reconciler`]: Substitution table builder
//! - [`Database`]: SQLite persistence implementing [`Repository`]
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod error;
pub mod lucky;
pub mod model;
pub mod repository;
pub mod schedule;
pub mod storage;
pub mod substitutions;

pub use calendar::{closest_working_day, BellSchedule, SchoolDay};
pub use error::{ConfigError, CoreError, DatabaseError, LookupError, Result, ValidationError};
pub use lucky::LuckyNumber;
pub use model::{
    Educator, EducatorId, Group, GroupId, GroupMembership, Lesson, Part, Person, ScheduleId,
    ScheduleVersion, Student, StudentId, Subject, SubjectId, Substitution,
};
pub use repository::{LessonQuery, MembershipQuery, MemoryRepository, Repository};
pub use schedule::{
    compose_day, compose_educator_day, compose_educator_week, compose_week, EducatorSlot,
    NowAnswer, Slot, Timetable, WeekSchedule,
};
pub use storage::{Config, Database};
pub use substitutions::{reconcile_substitutions, Reconciler, SubstitutionTable};
