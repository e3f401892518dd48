//! SQLite-backed timetable storage.
//!
//! Provides persistent storage for:
//! - Timetable versions, groups, educators and subjects
//! - Students and their group memberships
//! - Canonical weekly lessons
//! - Dated substitutions
//! - Drawn lucky numbers
//!
//! Parts are stored as two flags (`first_part`/`second_part` for lessons,
//! `part1`/`part2` for substitutions) and converted with
//! [`Part::from_flags`]/[`Part::to_flags`]. Rows selecting neither part are
//! never returned.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::calendar::SchoolDay;
use crate::error::{DatabaseError, Result};
use crate::lucky::LuckyNumber;
use crate::model::{
    Educator, EducatorId, Group, GroupId, GroupMembership, Lesson, Part, ScheduleId,
    ScheduleVersion, Student, StudentId, Subject, SubjectId, Substitution,
};
use crate::repository::{LessonQuery, MembershipQuery, Repository};

const LESSON_COLUMNS: &str = "id, schedule_id, group_id, first_part, second_part, subject_id, \
                              teacher_id, day, lesson_order, room";

const SUBSTITUTION_COLUMNS: &str =
    "id, date, lesson_order, group_id, part1, part2, teacher_id, comment";

/// Build a Lesson from a database row, `None` for rows that cannot be placed.
fn row_to_lesson(row: &rusqlite::Row) -> Result<Option<Lesson>, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let part = Part::from_flags(row.get(3)?, row.get(4)?);
    let day_index: u8 = row.get(7)?;
    let (Some(part), Some(day)) = (part, SchoolDay::from_index(day_index)) else {
        tracing::warn!(lesson = id, day = day_index, "skipping lesson without part or school day");
        return Ok(None);
    };

    Ok(Some(Lesson {
        id,
        schedule: ScheduleId(row.get(1)?),
        group: GroupId(row.get(2)?),
        part,
        subject: SubjectId(row.get(5)?),
        teacher: EducatorId(row.get(6)?),
        day,
        order: row.get(8)?,
        room: row.get(9)?,
    }))
}

/// Build a Substitution from a database row, `None` when no part is selected.
fn row_to_substitution(row: &rusqlite::Row) -> Result<Option<Substitution>, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let Some(part) = Part::from_flags(row.get(4)?, row.get(5)?) else {
        tracing::debug!(substitution = id, "skipping substitution without any part");
        return Ok(None);
    };

    Ok(Some(Substitution {
        id,
        date: row.get(1)?,
        order: row.get(2)?,
        group: GroupId(row.get(3)?),
        part,
        teacher: row.get::<_, Option<i64>>(6)?.map(EducatorId),
        comment: row.get(7)?,
    }))
}

fn row_to_group(row: &rusqlite::Row) -> Result<Group, rusqlite::Error> {
    Ok(Group {
        id: GroupId(row.get(0)?),
        name: row.get(1)?,
        year: row.get(2)?,
    })
}

fn row_to_student(row: &rusqlite::Row) -> Result<Student, rusqlite::Error> {
    Ok(Student {
        id: StudentId(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}

/// Build a GroupMembership from a database row, `None` for an unknown part.
fn row_to_membership(row: &rusqlite::Row) -> Result<Option<GroupMembership>, rusqlite::Error> {
    let student = StudentId(row.get(0)?);
    let number: u8 = row.get(2)?;
    let Some(part) = Part::from_number(Some(number)).ok().filter(|p| !p.is_whole()) else {
        tracing::warn!(student = student.0, part = number, "skipping membership without a half");
        return Ok(None);
    };

    Ok(Some(GroupMembership {
        student,
        group: GroupId(row.get(1)?),
        part,
        since: row.get(3)?,
        until: row.get(4)?,
        active: row.get(5)?,
    }))
}

fn row_to_educator(row: &rusqlite::Row) -> Result<Educator, rusqlite::Error> {
    Ok(Educator {
        id: EducatorId(row.get(0)?),
        title: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
    })
}

/// SQLite database for timetable storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/sis.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("sis.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS schedules (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                label   TEXT NOT NULL,
                active  INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS groups (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                year        INTEGER NOT NULL,
                UNIQUE (year, name)
            );

            CREATE TABLE IF NOT EXISTS educators (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS subjects (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS lessons (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                schedule_id   INTEGER NOT NULL REFERENCES schedules(id),
                group_id      INTEGER NOT NULL REFERENCES groups(id),
                first_part    INTEGER NOT NULL,
                second_part   INTEGER NOT NULL,
                subject_id    INTEGER NOT NULL REFERENCES subjects(id),
                teacher_id    INTEGER NOT NULL REFERENCES educators(id),
                day           INTEGER NOT NULL,
                lesson_order  INTEGER NOT NULL,
                room          INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS substitutions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                date          TEXT NOT NULL,
                lesson_order  INTEGER NOT NULL,
                group_id      INTEGER NOT NULL REFERENCES groups(id),
                part1         INTEGER NOT NULL,
                part2         INTEGER NOT NULL,
                teacher_id    INTEGER REFERENCES educators(id),
                comment       TEXT,
                UNIQUE (date, lesson_order, group_id, teacher_id),
                UNIQUE (date, lesson_order, group_id, part1),
                UNIQUE (date, lesson_order, group_id, part2)
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_lessons_group_day ON lessons(group_id, day, lesson_order);
            CREATE INDEX IF NOT EXISTS idx_lessons_teacher_day ON lessons(teacher_id, day, lesson_order);
            CREATE INDEX IF NOT EXISTS idx_substitutions_date ON substitutions(date);",
        )?;
        migrations::migrate(&self.conn)?;
        Ok(())
    }

    // === Timetable versions ===

    pub fn add_schedule(&self, label: &str, active: bool) -> Result<ScheduleVersion> {
        self.conn.execute(
            "INSERT INTO schedules (label, active) VALUES (?1, ?2)",
            params![label, active],
        )?;
        Ok(ScheduleVersion {
            id: ScheduleId(self.conn.last_insert_rowid()),
            label: label.to_string(),
            active,
        })
    }

    pub fn list_schedules(&self) -> Result<Vec<ScheduleVersion>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label, active FROM schedules ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ScheduleVersion {
                id: ScheduleId(row.get(0)?),
                label: row.get(1)?,
                active: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Mark a version active or inactive. Returns false if it does not exist.
    pub fn set_schedule_active(&self, id: ScheduleId, active: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE schedules SET active = ?1 WHERE id = ?2",
            params![active, id.0],
        )?;
        Ok(changed > 0)
    }

    pub fn active_schedules(&self) -> Result<Vec<ScheduleId>> {
        Ok(self
            .list_schedules()?
            .into_iter()
            .filter(|s| s.active)
            .map(|s| s.id)
            .collect())
    }

    // === Groups, educators, subjects ===

    pub fn add_group(&self, name: &str, year: u8) -> Result<Group> {
        self.conn.execute(
            "INSERT INTO groups (name, year) VALUES (?1, ?2)",
            params![name, year],
        )?;
        Ok(Group {
            id: GroupId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            year,
        })
    }

    pub fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, year FROM groups WHERE id = ?1",
                params![id.0],
                row_to_group,
            )
            .optional()?)
    }

    pub fn add_educator(
        &self,
        title: Option<&str>,
        first_name: &str,
        last_name: &str,
    ) -> Result<Educator> {
        self.conn.execute(
            "INSERT INTO educators (title, first_name, last_name) VALUES (?1, ?2, ?3)",
            params![title, first_name, last_name],
        )?;
        Ok(Educator {
            id: EducatorId(self.conn.last_insert_rowid()),
            title: title.map(str::to_string),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    pub fn get_educator(&self, id: EducatorId) -> Result<Option<Educator>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, title, first_name, last_name FROM educators WHERE id = ?1",
                params![id.0],
                row_to_educator,
            )
            .optional()?)
    }

    pub fn list_educators(&self) -> Result<Vec<Educator>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, first_name, last_name FROM educators ORDER BY last_name, id",
        )?;
        let rows = stmt.query_map([], row_to_educator)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Find a subject by name or create it.
    pub fn ensure_subject(&self, name: &str) -> Result<Subject> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM subjects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let id = match existing {
            Some(id) => id,
            None => {
                self.conn
                    .execute("INSERT INTO subjects (name) VALUES (?1)", params![name])?;
                self.conn.last_insert_rowid()
            }
        };
        Ok(Subject {
            id: SubjectId(id),
            name: name.to_string(),
        })
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM subjects ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Subject {
                id: SubjectId(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === Students ===

    pub fn add_student(&self, first_name: &str, last_name: &str) -> Result<Student> {
        self.conn.execute(
            "INSERT INTO students (first_name, last_name) VALUES (?1, ?2)",
            params![first_name, last_name],
        )?;
        Ok(Student {
            id: StudentId(self.conn.last_insert_rowid()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, first_name, last_name FROM students ORDER BY last_name, id")?;
        let rows = stmt.query_map([], row_to_student)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Record that a student attends one half of a group.
    ///
    /// Replaces an earlier membership of the same student in that group.
    ///
    /// # Errors
    /// Returns a validation error for a whole-group part or an inverted period.
    pub fn add_membership(&self, membership: &GroupMembership) -> Result<()> {
        membership.validate()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO group_memberships (student_id, group_id, part, since, until, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                membership.student.0,
                membership.group.0,
                membership.part.number(),
                membership.since,
                membership.until,
                membership.active,
            ],
        )?;
        Ok(())
    }

    // === Lessons ===

    /// Insert a lesson; its `id` field is ignored and the new id returned.
    ///
    /// # Errors
    /// Returns a validation error for orders outside the school day.
    pub fn add_lesson(&self, lesson: &Lesson) -> Result<i64> {
        lesson.validate()?;
        let (first, second) = lesson.part.to_flags();
        self.conn.execute(
            "INSERT INTO lessons (schedule_id, group_id, first_part, second_part, subject_id,
                                  teacher_id, day, lesson_order, room)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                lesson.schedule.0,
                lesson.group.0,
                first,
                second,
                lesson.subject.0,
                lesson.teacher.0,
                lesson.day.index(),
                lesson.order,
                lesson.room,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_lesson(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM lessons WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    // === Substitutions ===

    /// Insert a substitution; its `id` field is ignored and the new id returned.
    pub fn add_substitution(&self, sub: &Substitution) -> Result<i64> {
        sub.validate()?;
        let (part1, part2) = sub.part.to_flags();
        self.conn.execute(
            "INSERT INTO substitutions (date, lesson_order, group_id, part1, part2, teacher_id, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                sub.date,
                sub.order,
                sub.group.0,
                part1,
                part2,
                sub.teacher.map(|t| t.0),
                sub.comment,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_substitution(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM substitutions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Substitutions dated `since` or later (all when `None`), by date.
    pub fn list_substitutions(&self, since: Option<NaiveDate>) -> Result<Vec<Substitution>> {
        let sql = format!(
            "SELECT {SUBSTITUTION_COLUMNS} FROM substitutions
             WHERE ?1 IS NULL OR date >= ?1
             ORDER BY date, lesson_order, group_id, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![since], row_to_substitution)?;
        let mut subs = Vec::new();
        for row in rows {
            if let Some(sub) = row? {
                subs.push(sub);
            }
        }
        Ok(subs)
    }

    // === Lucky numbers ===

    pub fn add_lucky_number(&self, number: &LuckyNumber) -> Result<()> {
        self.conn.execute(
            "INSERT INTO lucky_numbers (date, number) VALUES (?1, ?2)",
            params![number.date, number.number],
        )?;
        Ok(())
    }
}

impl Repository for Database {
    fn find_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
        let mut conditions = vec!["(first_part = 1 OR second_part = 1)".to_string()];
        let mut values: Vec<Value> = Vec::new();

        if let Some(group) = query.group {
            values.push(Value::Integer(group.0));
            conditions.push(format!("group_id = ?{}", values.len()));
        }
        if let Some(teacher) = query.teacher {
            values.push(Value::Integer(teacher.0));
            conditions.push(format!("teacher_id = ?{}", values.len()));
        }
        if let Some(day) = query.day {
            values.push(Value::Integer(i64::from(day.index())));
            conditions.push(format!("day = ?{}", values.len()));
        }
        if let Some(order) = query.order {
            values.push(Value::Integer(i64::from(order)));
            conditions.push(format!("lesson_order = ?{}", values.len()));
        }
        if !query.schedules.is_empty() {
            let mut placeholders = Vec::with_capacity(query.schedules.len());
            for schedule in &query.schedules {
                values.push(Value::Integer(schedule.0));
                placeholders.push(format!("?{}", values.len()));
            }
            conditions.push(format!("schedule_id IN ({})", placeholders.join(", ")));
        }

        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE {}
             ORDER BY day, lesson_order, group_id, second_part, id",
            conditions.join(" AND ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_lesson)?;
        let mut lessons = Vec::new();
        for row in rows {
            if let Some(lesson) = row? {
                lessons.push(lesson);
            }
        }
        Ok(lessons)
    }

    fn find_substitutions(&self, date: NaiveDate) -> Result<Vec<Substitution>> {
        let sql = format!(
            "SELECT {SUBSTITUTION_COLUMNS} FROM substitutions
             WHERE date = ?1
             ORDER BY lesson_order, group_id, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![date], row_to_substitution)?;
        let mut subs = Vec::new();
        for row in rows {
            if let Some(sub) = row? {
                subs.push(sub);
            }
        }
        Ok(subs)
    }

    fn find_educators(&self, last_name: &str) -> Result<Vec<Educator>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, first_name, last_name FROM educators
             WHERE last_name LIKE ?1
             ORDER BY last_name, id",
        )?;
        let rows = stmt.query_map(params![last_name], row_to_educator)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_groups(&self) -> Result<Vec<Group>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, year FROM groups ORDER BY year, name")?;
        let rows = stmt.query_map([], row_to_group)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_students(&self, last_name: &str) -> Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name FROM students
             WHERE last_name LIKE ?1
             ORDER BY last_name, id",
        )?;
        let rows = stmt.query_map(params![last_name], row_to_student)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_memberships(&self, query: &MembershipQuery) -> Result<Vec<GroupMembership>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, group_id, part, since, until, active FROM group_memberships
             WHERE (?1 IS NULL OR student_id = ?1) AND (?2 IS NULL OR group_id = ?2)
             ORDER BY group_id, student_id",
        )?;
        let rows = stmt.query_map(
            params![query.student.map(|s| s.0), query.group.map(|g| g.0)],
            row_to_membership,
        )?;
        let mut memberships = Vec::new();
        for row in rows {
            if let Some(membership) = row? {
                memberships.push(membership);
            }
        }
        Ok(memberships)
    }

    fn lucky_numbers(&self) -> Result<Vec<LuckyNumber>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, number FROM lucky_numbers ORDER BY date")?;
        let rows = stmt.query_map([], |row| {
            Ok(LuckyNumber {
                date: row.get(0)?,
                number: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
