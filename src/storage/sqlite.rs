//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::importers::{Room, TeacherAssignment};
use crate::snapshot::{Course, Enrolment, Section, Snapshot};
use crate::storage::schema::{
    initialize_schema, DROP_SNAPSHOT_SQL, ROOMS_SCHEMA_SQL, SNAPSHOT_SCHEMA_SQL,
    TEACHERS_SCHEMA_SQL,
};
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{RunRecord, RunSummary, SnapshotCounts, Table};
use crate::HarvestError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        course_code: row.get(0)?,
        course_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        credits: row.get(2)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        section_code: row.get(0)?,
        course_code: row.get(1)?,
        group_label: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

fn enrolment_from_row(row: &Row<'_>) -> rusqlite::Result<Enrolment> {
    Ok(Enrolment {
        student_id: row.get(0)?,
        section_code: row.get(1)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Snapshot =====

    fn replace_snapshot(
        &mut self,
        snapshot: &Snapshot,
        run: &RunSummary,
    ) -> StorageResult<(i64, SnapshotCounts)> {
        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.transaction()?;

        tx.execute_batch(DROP_SNAPSHOT_SQL)?;
        tx.execute_batch(SNAPSHOT_SCHEMA_SQL)?;

        let mut counts = SnapshotCounts::default();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO courses (course_code, course_name, credits) VALUES (?1, ?2, ?3)",
            )?;
            for course in &snapshot.courses {
                counts.courses +=
                    stmt.execute(params![course.course_code, course.course_name, course.credits])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sections (section_code, course_code, group_label) VALUES (?1, ?2, ?3)",
            )?;
            for section in &snapshot.sections {
                counts.sections += stmt.execute(params![
                    section.section_code,
                    section.course_code,
                    section.group_label
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO enrolments (student_id, section_code) VALUES (?1, ?2)",
            )?;
            for enrolment in &snapshot.enrolments {
                counts.enrolments +=
                    stmt.execute(params![enrolment.student_id, enrolment.section_code])?;
            }
        }

        tx.execute(
            "INSERT INTO harvest_runs (term_code, config_hash, started_at, finished_at,
             pages_fetched, records_seen, records_dropped)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run.term_code,
                run.config_hash,
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.pages_fetched,
                run.records_seen as i64,
                run.records_dropped as i64
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        tx.commit()?;

        Ok((run_id, counts))
    }

    fn load_snapshot(&self) -> StorageResult<Snapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT course_code, course_name, credits FROM courses ORDER BY course_code",
        )?;
        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT section_code, course_code, group_label FROM sections ORDER BY section_code",
        )?;
        let sections = stmt
            .query_map([], section_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT student_id, section_code FROM enrolments ORDER BY student_id, section_code",
        )?;
        let enrolments = stmt
            .query_map([], enrolment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            courses,
            sections,
            enrolments,
        })
    }

    fn get_course(&self, course_code: &str) -> StorageResult<Option<Course>> {
        let course = self
            .conn
            .query_row(
                "SELECT course_code, course_name, credits FROM courses WHERE course_code = ?1",
                params![course_code],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    fn get_sections_for_course(&self, course_code: &str) -> StorageResult<Vec<Section>> {
        let mut stmt = self.conn.prepare(
            "SELECT section_code, course_code, group_label FROM sections
             WHERE course_code = ?1 ORDER BY section_code",
        )?;
        let sections = stmt
            .query_map(params![course_code], section_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    fn get_enrolments_for_student(&self, student_id: &str) -> StorageResult<Vec<Enrolment>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, section_code FROM enrolments
             WHERE student_id = ?1 ORDER BY section_code",
        )?;
        let enrolments = stmt
            .query_map(params![student_id], enrolment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(enrolments)
    }

    // ===== Run History =====

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, term_code, config_hash, started_at, finished_at,
                 pages_fetched, records_seen, records_dropped
                 FROM harvest_runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        term_code: row.get(1)?,
                        config_hash: row.get(2)?,
                        started_at: row.get(3)?,
                        finished_at: row.get(4)?,
                        pages_fetched: row.get(5)?,
                        records_seen: row.get::<_, i64>(6)? as u64,
                        records_dropped: row.get::<_, i64>(7)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Imported Lookups =====

    fn replace_rooms(&mut self, rooms: &[Room]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        tx.execute_batch("DROP TABLE IF EXISTS rooms;")?;
        tx.execute_batch(ROOMS_SCHEMA_SQL)?;

        let mut stored = 0;
        {
            let mut stmt = tx.prepare("INSERT INTO rooms (room_code, location) VALUES (?1, ?2)")?;
            for room in rooms {
                stored += stmt.execute(params![room.room_code, room.location])?;
            }
        }

        tx.commit()?;
        Ok(stored)
    }

    fn replace_teachers(&mut self, assignments: &[TeacherAssignment]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        tx.execute_batch("DROP TABLE IF EXISTS teachers;")?;
        tx.execute_batch(TEACHERS_SCHEMA_SQL)?;

        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO teachers (name, course_code, class_type) VALUES (?1, ?2, ?3)",
            )?;
            for assignment in assignments {
                stored += stmt.execute(params![
                    assignment.name,
                    assignment.course_code,
                    assignment.class_type
                ])?;
            }
        }

        tx.commit()?;
        Ok(stored)
    }

    // ===== Statistics =====

    fn count_rows(&self, table: Table) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.to_db_string()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
