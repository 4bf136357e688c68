//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::importers::{Room, TeacherAssignment};
use crate::snapshot::{Course, Enrolment, Section, Snapshot};
use crate::storage::{RunRecord, RunSummary, SnapshotCounts, Table};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Snapshot =====

    /// Replaces courses, sections and enrolments with a new snapshot
    ///
    /// The replacement is atomic: on error the previous snapshot is left
    /// untouched. Duplicate (student, section) enrolments are collapsed.
    /// A row describing the run is appended to the run history in the same
    /// unit of work.
    ///
    /// # Returns
    ///
    /// The id of the recorded run and the number of rows stored per relation
    fn replace_snapshot(
        &mut self,
        snapshot: &Snapshot,
        run: &RunSummary,
    ) -> StorageResult<(i64, SnapshotCounts)>;

    /// Loads the stored snapshot, ordered by key
    fn load_snapshot(&self) -> StorageResult<Snapshot>;

    /// Gets a course by code
    fn get_course(&self, course_code: &str) -> StorageResult<Option<Course>>;

    /// Gets all sections of a course
    fn get_sections_for_course(&self, course_code: &str) -> StorageResult<Vec<Section>>;

    /// Gets all enrolments of a student
    fn get_enrolments_for_student(&self, student_id: &str) -> StorageResult<Vec<Enrolment>>;

    // ===== Run History =====

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Imported Lookups =====

    /// Replaces the room lookup
    ///
    /// # Returns
    ///
    /// The number of rooms stored
    fn replace_rooms(&mut self, rooms: &[Room]) -> StorageResult<usize>;

    /// Replaces teacher assignments, collapsing duplicates
    ///
    /// # Returns
    ///
    /// The number of distinct assignments stored
    fn replace_teachers(&mut self, assignments: &[TeacherAssignment]) -> StorageResult<usize>;

    // ===== Statistics =====

    /// Counts the rows of one table
    fn count_rows(&self, table: Table) -> StorageResult<u64>;
}
