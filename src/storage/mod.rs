//! Storage module for persisting harvest data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Atomic replacement of the course/section/enrolment snapshot
//! - Run history
//! - Room and teacher lookups written by the importers

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// Description of a successful run, stored alongside its snapshot
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub term_code: String,
    pub config_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_fetched: u32,
    pub records_seen: u64,
    pub records_dropped: u64,
}

/// Represents a run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub term_code: String,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: String,
    pub pages_fetched: u32,
    pub records_seen: u64,
    pub records_dropped: u64,
}

/// Number of rows stored per snapshot relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCounts {
    pub courses: usize,
    pub sections: usize,
    pub enrolments: usize,
}

/// Tables that can be counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Courses,
    Sections,
    Enrolments,
    HarvestRuns,
    Rooms,
    Teachers,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Self::Courses,
        Self::Sections,
        Self::Enrolments,
        Self::HarvestRuns,
        Self::Rooms,
        Self::Teachers,
    ];

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Sections => "sections",
            Self::Enrolments => "enrolments",
            Self::HarvestRuns => "harvest_runs",
            Self::Rooms => "rooms",
            Self::Teachers => "teachers",
        }
    }
}
