//! dkmh-harvest: course-enrolment harvester
//!
//! This crate crawls the paginated course-registration listing of the
//! university's training portal and normalizes the HTML rows into a small
//! relational snapshot (courses, sections, enrolments) stored in SQLite.

pub mod codes;
pub mod config;
pub mod crawler;
pub mod importers;
pub mod output;
pub mod snapshot;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while interpreting term and course identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Term must be 1, 2 or 3 (the summer term), got {0}")]
    InvalidTerm(i64),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use codes::{extract_course_code, CourseCode, Term, TermCode};
pub use config::Config;
pub use crawler::{run_harvest, Harvester};
pub use snapshot::{Aggregator, Snapshot};
