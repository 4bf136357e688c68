//! Database schema definitions
//!
//! The snapshot relations (`courses`, `sections`, `enrolments`) are dropped
//! and recreated on every successful run. `harvest_runs` accumulates one row
//! per run. `rooms` and `teachers` belong to the importers.

/// SQL schema for the snapshot relations
pub const SNAPSHOT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    course_code TEXT PRIMARY KEY,
    course_name TEXT,
    credits INTEGER
);

CREATE TABLE IF NOT EXISTS sections (
    section_code TEXT PRIMARY KEY,
    course_code TEXT NOT NULL REFERENCES courses(course_code),
    group_label TEXT
);

CREATE INDEX IF NOT EXISTS idx_sections_course ON sections(course_code);

CREATE TABLE IF NOT EXISTS enrolments (
    student_id TEXT NOT NULL,
    section_code TEXT NOT NULL REFERENCES sections(section_code),
    UNIQUE (student_id, section_code)
);

CREATE INDEX IF NOT EXISTS idx_enrolments_section ON enrolments(section_code);
"#;

/// Drops the snapshot relations, dependents first
pub const DROP_SNAPSHOT_SQL: &str = r#"
DROP TABLE IF EXISTS enrolments;
DROP TABLE IF EXISTS sections;
DROP TABLE IF EXISTS courses;
"#;

/// SQL schema for run history
pub const RUNS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS harvest_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    term_code TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL,
    records_seen INTEGER NOT NULL,
    records_dropped INTEGER NOT NULL
);
"#;

/// SQL schema for the room lookup
pub const ROOMS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    room_code TEXT PRIMARY KEY,
    location TEXT
);
"#;

/// SQL schema for teacher assignments
pub const TEACHERS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teachers (
    name TEXT,
    course_code TEXT,
    class_type TEXT,
    UNIQUE (name, course_code, class_type)
);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database; nothing is dropped.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SNAPSHOT_SCHEMA_SQL)?;
    conn.execute_batch(RUNS_SCHEMA_SQL)?;
    conn.execute_batch(ROOMS_SCHEMA_SQL)?;
    conn.execute_batch(TEACHERS_SCHEMA_SQL)?;
    Ok(())
}
