//! Normalized snapshot of one harvest run
//!
//! This module turns the raw rows pulled from listing pages into the three
//! relations that are persisted:
//! - `Course`: one row per course code, named by the first row that mentions it
//! - `Section`: one row per section code, pointing at its course
//! - `Enrolment`: one row per (student, section) pair
//!
//! # Components
//!
//! - `RecordFilter`: drops placeholder and incomplete rows
//! - `Aggregator`: folds accepted rows into the three relations

mod aggregator;
mod filter;

pub use aggregator::{Accumulated, Aggregator};
pub use filter::{DropReason, RecordFilter};

/// A course offered in the harvested term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    /// Credit count as shown on the first row seen; `None` when it is not a number
    pub credits: Option<i64>,
}

/// One section (class group) of a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub section_code: String,
    pub course_code: String,
    /// Group label from the listing, e.g. `CL` for the whole-class group
    pub group_label: String,
}

/// A student registered in a section
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Enrolment {
    pub student_id: String,
    pub section_code: String,
}

/// Full replacement set of relations produced by one run
///
/// Courses and sections are ordered by key. Enrolments keep page-arrival
/// order and may contain duplicate pairs; storage collapses them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub sections: Vec<Section>,
    pub enrolments: Vec<Enrolment>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.sections.is_empty() && self.enrolments.is_empty()
    }
}
