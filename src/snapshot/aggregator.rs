use crate::codes::extract_course_code;
use crate::crawler::RawRecord;
use crate::snapshot::{Course, Enrolment, Section, Snapshot};
use std::collections::BTreeMap;

/// Outcome of accumulating one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulated {
    Accepted,
    /// The section code has no numeric part; the record was not stored
    UnresolvedCourse,
}

/// Folds accepted records into courses, sections and enrolments
///
/// One aggregator is owned by a single run and consumed by [`Aggregator::finalize`].
///
/// - Courses keep the name and credits of the first record that names them.
/// - Sections keep the course and group of the last record that names them.
/// - Enrolments are appended as seen; duplicate pairs are left for storage to collapse.
#[derive(Debug, Default)]
pub struct Aggregator {
    courses: BTreeMap<String, Course>,
    sections: BTreeMap<String, Section>,
    enrolments: Vec<Enrolment>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one filtered record to the snapshot under construction
    pub fn accumulate(&mut self, record: RawRecord) -> Accumulated {
        let course_code = match extract_course_code(&record.section_code) {
            Some(code) => code.into_string(),
            None => return Accumulated::UnresolvedCourse,
        };

        self.courses
            .entry(course_code.clone())
            .or_insert_with(|| Course {
                course_code: course_code.clone(),
                course_name: record.course_name,
                credits: record.credits.trim().parse().ok(),
            });

        self.sections.insert(
            record.section_code.clone(),
            Section {
                section_code: record.section_code.clone(),
                course_code,
                group_label: record.group_label,
            },
        );

        self.enrolments.push(Enrolment {
            student_id: record.student_id,
            section_code: record.section_code,
        });

        Accumulated::Accepted
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn enrolment_count(&self) -> usize {
        self.enrolments.len()
    }

    /// Consumes the aggregator and returns the snapshot
    pub fn finalize(self) -> Snapshot {
        Snapshot {
            courses: self.courses.into_values().collect(),
            sections: self.sections.into_values().collect(),
            enrolments: self.enrolments,
        }
    }
}
