use crate::config::FilterConfig;
use crate::crawler::RawRecord;

/// Why a raw record was left out of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    MissingStudentId,
    MissingSectionCode,
    Exempted,
    /// No part of the section code contains a digit
    UnresolvedCourse,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingStudentId => "missing student id",
            Self::MissingSectionCode => "missing section code",
            Self::Exempted => "exempted section",
            Self::UnresolvedCourse => "unresolved course code",
        }
    }
}

/// Drops rows that are expected noise in the listing
///
/// Exemption markers are matched case-sensitively anywhere in the section code.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    exemption_markers: Vec<String>,
}

impl RecordFilter {
    pub fn new(exemption_markers: Vec<String>) -> Self {
        Self { exemption_markers }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.exemption_markers.clone())
    }

    /// Returns `Err(reason)` when the record must be dropped
    pub fn check(&self, record: &RawRecord) -> Result<(), DropReason> {
        if record.student_id.is_empty() {
            return Err(DropReason::MissingStudentId);
        }

        if record.section_code.is_empty() {
            return Err(DropReason::MissingSectionCode);
        }

        if self
            .exemption_markers
            .iter()
            .any(|marker| record.section_code.contains(marker.as_str()))
        {
            return Err(DropReason::Exempted);
        }

        Ok(())
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student_id: &str, section_code: &str) -> RawRecord {
        RawRecord {
            row_index: "1".to_string(),
            student_id: student_id.to_string(),
            section_code: section_code.to_string(),
            course_name: "Intro".to_string(),
            group_label: "CL".to_string(),
            credits: "3".to_string(),
        }
    }

    #[test]
    fn test_accepts_regular_record() {
        let filter = RecordFilter::default();
        assert_eq!(filter.check(&record("S1", "INT2211 11")), Ok(()));
    }

    #[test]
    fn test_drops_missing_student_id() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("", "INT2211 11")),
            Err(DropReason::MissingStudentId)
        );
    }

    #[test]
    fn test_drops_missing_section_code() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("S1", "")),
            Err(DropReason::MissingSectionCode)
        );
    }

    #[test]
    fn test_drops_exempted_sections() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("S1", "INT2211 mien")),
            Err(DropReason::Exempted)
        );
        assert_eq!(
            filter.check(&record("S1", "PES1020 1")),
            Err(DropReason::Exempted)
        );
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let filter = RecordFilter::default();
        assert_eq!(filter.check(&record("S1", "INT2211 Mien")), Ok(()));
        assert_eq!(filter.check(&record("S1", "pes1020 1")), Ok(()));
    }

    #[test]
    fn test_custom_markers() {
        let filter = RecordFilter::new(vec!["GDTC".to_string()]);
        assert_eq!(
            filter.check(&record("S1", "GDTC 101")),
            Err(DropReason::Exempted)
        );
        assert_eq!(filter.check(&record("S1", "INT2211 mien")), Ok(()));
    }
}
