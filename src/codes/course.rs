use std::fmt;

/// Canonical identifier of a course, shared by all of its sections
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseCode(String);

impl CourseCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the course code from a compound section code
///
/// Some course codes are compact (`INT2211 11`) and others are spaced
/// (`INT 3103 01`). Whitespace-separated parts are concatenated from the left
/// until the first part containing a numeric character has been appended.
///
/// Returns `None` when no part contains a digit.
///
/// # Examples
///
/// ```
/// use dkmh_harvest::codes::extract_course_code;
///
/// assert_eq!(extract_course_code("INT2211 11").unwrap().as_str(), "INT2211");
/// assert_eq!(extract_course_code("INT 3103 01").unwrap().as_str(), "INT3103");
/// assert!(extract_course_code("ABCDEF").is_none());
/// ```
pub fn extract_course_code(section_code: &str) -> Option<CourseCode> {
    let mut prefix = String::new();

    for part in section_code.split_whitespace() {
        prefix.push_str(part);
        if part.chars().any(char::is_numeric) {
            return Some(CourseCode(prefix));
        }
    }

    None
}
