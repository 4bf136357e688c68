//! Identifier handling for terms and courses
//!
//! This module turns operator input into the portal's internal term code and
//! derives canonical course codes from the compound section codes found in
//! the registration listing.

mod course;
mod term;

// Re-export main types and functions
pub use course::{extract_course_code, CourseCode};
pub use term::{Term, TermCode};
