use crate::codes::extract_course_code;
use crate::storage::Storage;
use crate::HarvestError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column holding the class code, e.g. `INT2211 1`
const CLASS_CODE_COLUMN: usize = 2;

/// Column holding the class type
const CLASS_TYPE_COLUMN: usize = 4;

/// Column holding the teachers, separated by `+`
const TEACHERS_COLUMN: usize = 5;

/// Class types that are imported: lectures and practicals
const CLASS_TYPES: [&str; 2] = ["LT", "TH"];

/// A teacher giving one type of class for a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherAssignment {
    pub name: String,
    pub course_code: String,
    pub class_type: String,
}

/// Reads teacher assignments from a timetable CSV export
///
/// The export has no reliable header row; rows whose class type is not a
/// lecture or practical (headers included) are skipped, as are rows whose
/// class code has no numeric part.
pub fn read_teacher_assignments<R: Read>(reader: R) -> Result<Vec<TeacherAssignment>, HarvestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut assignments = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let (Some(class_code), Some(class_type), Some(teachers)) = (
            record.get(CLASS_CODE_COLUMN),
            record.get(CLASS_TYPE_COLUMN),
            record.get(TEACHERS_COLUMN),
        ) else {
            continue;
        };

        let class_type = class_type.trim();
        if !CLASS_TYPES.contains(&class_type) {
            continue;
        }

        let Some(course_code) = extract_course_code(class_code) else {
            tracing::debug!("Skipping class '{}' without a course code", class_code);
            continue;
        };

        for name in teachers.split('+').map(str::trim).filter(|n| !n.is_empty()) {
            assignments.push(TeacherAssignment {
                name: name.to_string(),
                course_code: course_code.to_string(),
                class_type: class_type.to_string(),
            });
        }
    }

    Ok(assignments)
}

/// Replaces stored teacher assignments with those read from a CSV file
///
/// # Returns
///
/// The number of distinct assignments stored
pub fn import_teachers(storage: &mut dyn Storage, path: &Path) -> Result<usize, HarvestError> {
    tracing::info!("Extracting data from {}...", path.display());
    let assignments = read_teacher_assignments(File::open(path)?)?;

    tracing::info!("Adding {} teacher assignments to the database...", assignments.len());
    Ok(storage.replace_teachers(&assignments)?)
}
