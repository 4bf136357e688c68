//! Lookup importers sharing the harvest database
//!
//! - `rooms`: static room list resolved to campus locations
//! - `teachers`: teacher assignments read from a timetable CSV export

mod rooms;
mod teachers;

pub use rooms::{import_rooms, parse_room_list, Room, ROOM_LIST};
pub use teachers::{import_teachers, read_teacher_assignments, TeacherAssignment};
