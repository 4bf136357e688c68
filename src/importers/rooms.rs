use crate::storage::Storage;
use crate::HarvestError;

/// Rooms in use across campuses, `|`-separated; the suffix names the building
pub const ROOM_LIST: &str = "101-T|102-T|103-A|104-T|105-T|106-A|106-T|107-T|108-B|109-B|110-B|201-A|201-B|202-A|202-B|203-A|203-B|203-T|204-A|204-B|204-T|205-A|205-B|205-T|206-A|206-B|206-T|207-A|207-B|207-T|208-B|208-T|209-B|209-T|210-B|210-T|211-T|213-T|214-T|215-T|216-T|217-T|301-A|302-A|303-A|304-A|304-B|305-A|306-A|307-A|308-B|402-A|402-B|403-A|404-A|405-A|406-A|406-B|407-A|407-B|408-B|409-B|410-B|501-B|502-B|503-B|504-B|505-B|506-B|507-B|508-B|509-B|510-B";

/// Building suffixes and the location they belong to, checked in order
const LOCATION_SUFFIXES: &[(&[char], &str)] = &[
    (&['T'], "Tôn Thất Thuyết"),
    (&['A', 'B'], "Kiều Mai"),
];

/// A room and the campus location it is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_code: String,
    pub location: String,
}

fn location_for(room_code: &str) -> Option<&'static str> {
    LOCATION_SUFFIXES
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|c| room_code.ends_with(*c)))
        .map(|(_, location)| *location)
}

/// Parses a `|`-separated room list
///
/// Rooms whose suffix matches no known building are skipped.
pub fn parse_room_list(list: &str) -> Vec<Room> {
    list.split('|')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .filter_map(|code| {
            let location = location_for(code);
            if location.is_none() {
                tracing::debug!("Skipping room {} with unknown building suffix", code);
            }
            location.map(|location| Room {
                room_code: code.to_string(),
                location: location.to_string(),
            })
        })
        .collect()
}

/// Replaces the stored room lookup with the built-in room list
///
/// # Returns
///
/// The number of rooms stored
pub fn import_rooms(storage: &mut dyn Storage) -> Result<usize, HarvestError> {
    let rooms = parse_room_list(ROOM_LIST);
    tracing::info!("Adding {} rooms to the database...", rooms.len());
    Ok(storage.replace_rooms(&rooms)?)
}
