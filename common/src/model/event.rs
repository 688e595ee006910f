use serde::{Deserialize, Serialize};

/// Read-only view of an event record, as handed to the report composer.
///
/// Photo paths are keys into the media store. `None` means the event has no
/// photo of that kind; a path that no longer resolves is handled by the
/// composer, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub venue: String,
    pub department: String,
    pub description: String,
    pub event_photo_path: Option<String>,
    pub attendance_photo_path: Option<String>,
}
