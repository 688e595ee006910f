//! Read access to event records.
//!
//! Events are created and edited elsewhere; the report subsystem only needs to
//! look one up by id and take a snapshot of the fields that go into a report.

use crate::error::ReportResult;
use common::model::event::EventSnapshot;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, PoisonError};

pub trait EventCatalog: Send + Sync {
    /// The event with `event_id`, or `None` if there is no such event.
    fn get(&self, event_id: i64) -> ReportResult<Option<EventSnapshot>>;
}

/// Event catalog backed by the `events` table.
pub struct SqliteEventCatalog {
    conn: Mutex<Connection>,
}

impl SqliteEventCatalog {
    pub fn new(conn: Connection) -> Self {
        SqliteEventCatalog {
            conn: Mutex::new(conn),
        }
    }
}

impl EventCatalog for SqliteEventCatalog {
    fn get(&self, event_id: i64) -> ReportResult<Option<EventSnapshot>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT id, title, date, venue, department, description, event_photo, attendance_photo
             FROM events WHERE id = ?1",
        )?;
        let event = stmt
            .query_row(params![event_id], |row| {
                Ok(EventSnapshot {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    venue: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    department: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    event_photo_path: non_empty(row.get(6)?),
                    attendance_photo_path: non_empty(row.get(7)?),
                })
            })
            .optional()?;
        Ok(event)
    }
}

/// Upload forms store an empty string when no file was attached.
fn non_empty(path: Option<String>) -> Option<String> {
    path.filter(|p| !p.trim().is_empty())
}
