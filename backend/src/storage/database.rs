//! # Database
//!
//! Opens the SQLite file shared with the events application and brings its
//! schema up to what the report subsystem reads and writes. Databases created
//! before reports carried an author or a unique path are upgraded in place;
//! if the upgrade is impossible `open` fails and the server does not start.

use log::info;
use rusqlite::Connection;
use std::path::Path;

const TABLES: &str = "
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        date TEXT,
        venue TEXT,
        department TEXT,
        description TEXT,
        event_photo TEXT,
        attendance_photo TEXT
    );

    CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id INTEGER NOT NULL,
        file_path TEXT NOT NULL,
        created_by INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
";

const INDEXES: &str = "
    CREATE UNIQUE INDEX IF NOT EXISTS reports_by_file_path ON reports (file_path);
    CREATE INDEX IF NOT EXISTS reports_by_created_at ON reports (created_at DESC, id DESC);
    CREATE INDEX IF NOT EXISTS reports_by_event ON reports (event_id);
";

/// Columns that older databases may lack, with the definition used to add them.
const EVENT_COLUMNS: [(&str, &str); 2] = [("event_photo", "TEXT"), ("attendance_photo", "TEXT")];

/// Reports recorded before authors were tracked are attributed to user 0.
const REPORT_COLUMNS: [(&str, &str); 1] = [("created_by", "INTEGER NOT NULL DEFAULT 0")];

/// Opens the database file, creating or upgrading the schema as needed.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(TABLES)?;
    add_missing_columns(conn, "events", &EVENT_COLUMNS)?;
    add_missing_columns(conn, "reports", &REPORT_COLUMNS)?;
    // Fails on a database that already registers one path twice.
    conn.execute_batch(INDEXES)
}

fn add_missing_columns(conn: &Connection, table: &str, columns: &[(&str, &str)]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let existing = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    for (name, definition) in columns {
        if !existing.iter().any(|column| column == name) {
            info!("Adding column {}.{} to existing database", table, name);
            conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, name, definition))?;
        }
    }
    Ok(())
}
