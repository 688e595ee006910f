//! # Report Registry
//!
//! The `reports` table: one row per stored artifact, with the event it was
//! generated for, who asked for it and when. Listings are most recent first,
//! ties broken by the higher id.

use crate::error::{ReportError, ReportResult};
use chrono::{DateTime, Utc};
use common::model::report::GeneratedReport;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::sync::{Mutex, MutexGuard, PoisonError};

const REPORT_COLUMNS: &str = "id, event_id, file_path, created_by, created_at";

/// Append-only record of generated report artifacts.
///
/// Nothing here updates or deletes a row. Callers must only `record` a path
/// after the artifact behind it has been stored.
pub struct ReportRegistry {
    conn: Mutex<Connection>,
}

impl ReportRegistry {
    /// Wraps a connection whose schema is already in place (see `storage::database`).
    pub fn new(conn: Connection) -> Self {
        ReportRegistry {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a row for a freshly stored artifact, stamped with the current time.
    ///
    /// # Errors
    /// `DuplicatePath` if `file_path` is already registered.
    pub fn record(&self, event_id: i64, file_path: &str, created_by: i64) -> ReportResult<GeneratedReport> {
        self.record_at(event_id, file_path, created_by, Utc::now())
    }

    pub(crate) fn record_at(
        &self,
        event_id: i64,
        file_path: &str,
        created_by: i64,
        created_at: DateTime<Utc>,
    ) -> ReportResult<GeneratedReport> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT INTO reports (event_id, file_path, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![event_id, file_path, created_by, created_at],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(ReportError::DuplicatePath(file_path.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(GeneratedReport {
            id: conn.last_insert_rowid(),
            event_id,
            file_path: file_path.to_string(),
            created_by,
            created_at,
        })
    }

    /// Every report, most recent first.
    pub fn list_all(&self) -> ReportResult<Vec<GeneratedReport>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC, id DESC",
            REPORT_COLUMNS
        ))?;
        let reports = stmt
            .query_map([], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    /// Reports generated for one event, most recent first.
    pub fn list_for_event(&self, event_id: i64) -> ReportResult<Vec<GeneratedReport>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reports WHERE event_id = ?1 ORDER BY created_at DESC, id DESC",
            REPORT_COLUMNS
        ))?;
        let reports = stmt
            .query_map(params![event_id], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    pub fn get(&self, report_id: i64) -> ReportResult<GeneratedReport> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS))?;
        stmt.query_row(params![report_id], report_from_row)
            .optional()?
            .ok_or(ReportError::NotFound(report_id))
    }
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<GeneratedReport> {
    Ok(GeneratedReport {
        id: row.get(0)?,
        event_id: row.get(1)?,
        file_path: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database;
    use chrono::{Duration, TimeZone};

    fn registry() -> ReportRegistry {
        let conn = Connection::open_in_memory().unwrap();
        database::init_schema(&conn).unwrap();
        ReportRegistry::new(conn)
    }

    #[test]
    fn record_then_get() {
        let registry = registry();

        let report = registry
            .record(1, "generated_reports/event_1_a.docx", 7)
            .unwrap();

        assert_eq!(report.event_id, 1);
        assert_eq!(report.created_by, 7);
        assert_eq!(registry.get(report.id).unwrap(), report);
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let registry = registry();
        registry.record(1, "generated_reports/event_1_a.docx", 7).unwrap();

        match registry.record(2, "generated_reports/event_1_a.docx", 8) {
            Err(ReportError::DuplicatePath(path)) => {
                assert_eq!(path, "generated_reports/event_1_a.docx")
            }
            other => panic!("expected DuplicatePath, got {:?}", other),
        }
        assert_eq!(registry.list_all().unwrap().len(), 1);
    }

    #[test]
    fn get_unknown_report_is_not_found() {
        assert!(matches!(registry().get(99), Err(ReportError::NotFound(99))));
    }

    #[test]
    fn list_all_is_most_recent_first_whatever_the_insertion_order() {
        let registry = registry();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        for (n, offset) in [3, 1, 5, 2, 5, 0, 4].into_iter().enumerate() {
            registry
                .record_at(1, &format!("r{}.docx", n), 7, base + Duration::minutes(offset))
                .unwrap();
        }

        let reports = registry.list_all().unwrap();

        assert_eq!(reports.len(), 7);
        for pair in reports.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            if pair[0].created_at == pair[1].created_at {
                assert!(pair[0].id > pair[1].id);
            }
        }
        assert_eq!(reports[0].created_at, base + Duration::minutes(5));
    }

    #[test]
    fn sub_second_timestamps_keep_their_order() {
        let registry = registry();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        registry.record_at(1, "a.docx", 7, base + Duration::milliseconds(900)).unwrap();
        registry.record_at(1, "b.docx", 7, base + Duration::milliseconds(50)).unwrap();
        registry.record_at(1, "c.docx", 7, base).unwrap();

        let paths: Vec<_> = registry
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.file_path)
            .collect();
        assert_eq!(paths, vec!["a.docx", "b.docx", "c.docx"]);
    }

    #[test]
    fn list_for_event_filters_by_event() {
        let registry = registry();
        registry.record(1, "one.docx", 7).unwrap();
        registry.record(2, "two.docx", 7).unwrap();
        registry.record(1, "three.docx", 8).unwrap();

        let reports = registry.list_for_event(1).unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.event_id == 1));
        assert!(registry.list_for_event(3).unwrap().is_empty());
    }
}
