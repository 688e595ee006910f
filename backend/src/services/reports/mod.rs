//! # Report Service Module
//!
//! Routes every HTTP request under `/api/reports` to the report subsystem.
//! All routes require an authenticated caller (see `identity::Actor`).
//!
//! ## Sub-modules:
//! - `generate`: composes, stores and registers a new report for an event.
//! - `list`: lists registered reports, globally or for one event.
//! - `get`: returns the registry row of a single report.
//! - `download`: streams a stored report back as a `.docx` attachment.

mod download;
mod generate;
mod get;
mod list;

use crate::error::ReportError;
use actix_web::error::BlockingError;
use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all report-related API endpoints.
const API_PATH: &str = "/api/reports";

/// Configures and returns the Actix `Scope` for all report routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: `list::process`. Every report, most recent first, with the
///     title and date of its event.
///
/// *   **`POST /generate/{event_id}`**: `generate::process`. Generates a new
///     report for the event and returns its registry row. Generating again
///     adds another report; nothing is overwritten.
///
/// *   **`GET /event/{event_id}`**: `list::by_event`. Reports of one event.
///
/// *   **`GET /{report_id}`**: `get::process`. A single registry row.
///
/// *   **`GET /{report_id}/download`**: `download::process`. The stored
///     document, served as an attachment named after the event.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/generate/{event_id}", post().to(generate::process))
        .route("/event/{event_id}", get().to(list::by_event))
        .route("/{report_id}", get().to(get::process))
        .route("/{report_id}/download", get().to(download::process))
}

/// Report work touches SQLite and the filesystem, so handlers run it on the
/// blocking thread pool via `web::block`.
fn blocking_failed(e: BlockingError) -> ReportError {
    ReportError::Blocking(e.to_string())
}
