//! # Report Generation Service
//!
//! Backend for `POST /api/reports/generate/{event_id}`. The handler hands the
//! whole generation (lookup, composition, storage, registration) to
//! `ReportService::generate_report` on the blocking pool and returns the new
//! registry row. Failures are logged here with the event id before being
//! turned into an HTTP response.

use super::blocking_failed;
use crate::error::ReportError;
use crate::identity::Actor;
use crate::reports::service::ReportService;
use actix_web::{web, HttpResponse};
use log::error;

/// Actix web handler for `POST /api/reports/generate/{event_id}`.
///
/// # Arguments
/// * `event_id` - The event to report on, extracted from the URL path.
/// * `actor` - The caller, recorded as the report's author.
///
/// # Returns
/// - `200 OK` with the new `GeneratedReport` as JSON.
/// - `404 Not Found` if the event does not exist.
/// - `503 Service Unavailable` if the template is missing or the report could
///   not be stored; the body says which.
pub async fn process(
    service: web::Data<ReportService>,
    event_id: web::Path<i64>,
    actor: Actor,
) -> Result<HttpResponse, ReportError> {
    let event_id = event_id.into_inner();
    let service = service.into_inner();
    let report = web::block(move || service.generate_report(event_id, actor.user_id))
        .await
        .map_err(blocking_failed)?
        .inspect_err(|e| error!("Report generation for event {} failed: {}", event_id, e))?;
    Ok(HttpResponse::Ok().json(report))
}
