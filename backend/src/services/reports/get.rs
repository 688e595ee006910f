//! # Report Lookup Service
//!
//! Backend for `GET /api/reports/{report_id}`: returns the registry row of a
//! single generated report, without its document bytes.

use super::blocking_failed;
use crate::error::ReportError;
use crate::identity::Actor;
use crate::reports::service::ReportService;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /api/reports/{report_id}`.
///
/// # Arguments
/// * `report_id` - The registry id of the report, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the `GeneratedReport` as JSON.
/// - `404 Not Found` if no report has that id.
pub async fn process(
    service: web::Data<ReportService>,
    report_id: web::Path<i64>,
    _actor: Actor,
) -> Result<HttpResponse, ReportError> {
    let report_id = report_id.into_inner();
    let service = service.into_inner();
    let report = web::block(move || service.get(report_id))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(report))
}
