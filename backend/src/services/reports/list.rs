//! # Report Listing Service
//!
//! Backend for `GET /api/reports` and `GET /api/reports/event/{event_id}`.

use super::blocking_failed;
use crate::error::ReportError;
use crate::identity::Actor;
use crate::reports::service::ReportService;
use actix_web::{web, HttpResponse};

/// `GET /api/reports`: every report with its event's title and date.
pub async fn process(
    service: web::Data<ReportService>,
    _actor: Actor,
) -> Result<HttpResponse, ReportError> {
    let service = service.into_inner();
    let summaries = web::block(move || service.list_summaries())
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(summaries))
}

/// `GET /api/reports/event/{event_id}`: the reports generated for one event.
pub async fn by_event(
    service: web::Data<ReportService>,
    event_id: web::Path<i64>,
    _actor: Actor,
) -> Result<HttpResponse, ReportError> {
    let event_id = event_id.into_inner();
    let service = service.into_inner();
    let reports = web::block(move || service.list_for_event(event_id))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(reports))
}
