//! # Report Download Service
//!
//! Backend for `GET /api/reports/{report_id}/download`: reads the stored
//! document back and serves it as a Word attachment.

use super::blocking_failed;
use crate::error::ReportError;
use crate::identity::Actor;
use crate::reports::service::ReportService;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use log::error;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Actix web handler for `GET /api/reports/{report_id}/download`.
///
/// Any authenticated user may download any report. The attachment is named
/// after the event title, e.g. `Tech_Fest.docx`.
///
/// # Arguments
/// * `report_id` - The registry id of the report, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the document bytes.
/// - `404 Not Found` if the report is unknown or its file is gone.
pub async fn process(
    service: web::Data<ReportService>,
    report_id: web::Path<i64>,
    actor: Actor,
) -> Result<HttpResponse, ReportError> {
    let report_id = report_id.into_inner();
    let service = service.into_inner();
    let download = web::block(move || service.get_download(report_id, actor.user_id))
        .await
        .map_err(blocking_failed)?
        .inspect_err(|e| error!("Download of report {} failed: {}", report_id, e))?;

    Ok(HttpResponse::Ok()
        .content_type(DOCX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download.file_name)],
        })
        .body(download.bytes))
}
