//! # Errors
//!
//! The failures of the report subsystem and the HTTP status each maps to.

use actix_web::http::StatusCode;
use actix_web::ResponseError;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the report subsystem can surface to a caller.
///
/// Problems with optional photos never show up here: the composer omits the
/// photo and carries on.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report template is missing or unreadable at {path}: {reason}; upload a letterhead document to fix this")]
    TemplateMissing { path: PathBuf, reason: String },

    #[error("event {0} does not exist")]
    EventNotFound(i64),

    #[error("could not compose the report document: {0}")]
    Composition(String),

    #[error("could not store the report at {path}, try again: {source}")]
    StorageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read the report at {path}: {source}")]
    StorageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("a report is already registered at {0}")]
    DuplicatePath(String),

    #[error("report {0} not found")]
    NotFound(i64),

    #[error("authentication required")]
    Forbidden,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("background worker failed: {0}")]
    Blocking(String),
}

impl From<zip::result::ZipError> for ReportError {
    fn from(e: zip::result::ZipError) -> Self {
        ReportError::Composition(e.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ResponseError for ReportError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReportError::TemplateMissing { .. } | ReportError::StorageWrite { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ReportError::EventNotFound(_) | ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::Forbidden => StatusCode::FORBIDDEN,
            ReportError::Composition(_)
            | ReportError::StorageRead { .. }
            | ReportError::DuplicatePath(_)
            | ReportError::Database(_)
            | ReportError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
