//! # Report Service
//!
//! Entry point used by the HTTP layer. Generation runs these steps in order,
//! and any failure stops the sequence:
//!
//! 1.  Look the event up in the catalog (`EventNotFound`).
//! 2.  Load the letterhead (`TemplateMissing`).
//! 3.  Compose the document in memory (`Composition`).
//! 4.  Pick a fresh artifact path: event id, UTC timestamp and a random token.
//! 5.  Store the document (`StorageWrite`, not retried).
//! 6.  Register the artifact. If that fails the stored file is removed again.
//!
//! Because the registry row is written last, a failed generation never leaves
//! a row pointing at a file that does not exist. Generating twice for the same
//! event yields two artifacts and two rows.

use crate::catalog::EventCatalog;
use crate::error::{ReportError, ReportResult};
use crate::reports::compose::DocumentComposer;
use crate::reports::registry::ReportRegistry;
use crate::reports::template::TemplateProvider;
use crate::storage::artifacts::ReportStore;
use chrono::{DateTime, Utc};
use common::model::report::{GeneratedReport, ReportSummary};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// A stored report ready to be sent to a client.
#[derive(Debug)]
pub struct ReportDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct ReportService {
    catalog: Arc<dyn EventCatalog>,
    templates: TemplateProvider,
    composer: DocumentComposer,
    store: Arc<dyn ReportStore>,
    registry: ReportRegistry,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(
        catalog: Arc<dyn EventCatalog>,
        templates: TemplateProvider,
        composer: DocumentComposer,
        store: Arc<dyn ReportStore>,
        registry: ReportRegistry,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        ReportService {
            catalog,
            templates,
            composer,
            store,
            registry,
            reports_dir: reports_dir.into(),
        }
    }

    /// Composes, stores and registers a new report for `event_id` on behalf of `actor_id`.
    ///
    /// # Returns
    /// The registry row of the new artifact.
    ///
    /// # Errors
    /// `EventNotFound`, `TemplateMissing`, `Composition` or `StorageWrite`;
    /// none of them leave a registry row behind.
    pub fn generate_report(&self, event_id: i64, actor_id: i64) -> ReportResult<GeneratedReport> {
        let event = self
            .catalog
            .get(event_id)?
            .ok_or(ReportError::EventNotFound(event_id))?;
        let template = self.templates.load()?;
        let document = self.composer.compose(&template, &event)?;

        let path = self.artifact_path(event_id, Utc::now());
        let file_path = path.to_string_lossy().into_owned();
        debug!("Writing report for event {} to {}", event_id, file_path);
        self.store
            .write(&path, &document)
            .map_err(|source| ReportError::StorageWrite {
                path: file_path.clone(),
                source,
            })?;

        let report = match self.registry.record(event_id, &file_path, actor_id) {
            Ok(report) => report,
            Err(e) => {
                if let Err(remove) = self.store.remove(&path) {
                    warn!("Could not remove unregistered report {}: {}", file_path, remove);
                }
                return Err(e);
            }
        };
        info!(
            "Generated report {} for event {} by user {} at {}",
            report.id, event_id, actor_id, report.file_path
        );
        Ok(report)
    }

    /// `<reports_dir>/event_<id>_<yyyymmddTHHMMSS>_<token>.docx`. The random
    /// token keeps concurrent generations for the same event apart.
    fn artifact_path(&self, event_id: i64, at: DateTime<Utc>) -> PathBuf {
        self.reports_dir.join(format!(
            "event_{}_{}_{}.docx",
            event_id,
            at.format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple()
        ))
    }

    pub fn list_all(&self) -> ReportResult<Vec<GeneratedReport>> {
        self.registry.list_all()
    }

    pub fn list_for_event(&self, event_id: i64) -> ReportResult<Vec<GeneratedReport>> {
        self.registry.list_for_event(event_id)
    }

    /// Every report with its event's title and date, most recent first.
    pub fn list_summaries(&self) -> ReportResult<Vec<ReportSummary>> {
        let reports = self.registry.list_all()?;
        let mut events = HashMap::new();
        let mut summaries = Vec::with_capacity(reports.len());
        for report in reports {
            if !events.contains_key(&report.event_id) {
                events.insert(report.event_id, self.catalog.get(report.event_id)?);
            }
            let event = events.get(&report.event_id).and_then(Option::as_ref);
            summaries.push(ReportSummary {
                event_title: event.map(|e| e.title.clone()),
                event_date: event.map(|e| e.date.clone()),
                report,
            });
        }
        Ok(summaries)
    }

    pub fn get(&self, report_id: i64) -> ReportResult<GeneratedReport> {
        self.registry.get(report_id)
    }

    /// Reads back a stored report. Any authenticated actor may download any
    /// report; `actor_id` is only logged.
    ///
    /// # Errors
    /// `NotFound` if the report is unknown or its artifact is gone from storage.
    pub fn get_download(&self, report_id: i64, actor_id: i64) -> ReportResult<ReportDownload> {
        let report = self.registry.get(report_id)?;
        let path = Path::new(&report.file_path);
        let bytes = match self.store.read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Report {} is registered but {} is missing", report_id, report.file_path);
                return Err(ReportError::NotFound(report_id));
            }
            Err(source) => {
                return Err(ReportError::StorageRead {
                    path: report.file_path.clone(),
                    source,
                })
            }
        };

        let file_name = match self.catalog.get(report.event_id)? {
            Some(event) => download_file_name(&event.title),
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report.docx".to_string()),
        };
        info!("User {} downloaded report {} as {}", actor_id, report_id, file_name);
        Ok(ReportDownload { file_name, bytes })
    }
}

/// `Tech Fest 2024` becomes `Tech_Fest_2024.docx`. Characters that are unsafe
/// in a file name are dropped.
fn download_file_name(title: &str) -> String {
    let stem: String = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "report.docx".to_string()
    } else {
        format!("{}.docx", stem)
    }
}
