use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated artifact. Rows are append-only: a regeneration produces a
/// new row with its own `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub id: i64,
    pub event_id: i64,
    /// Storage path of the `.docx` artifact. Unique across the registry.
    pub file_path: String,
    /// Id of the user who triggered the generation (audit only).
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Listing row: a report joined with the title and date of its event.
///
/// The event fields are `None` when the event has since been removed from
/// the catalog; the report itself stays listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub report: GeneratedReport,
    pub event_title: Option<String>,
    pub event_date: Option<String>,
}
