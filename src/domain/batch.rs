//! Per-item outcome rows and the aggregate batch summary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one processed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Succeeded,
    Failed,
}

/// The record produced for one input of a batch run.
///
/// A succeeded row always carries both artifact paths and no error message;
/// a failed row always carries an error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRow {
    /// Input identifier, usually the file name.
    pub input_identifier: String,

    /// Final status for this input.
    pub status: ItemStatus,

    /// Operation handle, when submission got far enough to produce one.
    pub operation_handle: Option<String>,

    /// Path of the verbatim structured artifact.
    pub structured_artifact_path: Option<PathBuf>,

    /// Path of the rendered human-oriented artifact.
    pub rendered_artifact_path: Option<PathBuf>,

    /// Wall-clock processing time for this input.
    pub duration_ms: u64,

    /// Captured error, present exactly when the item failed.
    pub error_message: Option<String>,
}

impl BatchRow {
    /// Build the row for a fully processed input.
    pub fn succeeded(
        input_identifier: impl Into<String>,
        operation_handle: impl Into<String>,
        structured_artifact_path: PathBuf,
        rendered_artifact_path: PathBuf,
        duration_ms: u64,
    ) -> Self {
        Self {
            input_identifier: input_identifier.into(),
            status: ItemStatus::Succeeded,
            operation_handle: Some(operation_handle.into()),
            structured_artifact_path: Some(structured_artifact_path),
            rendered_artifact_path: Some(rendered_artifact_path),
            duration_ms,
            error_message: None,
        }
    }

    /// Build the row for an input whose submit, poll, or export failed.
    pub fn failed(
        input_identifier: impl Into<String>,
        operation_handle: Option<String>,
        error_message: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            input_identifier: input_identifier.into(),
            status: ItemStatus::Failed,
            operation_handle,
            structured_artifact_path: None,
            rendered_artifact_path: None,
            duration_ms,
            error_message: Some(error_message.into()),
        }
    }
}

/// Aggregate record of one batch run, serialized as the summary artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Unique identifier for this run.
    pub run_id: Uuid,

    /// Identifier of the input collection (usually the source directory).
    pub collection_id: String,

    /// Processing profile the inputs were analyzed with.
    pub profile: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished (all rows final).
    pub finished_at: Option<DateTime<Utc>>,

    /// One row per input, in input order.
    pub rows: Vec<BatchRow>,
}

impl BatchSummary {
    /// Start a new, empty summary.
    pub fn new(collection_id: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            collection_id: collection_id.into(),
            profile: profile.into(),
            started_at: Utc::now(),
            finished_at: None,
            rows: Vec::new(),
        }
    }

    /// Append a finalized row.
    pub fn push(&mut self, row: BatchRow) {
        self.rows.push(row);
    }

    /// Mark the run finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of rows that succeeded.
    pub fn succeeded_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == ItemStatus::Succeeded)
            .count()
    }

    /// Number of rows that failed.
    pub fn failed_count(&self) -> usize {
        self.rows.len() - self.succeeded_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_row_invariants() {
        let row = BatchRow::succeeded(
            "a.pdf",
            "https://svc/ops/1",
            PathBuf::from("/out/a_results.json"),
            PathBuf::from("/out/a_formatted.md"),
            1200,
        );

        assert_eq!(row.status, ItemStatus::Succeeded);
        assert!(row.structured_artifact_path.is_some());
        assert!(row.rendered_artifact_path.is_some());
        assert!(row.error_message.is_none());
    }

    #[test]
    fn test_failed_row_invariants() {
        let row = BatchRow::failed("b.pdf", None, "network down", 40);

        assert_eq!(row.status, ItemStatus::Failed);
        assert!(row.structured_artifact_path.is_none());
        assert!(row.rendered_artifact_path.is_none());
        assert_eq!(row.error_message.as_deref(), Some("network down"));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::new("invoices", "products");
        summary.push(BatchRow::failed("a.pdf", None, "boom", 10));
        summary.push(BatchRow::succeeded(
            "b.pdf",
            "h",
            PathBuf::from("s"),
            PathBuf::from("r"),
            10,
        ));
        summary.finish();

        assert_eq!(summary.succeeded_count(), 1);
        assert_eq!(summary.failed_count(), 1);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn test_summary_serialization_round_trip() {
        let mut summary = BatchSummary::new("invoices", "products");
        summary.push(BatchRow::failed("a.pdf", None, "boom", 10));

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: BatchSummary = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.collection_id, "invoices");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].error_message.as_deref(), Some("boom"));
    }
}
