//! Sequential batch runner with per-item failure isolation.
//!
//! Processes a fixed ordered list of inputs against one processing profile:
//! submit, poll to a terminal state, export artifacts. An item's failure is
//! captured into its summary row and never stops the batch. One aggregate
//! summary artifact is written at the end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::Value;
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::adapters::{content_type_for, AnalysisBackend};
use crate::core::export::{sanitize_token, ExportPaths, ResultExporter, TIMESTAMP_FORMAT};
use crate::core::poller::OperationPoller;
use crate::domain::{BatchRow, BatchSummary};

/// Result of one batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The aggregate record, one row per input in input order.
    pub summary: BatchSummary,

    /// Where the summary artifact was written; `None` when the write
    /// failed (the per-item artifacts on disk remain valid).
    pub summary_path: Option<PathBuf>,
}

/// Runs a list of inputs through submit, poll, and export.
pub struct BatchOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    poller: OperationPoller,
    exporter: ResultExporter,
}

impl BatchOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        poller: OperationPoller,
        exporter: ResultExporter,
    ) -> Self {
        Self {
            backend,
            poller,
            exporter,
        }
    }

    /// Process every input, strictly in order, one at a time.
    ///
    /// Always produces exactly one row per input. Only the absence of a
    /// collaborator could abort a run, and those are supplied at
    /// construction, so this returns an outcome rather than a `Result`.
    #[instrument(skip(self, inputs, profile, collection_id), fields(profile = %profile, collection = %collection_id))]
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        profile: &str,
        collection_id: &str,
    ) -> BatchOutcome {
        let mut summary = BatchSummary::new(collection_id, profile);
        info!(
            run_id = %summary.run_id,
            items = inputs.len(),
            "starting batch run"
        );

        for (index, path) in inputs.iter().enumerate() {
            let identifier = input_identifier(path);
            let started = Instant::now();
            let mut handle = None;

            let row = match self.process_item(path, profile, &mut handle).await {
                Ok((operation_handle, paths)) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    info!(
                        input = %identifier,
                        duration_ms,
                        structured = %paths.structured.display(),
                        rendered = %paths.rendered.display(),
                        "item succeeded"
                    );
                    BatchRow::succeeded(
                        identifier,
                        operation_handle,
                        paths.structured,
                        paths.rendered,
                        duration_ms,
                    )
                }
                Err(e) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    let message = format!("{e:#}");
                    error!(
                        input = %identifier,
                        item = index + 1,
                        duration_ms,
                        error = %message,
                        "item failed, continuing with remaining inputs"
                    );
                    BatchRow::failed(identifier, handle.take(), message, duration_ms)
                }
            };

            summary.push(row);
        }

        summary.finish();
        info!(
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            "batch run finished"
        );

        let summary_path = match self.write_summary(&summary).await {
            Ok(path) => {
                info!(path = %path.display(), "batch summary written");
                Some(path)
            }
            Err(e) => {
                // The per-item artifacts already on disk remain valid.
                warn!(error = %format!("{e:#}"), "no summary produced");
                None
            }
        };

        BatchOutcome {
            summary,
            summary_path,
        }
    }

    /// Submit one input, poll it to completion, and export its result.
    ///
    /// `handle_slot` receives the operation handle as soon as submission
    /// returns one, so a later failure still records it in the row.
    async fn process_item(
        &self,
        path: &Path,
        profile: &str,
        handle_slot: &mut Option<String>,
    ) -> Result<(String, ExportPaths)> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let content_type = content_type_for(path);
        let identifier = input_identifier(path);

        info!(input = %identifier, content_type, "submitting document");
        let handle = self.backend.submit(&bytes, content_type, profile).await?;
        *handle_slot = Some(handle.clone());

        let operation = self.poller.wait_for_completion(&handle).await?;
        let result = operation
            .result
            .as_ref()
            .context("succeeded operation carried no result payload")?;

        let paths = self
            .exporter
            .export(result, Some(&identifier), Some(&handle))
            .await?;

        log_field_digest(&self.exporter, result);

        Ok((handle, paths))
    }

    async fn write_summary(&self, summary: &BatchSummary) -> Result<PathBuf> {
        let dir = self.exporter.output_dir();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let name = format!(
            "{}_{}_{}_summary.json",
            sanitize_token(&summary.collection_id),
            sanitize_token(&summary.profile),
            Local::now().format(TIMESTAMP_FORMAT)
        );
        let path = dir.join(name);

        let body =
            serde_json::to_string_pretty(summary).context("failed to serialize batch summary")?;
        fs::write(&path, body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(path)
    }
}

/// Log a short digest of the top-level fields of a completed result.
fn log_field_digest(exporter: &ResultExporter, result: &Value) {
    for (name, value) in exporter.field_digest(result).into_iter().take(8) {
        info!(field = %name, value = %value, "extracted field");
    }
}

/// Display identifier for an input path, usually its file name.
fn input_identifier(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_identifier_uses_file_name() {
        assert_eq!(input_identifier(Path::new("/data/in/a.pdf")), "a.pdf");
    }

    #[test]
    fn test_input_identifier_falls_back_to_display() {
        assert_eq!(input_identifier(Path::new("/")), "/");
    }
}
