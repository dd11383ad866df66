//! Durable artifacts for completed analysis results.
//!
//! Every completed result produces two files in the output directory:
//! a pretty-printed verbatim copy (`*_results.json`) and a rendered
//! markdown view of the named fields (`*_formatted.md`). File names are
//! derived from the document identifier, the operation handle, and a
//! second-precision local timestamp, so repeated exports never collide.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::core::extract::{render, render_array_item, render_object_value};
use crate::domain::TaggedValue;

/// Default location of the named-fields collection inside a result tree.
/// This is a service-schema contract, overridable through configuration.
pub const DEFAULT_FIELDS_POINTER: &str = "/result/contents/0/fields";

/// Timestamp format used in artifact names: sortable, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Paths of the two artifacts written for one result.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// Verbatim structured copy.
    pub structured: PathBuf,

    /// Rendered human-oriented view.
    pub rendered: PathBuf,
}

/// Writes result artifacts into an output directory.
pub struct ResultExporter {
    output_dir: PathBuf,
    fields_pointer: String,
}

impl ResultExporter {
    /// Create an exporter writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fields_pointer: DEFAULT_FIELDS_POINTER.to_string(),
        }
    }

    /// Override the JSON pointer at which the named fields live.
    pub fn with_fields_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.fields_pointer = pointer.into();
        self
    }

    /// Directory this exporter writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write both artifacts for a completed result and return their paths.
    pub async fn export(
        &self,
        result: &Value,
        document_id: Option<&str>,
        operation_handle: Option<&str>,
    ) -> Result<ExportPaths> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!("failed to create output directory {}", self.output_dir.display())
            })?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let base = artifact_base_name(document_id, operation_handle, &timestamp);

        let structured = self.output_dir.join(format!("{base}_results.json"));
        let rendered = self.output_dir.join(format!("{base}_formatted.md"));

        let pretty =
            serde_json::to_string_pretty(result).context("failed to serialize result tree")?;
        fs::write(&structured, pretty)
            .await
            .with_context(|| format!("failed to write {}", structured.display()))?;

        let view = self.render_view(result, document_id, operation_handle, &timestamp);
        fs::write(&rendered, view)
            .await
            .with_context(|| format!("failed to write {}", rendered.display()))?;

        debug!(
            structured = %structured.display(),
            rendered = %rendered.display(),
            "result artifacts written"
        );

        Ok(ExportPaths {
            structured,
            rendered,
        })
    }

    /// Extract a `(name, rendered value)` digest of the named fields, for
    /// logging and console output. Empty when the collection is absent.
    pub fn field_digest(&self, result: &Value) -> Vec<(String, String)> {
        let Some(fields_node) = result.pointer(&self.fields_pointer) else {
            return Vec::new();
        };
        let Some(fields) = TaggedValue::classify_fields(fields_node) else {
            return Vec::new();
        };

        fields
            .into_iter()
            .map(|(name, value)| {
                let rendered = render(&value);
                (name, rendered)
            })
            .collect()
    }

    /// Build the rendered markdown view of a result.
    ///
    /// Total: a missing fields collection produces an explicit note, and a
    /// fields node of the wrong shape keeps the partial output and appends
    /// a visible error note. The caller always gets something writable.
    fn render_view(
        &self,
        result: &Value,
        document_id: Option<&str>,
        operation_handle: Option<&str>,
        timestamp: &str,
    ) -> String {
        let mut out = String::new();

        out.push_str("# Analysis Results\n\n");
        if let Some(doc) = document_id {
            out.push_str(&format!("- Document: {doc}\n"));
        }
        if let Some(handle) = operation_handle {
            out.push_str(&format!("- Operation: {handle}\n"));
        }
        out.push_str(&format!("- Exported: {timestamp}\n\n"));

        match result.pointer(&self.fields_pointer) {
            None => {
                out.push_str("No fields were extracted from this document.\n");
            }
            Some(fields_node) => match TaggedValue::classify_fields(fields_node) {
                None => {
                    out.push_str(
                        "Error: the fields collection could not be interpreted; \
                         see the structured artifact for the raw payload.\n",
                    );
                }
                Some(fields) if fields.is_empty() => {
                    out.push_str("No fields were extracted from this document.\n");
                }
                Some(fields) => {
                    out.push_str("## Extracted Fields\n\n");
                    for (name, value) in &fields {
                        render_field_section(&mut out, name, value);
                    }
                }
            },
        }

        out
    }
}

/// Render one named field into the view: tables for arrays of objects,
/// lists for primitive arrays, a single line for everything else.
fn render_field_section(out: &mut String, name: &str, value: &TaggedValue) {
    match value {
        TaggedValue::Array(items) if !items.is_empty() => {
            if let Some(TaggedValue::Object(first_members)) = items.first() {
                out.push_str(&format!("### {name}\n\n"));
                render_table(out, first_members, items);
                out.push('\n');
            } else {
                out.push_str(&format!("### {name}\n\n"));
                for item in items {
                    out.push_str(&format!("- {}\n", render_array_item(item)));
                }
                out.push('\n');
            }
        }
        _ => {
            out.push_str(&format!("- {name}: {}\n", render(value)));
        }
    }
}

/// Columnar layout for an array of objects. The column set is the key set
/// of the first object element; rows missing a column get an empty cell;
/// non-object rows render in the first column.
fn render_table(out: &mut String, first_members: &[(String, TaggedValue)], items: &[TaggedValue]) {
    let columns: Vec<&str> = first_members.iter().map(|(name, _)| name.as_str()).collect();

    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(&format!("|{}\n", " --- |".repeat(columns.len())));

    for item in items {
        match item {
            TaggedValue::Object(members) => {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|col| {
                        members
                            .iter()
                            .find(|(name, _)| name == col)
                            .map(|(_, value)| render_object_value(value))
                            .unwrap_or_default()
                    })
                    .collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
            other => {
                let mut cells = vec![render_array_item(other)];
                cells.resize(columns.len(), String::new());
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
        }
    }
}

/// Derive the shared base name for one result's artifact pair.
pub fn artifact_base_name(
    document_id: Option<&str>,
    operation_handle: Option<&str>,
    timestamp: &str,
) -> String {
    let document_token = document_id
        .map(|id| sanitize_token(strip_extension(id)))
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| "operation".to_string());

    match operation_handle.map(operation_token).filter(|t| !t.is_empty()) {
        Some(op) => format!("{document_token}_{op}_{timestamp}"),
        None => format!("{document_token}_{timestamp}"),
    }
}

/// Replace filesystem-hostile characters with `-`.
pub fn sanitize_token(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn strip_extension(identifier: &str) -> &str {
    match identifier.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => identifier,
    }
}

/// Shorten an operation handle into a filename token: drop any query
/// string, truncate at the first `_`, then sanitize.
fn operation_token(handle: &str) -> String {
    let without_query = handle.split('?').next().unwrap_or(handle);
    let truncated = without_query.split('_').next().unwrap_or(without_query);
    sanitize_token(truncated)
}
