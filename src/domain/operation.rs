//! Remote operation snapshots and status classification.
//!
//! An `Operation` is an immutable snapshot of one asynchronously-executing
//! unit of work on the analysis service. Polling never mutates a snapshot;
//! it fetches a fresh one each time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Accepted but not yet started.
    Pending,

    /// Currently executing. Unrecognized status strings also land here so
    /// the service's vocabulary can grow without breaking older clients.
    Running,

    /// Finished with a result payload.
    Succeeded,

    /// Finished with an error.
    Failed,
}

impl OperationStatus {
    /// Classify a raw status string. Comparison is case-insensitive and
    /// exactly two tokens are terminal.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "notstarted" | "pending" | "queued" => Self::Pending,
            _ => Self::Running,
        }
    }

    /// Whether polling stops at this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// A snapshot of one remote operation.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Opaque handle (usually the status URL) identifying the operation.
    pub handle: String,

    /// Status reported by this snapshot.
    pub status: OperationStatus,

    /// Verbatim result tree; present only once the operation succeeded.
    pub result: Option<Value>,

    /// Failure code reported by the service, when failed.
    pub failure_code: Option<String>,

    /// Failure message reported by the service, when failed.
    pub failure_message: Option<String>,
}

impl Operation {
    /// Decode a snapshot from the wire body returned by a status fetch.
    pub fn from_wire(handle: impl Into<String>, body: Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .map(OperationStatus::parse)
            .unwrap_or(OperationStatus::Running);

        let failure_code = body
            .pointer("/error/code")
            .and_then(Value::as_str)
            .map(String::from);
        let failure_message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(String::from);

        let result = if status == OperationStatus::Succeeded {
            Some(body)
        } else {
            None
        };

        Self {
            handle: handle.into(),
            status,
            result,
            failure_code,
            failure_message,
        }
    }
}
