//! Core client logic.
//!
//! This module contains:
//! - Poller: bounded-time wait for remote operations
//! - Extract: display rendering of tagged field values
//! - Export: durable result artifacts
//! - Orchestrator: sequential batch execution

pub mod export;
pub mod extract;
pub mod orchestrator;
pub mod poller;

// Re-export commonly used types
pub use export::{ExportPaths, ResultExporter, DEFAULT_FIELDS_POINTER};
pub use orchestrator::{BatchOrchestrator, BatchOutcome};
pub use poller::{OperationPoller, PollError, PollSettings};
