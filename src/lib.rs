//! docsift - batch client for asynchronous document-analysis services
//!
//! A Rust client for analysis services that execute document processing
//! asynchronously behind an operation handle.
//!
//! # Architecture
//!
//! The flow for one document is submit -> poll -> export:
//! - Submission returns an opaque operation handle
//! - The poller drives the handle to a terminal state under a hard deadline
//! - The exporter writes a verbatim structured artifact and a rendered view
//!   of the extracted fields
//! - The batch orchestrator runs that flow over a list of inputs, isolating
//!   per-item failures and writing one aggregate summary
//!
//! # Modules
//!
//! - `adapters`: the analysis-service backend trait and HTTP implementation
//! - `core`: poller, field extraction, export, batch orchestration
//! - `domain`: data structures (Operation, TaggedValue, BatchRow)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single document
//! docsift analyze invoice.pdf --profile products
//!
//! # Run a whole directory
//! docsift batch ./invoices --profile products
//!
//! # Check an operation later
//! docsift status <handle>
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{AnalysisBackend, HttpAnalysisBackend};
pub use crate::core::{
    BatchOrchestrator, BatchOutcome, ExportPaths, OperationPoller, PollError, PollSettings,
    ResultExporter,
};
pub use crate::domain::{
    BatchRow, BatchSummary, ItemStatus, Operation, OperationStatus, TaggedValue,
};
