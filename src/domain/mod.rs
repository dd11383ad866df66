//! Domain types for the docsift client.
//!
//! This module contains the core data structures:
//! - Operation: snapshot of one remote unit of work
//! - TaggedValue: classified field values from a result tree
//! - BatchRow / BatchSummary: per-input outcomes and the aggregate record

pub mod batch;
pub mod field;
pub mod operation;

// Re-export commonly used types
pub use batch::{BatchRow, BatchSummary, ItemStatus};
pub use field::TaggedValue;
pub use operation::{Operation, OperationStatus};
