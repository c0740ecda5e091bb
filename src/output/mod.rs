//! Output module for persisting and reporting run results
//!
//! This module handles:
//! - Writing the bulk-index document
//! - Summarising the run for the user

mod bulk;
pub mod stats;

pub use bulk::{action_line, write_bulk, BulkWriter};
pub use stats::{print_summary, RunSummary};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
