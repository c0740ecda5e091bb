//! Reel-Bulk: a bounded-concurrency movie page scraper
//!
//! This crate discovers a fixed list of detail-page URLs from an index page,
//! fetches and extracts each one on a fixed pool of workers, and writes the
//! aggregated records as a newline-delimited bulk-index document.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Reel-Bulk operations
///
/// Only fatal conditions live here. Per-URL fetch and extraction failures are
/// recorded in the run's failure ledger instead of being propagated.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] crawler::FetchFailure),

    #[error("Index page extraction failed: {0}")]
    IndexExtraction(#[from] extract::ExtractionFailure),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid worker state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::WorkerState,
        to: state::WorkerState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
}

/// Result type alias for Reel-Bulk operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{partition, AggregateResult, Orchestrator, PartialResult, RunOutcome};
pub use extract::{Extractor, MovieExtractor};
pub use output::BulkWriter;
pub use record::Record;
pub use state::WorkerState;
