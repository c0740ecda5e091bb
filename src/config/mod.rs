//! Configuration module for Reel-Bulk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use reel_bulk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reel-bulk.toml")).unwrap();
//! println!("Scraping with {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, HttpConfig, OutputConfig, DEFAULT_INDEX_URL, DEFAULT_OUTPUT_PATH,
    DEFAULT_WORKERS,
};

pub use parser::{hash_config, load_config, parse_config, read_config};
pub use validation::{validate, validate_workers, MAX_WORKERS};
