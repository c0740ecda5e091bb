use serde::Deserialize;

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_INDEX_URL: &str = "https://www.imdb.com/chart/top/";
pub const DEFAULT_OUTPUT_PATH: &str = "./movies.json";

/// Main configuration structure for Reel-Bulk
///
/// Every key has a default, so an empty file (or no file at all) yields a
/// runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of chunks the URL list is split into, one worker per chunk
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Index page listing the detail pages to scrape
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Optional wall-clock budget for the whole run, in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for 5xx responses and timeouts
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Destination of the bulk document
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Extra attempts if writing the bulk document fails
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            index_url: default_index_url(),
            deadline_secs: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            write_retries: default_write_retries(),
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

fn default_user_agent() -> String {
    format!("reel-bulk/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_write_retries() -> u32 {
    1
}
