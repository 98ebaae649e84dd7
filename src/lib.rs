use std::time::Duration;
use thiserror::Error;

pub mod cli;
pub mod client;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod search;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use config::ScraperConfig;
pub use extract::{ArticleExtractor, ItemError};
pub use fetch::Fetcher;
pub use search::NewsSearch;
pub use types::{ArticleRecord, FetchResponse};

/// The `ScraperError` enum represents the errors that can surface from fetching, configuring or saving.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Represents a transport error raised by the HTTP client.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Represents a response whose status code was not 200.
    #[error("Unexpected status code: {0}")]
    StatusError(u16),
    /// Represents a fetch that failed on every attempt.
    #[error("All {attempts} attempts failed, last error: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ScraperError>,
    },
    /// Represents a CSS selector that could not be parsed.
    #[error("Invalid selector: {0}")]
    SelectorError(String),
    /// Represents a base URL that could not be parsed.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
    /// Represents configuration values that violate their constraints.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Represents a failure while loading layered configuration.
    #[error("Configuration loading failed: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents a failure while writing the output file.
    #[error("I/O failed: {0}")]
    IoError(#[from] std::io::Error),
    /// Represents a failure while serializing the output.
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A type alias for `Result` with the `ScraperError` error type.
pub type Result<T> = std::result::Result<T, ScraperError>;

// Constants

/// The site every search is issued against.
pub const DEFAULT_BASE_URL: &str = "https://www.almasryalyoum.com";
/// The default timeout duration for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The default maximum number of fetch attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// The default bounds, in seconds, of the randomized delay between attempts.
pub const DEFAULT_DELAY_RANGE: (u64, u64) = (5, 15);
/// The default location of the JSON output.
pub const DEFAULT_OUTPUT_PATH: &str = "response/results.json";
