// Error types for status polling

use thiserror::Error;

/// Result type alias for a single fetch
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A fetch cycle that did not produce a snapshot
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection refused, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request exceeded the transport timeout
    #[error("request timed out")]
    Timeout,

    /// Non-success response from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The entity does not exist
    #[error("Not found")]
    NotFound,

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        FetchError::Decode(msg.into())
    }

    /// Short machine-readable kind, used for retry filtering and logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Http(_) => "http",
            FetchError::Timeout => "timeout",
            FetchError::Api { .. } => "api",
            FetchError::NotFound => "not_found",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err)
        }
    }
}

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds an unparseable value
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    /// Base URL could not be parsed
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
