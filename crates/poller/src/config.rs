// Configuration for the campaign client and pollers
//
// Every value has a default; `from_env` overrides them from LEADGEN_*
// environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::{duration_millis, AdaptiveCadence, AnyRunning};
use crate::retry::{ErrorPolicy, RetryPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the campaign service
    pub api_url: String,

    /// Per-request timeout; an expired request is a failed fetch
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Everything needed to start campaign pollers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WatchConfig {
    pub client: ClientConfig,

    /// Per-campaign cadence
    pub cadence: AdaptiveCadence,

    /// Collection cadence
    pub list: AnyRunning,

    /// Reaction to failed fetches
    pub error_policy: ErrorPolicy,
}

impl WatchConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    pub fn with_cadence(mut self, cadence: AdaptiveCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_list_policy(mut self, list: AnyRunning) -> Self {
        self.list = list;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Read configuration from environment variables:
    ///
    /// - `LEADGEN_API_URL`: service base URL (default `http://localhost:5001`)
    /// - `LEADGEN_HTTP_TIMEOUT_SECS`: request timeout (default 30)
    /// - `LEADGEN_ON_ERROR`: `pause`, `stop` or `retry` (default `pause`)
    /// - `LEADGEN_RETRY_MAX_ATTEMPTS`: attempts for `retry` (default 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LEADGEN_API_URL").filter(|v| !v.trim().is_empty()) {
            config.client.api_url = url;
        }

        if let Some(raw) = lookup("LEADGEN_HTTP_TIMEOUT_SECS") {
            let secs = parse_number::<u64>("LEADGEN_HTTP_TIMEOUT_SECS", &raw)?;
            config.client.request_timeout = Duration::from_secs(secs);
        }

        let mut retry = RetryPolicy::exponential();
        if let Some(raw) = lookup("LEADGEN_RETRY_MAX_ATTEMPTS") {
            let attempts = parse_number::<u32>("LEADGEN_RETRY_MAX_ATTEMPTS", &raw)?;
            retry = retry.with_max_attempts(attempts);
        }

        if let Some(raw) = lookup("LEADGEN_ON_ERROR") {
            config.error_policy = parse_error_policy(&raw, retry).ok_or(
                ConfigError::InvalidEnv {
                    name: "LEADGEN_ON_ERROR",
                    value: raw,
                },
            )?;
        }

        Ok(config)
    }
}

/// `pause`, `stop` or `retry` (case-insensitive)
pub fn parse_error_policy(raw: &str, retry: RetryPolicy) -> Option<ErrorPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pause" => Some(ErrorPolicy::Pause),
        "stop" => Some(ErrorPolicy::Stop),
        "retry" => Some(ErrorPolicy::Retry(retry)),
        _ => None,
    }
}

fn parse_number<N: std::str::FromStr>(name: &'static str, raw: &str) -> Result<N, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: raw.to_string(),
    })
}
