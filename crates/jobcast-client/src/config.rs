use std::time::Duration;

use jobcast_core::error::AppError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.org";
pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.example.org";
pub const DEFAULT_RUNNER_ID: &str = "jobcast";

/// Configuration for the publish pipeline.
///
/// Everything the pipeline needs is injected here, notably the API
/// key, which is never read from the environment at call time.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Catalog API base, without trailing slash.
    pub api_base_url: String,
    /// Stats reporting base, without trailing slash.
    pub stats_base_url: String,
    pub api_key: String,
    /// Identifies this scraper runner in the stats dataset path.
    pub runner_id: String,
    /// Catalog API versions to publish to, in order.
    pub versions: Vec<u8>,
    /// Pause between the clear and update calls, letting the clear
    /// propagate through the catalog before the replacement set lands.
    pub propagation_delay: Duration,
}

impl PublishConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            api_key: api_key.into(),
            runner_id: DEFAULT_RUNNER_ID.to_string(),
            versions: vec![1, 4],
            propagation_delay: Duration::from_millis(500),
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `JOBCAST_API_KEY` (required)
    /// - `JOBCAST_API_BASE_URL`, `JOBCAST_STATS_BASE_URL`,
    ///   `JOBCAST_RUNNER_ID` (optional, with defaults)
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var("JOBCAST_API_KEY").map_err(|_| {
            AppError::ConfigError("JOBCAST_API_KEY not set. Required for publishing.".into())
        })?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError("JOBCAST_API_KEY is empty".into()));
        }

        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("JOBCAST_API_BASE_URL") {
            config.api_base_url = trimmed(&base);
        }
        if let Ok(base) = std::env::var("JOBCAST_STATS_BASE_URL") {
            config.stats_base_url = trimmed(&base);
        }
        if let Ok(runner) = std::env::var("JOBCAST_RUNNER_ID") {
            config.runner_id = runner;
        }
        Ok(config)
    }
}

fn trimmed(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
