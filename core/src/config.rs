//! Connection settings shared by every request a client issues.

use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, Result};

pub const ENV_API_URL: &str = "PANEL_API_URL";
pub const ENV_API_KEY: &str = "PANEL_API_KEY";
pub const ENV_API_TIMEOUT_SECS: &str = "PANEL_API_TIMEOUT_SECS";

/// Base URL, API key and the fixed header set derived from the key.
///
/// Immutable once built. The header set is computed here once and cloned
/// into every request.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {api_key}")),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            timeout: None,
        }
    }

    /// Bound every request by `timeout`. Without it a call blocks until the
    /// transport gives up on its own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `PANEL_API_URL`, `PANEL_API_KEY` and the optional
    /// `PANEL_API_TIMEOUT_SECS` from the environment.
    ///
    /// # Errors
    /// Returns `ApiError::Config` when the URL or key is unset or empty, or
    /// when the timeout is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };
        let base_url = required(ENV_API_URL)?;
        let api_key = required(ENV_API_KEY)?;

        let mut config = Self::new(base_url.trim(), &api_key);
        if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{ENV_API_TIMEOUT_SECS} must be a number of seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
