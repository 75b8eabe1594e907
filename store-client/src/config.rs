//! Store connection configuration

use std::time::Duration;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Already-resolved connection parameters for one remote platform
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL (e.g., "https://shop.example.com")
    pub base_url: String,

    /// Access token sent with every request
    pub access_token: String,

    /// API version path segment (e.g., "V1" or "2023-04")
    pub api_version: String,

    /// Wall-clock budget for a single request
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with the default timeout
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            api_version: api_version.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API version segment
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}
