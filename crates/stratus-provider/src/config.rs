//! Configuration for stratus-provider.

use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StratusConfig {
    /// Remote endpoint configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// File upload behaviour.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Deployment waiter behaviour.
    #[serde(default)]
    pub waiter: WaiterConfig,
}

impl StratusConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `stratus.toml` in the current directory (if present)
    /// 3. Environment variables with `STRATUS_` prefix
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("stratus.toml")
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        Self::extract(
            Figment::new()
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed("STRATUS_").split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError(e.to_string()))
    }
}

/// Remote service endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the object store, addressed path-style (`{endpoint}/{bucket}/{key}`).
    #[serde(default = "default_s3_endpoint")]
    pub s3_endpoint: String,

    /// Base URL of the CDN control plane API.
    #[serde(default = "default_cloudfront_endpoint")]
    pub cloudfront_endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_s3_endpoint() -> String {
    "https://s3.us-east-1.amazonaws.com".to_owned()
}

fn default_cloudfront_endpoint() -> String {
    "https://cloudfront.amazonaws.com/2020-05-31".to_owned()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            s3_endpoint: default_s3_endpoint(),
            cloudfront_endpoint: default_cloudfront_endpoint(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of uploads in flight at once.
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent: usize,
}

const fn default_max_concurrent_uploads() -> usize {
    16
}

impl UploadConfig {
    /// Concurrency limit, never below one.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent_uploads(),
        }
    }
}

/// Deployment waiter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WaiterConfig {
    /// Delay between status checks in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up waiting after this many seconds.
    #[serde(default = "default_wait_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    5
}

const fn default_wait_timeout_secs() -> u64 {
    300 // 5 minutes
}

impl WaiterConfig {
    /// Delay between status checks.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Polling ceiling measured from the start of the wait.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_wait_timeout_secs(),
        }
    }
}
