//! Environment-level configuration.
//!
//! The pipeline recognizes exactly two external options, both optional:
//!
//! | Env var | Meaning | Default |
//! |---|---|---|
//! | `S3_BUCKET` | object storage bucket/container | `simbi-uploads` |
//! | `CDN_URL` | public CDN base for published objects | `https://cdn.simbi.com` |
//!
//! Network fetches carry a fixed 30-second timeout; timeouts surface as
//! retryable errors to the invoking job system, never as a crash.

use std::env;
use std::time::Duration;

pub const DEFAULT_BUCKET: &str = "simbi-uploads";
pub const DEFAULT_CDN_BASE: &str = "https://cdn.simbi.com";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bucket the host's object store implementation publishes into.
    pub bucket: String,
    /// Public base URL under which published keys are reachable.
    pub cdn_base_url: String,
    /// Timeout for source downloads.
    pub fetch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            cdn_base_url: DEFAULT_CDN_BASE.to_string(),
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            cdn_base_url: env::var("CDN_URL").unwrap_or_else(|_| DEFAULT_CDN_BASE.to_string()),
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    /// Public URL for a storage key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn_base_url.trim_end_matches('/'), key)
    }
}
