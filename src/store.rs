//! Collaborator capabilities the pipeline calls through.
//!
//! The job dispatcher, database, object storage, and notification channel
//! all live outside this crate; each is modeled as a small trait so
//! production wires in real clients and tests wire in the recording fakes
//! from [`tests`]. Every trait is `Sync` — variants publish from a worker
//! pool and share the collaborator references across threads.
//!
//! The one production implementation shipped here is [`UreqFetcher`], the
//! blocking HTTP client used to download existing remote images.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Processing state of an image record, owned by the external database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Processing,
    Processed,
    Failed,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Processing => "processing",
            ImageStatus::Processed => "processed",
            ImageStatus::Failed => "failed",
        }
    }
}

/// Durable object storage with public-read visibility.
pub trait ObjectStore: Sync {
    /// Store `bytes` under `key`, returning the public URL.
    fn put(&self, bytes: &[u8], key: &str, content_type: &str) -> Result<String, StoreError>;
}

/// Access to pending upload records and their staged files.
pub trait UploadStore: Sync {
    /// Filesystem path of the staged upload, or [`StoreError::NotFound`].
    fn path_for(&self, upload_id: i64) -> Result<PathBuf, StoreError>;

    /// Remove the consumed upload record.
    fn delete(&self, upload_id: i64) -> Result<(), StoreError>;
}

/// Status and URL persistence for image and user records.
pub trait EntityStore: Sync {
    fn set_image_status(&self, image_id: i64, status: ImageStatus) -> Result<(), StoreError>;
    fn set_image_urls(&self, image_id: i64, urls: &BTreeMap<String, String>)
    -> Result<(), StoreError>;
    fn current_avatar_url(&self, user_id: i64) -> Result<Option<String>, StoreError>;
    fn set_user_avatar_urls(
        &self,
        user_id: i64,
        urls: &BTreeMap<String, String>,
    ) -> Result<(), StoreError>;
    fn set_avatar_processing(&self, user_id: i64, processing: bool) -> Result<(), StoreError>;
}

/// Real-time notification channel.
pub trait Notifier: Sync {
    fn avatar_updated(&self, recipient_id: i64, avatar_url: &str) -> Result<(), StoreError>;
}

/// Bounded-time HTTP download of a source image.
pub trait HttpFetch: Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// Blocking `ureq` client. Non-2xx statuses and timeouts are errors; a
/// timeout is surfaced as [`FetchError::Timeout`] so the invoking job system
/// can treat it as retryable.
pub struct UreqFetcher;

impl HttpFetch for UreqFetcher {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let response = agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            // ureq reports io timeouts as transport errors
            ureq::Error::Transport(t) if t.to_string().contains("timed out") => {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: timeout.as_secs(),
                }
            }
            ureq::Error::Transport(t) => FetchError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock
                {
                    FetchError::Timeout {
                        url: url.to_string(),
                        seconds: timeout.as_secs(),
                    }
                } else {
                    FetchError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;
        Ok(bytes)
    }
}
