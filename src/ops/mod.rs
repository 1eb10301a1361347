//! Operation orchestrators: Upload, AvatarUpdate, Optimize.
//!
//! Each invocation walks a short state machine, terminal on first success or
//! first failure:
//!
//! ```text
//! mark-processing → resolve-source → publish-variants → persist-urls → mark-processed
//! ```
//!
//! with any step's failure short-circuiting to a revert of transient state
//! (`failed` status, `avatar_processing = false`) before returning. The
//! orchestrator is the single recovery boundary: no error ever escapes as
//! `Err` — every path returns an [`Outcome`] for the invoking job system,
//! and retries of a whole failed invocation belong to that system, not here.

mod avatar;
mod optimize;
mod upload;

use crate::config::PipelineConfig;
use crate::imaging::codec::CodecError;
use crate::publish::PublishError;
use crate::source::SourceError;
use crate::store::{
    EntityStore, FetchError, HttpFetch, Notifier, ObjectStore, StoreError, UploadStore,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a step of any operation can fail with.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to read upload file {path}: {source}")]
    UploadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The sole return contract to the invoking job system.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub entity_id: i64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    fn ok(entity_id: i64, urls: BTreeMap<String, String>) -> Self {
        Self {
            success: true,
            entity_id,
            urls,
            error: None,
        }
    }

    fn failed(entity_id: i64, error: impl Display) -> Self {
        Self {
            success: false,
            entity_id,
            urls: BTreeMap::new(),
            error: Some(error.to_string()),
        }
    }
}

/// One worker invocation's view of its collaborators.
///
/// Production wires real clients; tests wire the recording fakes from
/// [`crate::store::tests`].
pub struct ImageWorker<'a> {
    pub uploads: &'a dyn UploadStore,
    pub objects: &'a dyn ObjectStore,
    pub entities: &'a dyn EntityStore,
    pub notifier: &'a dyn Notifier,
    pub fetcher: &'a dyn HttpFetch,
    pub config: &'a PipelineConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_success_shape() {
        let mut urls = BTreeMap::new();
        urls.insert("thumb".to_string(), "https://cdn.test/t.jpg".to_string());
        let json = serde_json::to_value(Outcome::ok(42, urls)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["entity_id"], 42);
        assert_eq!(json["urls"]["thumb"], "https://cdn.test/t.jpg");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn outcome_serializes_failure_shape() {
        let json = serde_json::to_value(Outcome::failed(7, "no image source provided")).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "no image source provided");
        assert!(json.get("urls").is_none());
    }
}
