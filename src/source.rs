//! Source resolution for avatar updates.
//!
//! An avatar job names its source in one of three mutually exclusive shapes,
//! tried in precedence order with the first match winning: a prior upload
//! record, an inline `data:` URI, or a crop of the user's current avatar.
//! A job carrying none of the three resolves to [`SourceError::NoSource`].

use crate::imaging::codec::{self, CodecError};
use crate::imaging::transform::{self, CropRect, GeometryError};
use crate::store::{FetchError, HttpFetch, StoreError, UploadStore};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Avatar job payload as delivered by the queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarParams {
    #[serde(default)]
    pub upload_id: Option<i64>,
    #[serde(default)]
    pub data_uri: Option<String>,
    #[serde(default)]
    pub cropping: bool,
    #[serde(default)]
    pub crop: Option<CropRect>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("upload {0} not found")]
    UploadNotFound(i64),
    #[error("failed to read upload file {path}: {source}")]
    UploadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid inline image payload: {0}")]
    InvalidPayload(String),
    #[error("no current avatar image to crop")]
    NoCurrentImage,
    #[error("no image source provided")]
    NoSource,
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Produce the raw source bytes for an avatar update.
///
/// `current_avatar` is the user's existing avatar URL, consulted only by the
/// cropping shape. Crop rectangles default to a 500×500 window at the origin
/// when the job omits them; the cropped raster is re-encoded to the delivery
/// format and becomes the new source bytes.
pub fn resolve_avatar_source(
    params: &AvatarParams,
    current_avatar: Option<&str>,
    uploads: &dyn UploadStore,
    fetcher: &dyn HttpFetch,
    timeout: Duration,
) -> Result<Vec<u8>, SourceError> {
    if let Some(upload_id) = params.upload_id {
        debug!(upload_id, "resolving avatar source from upload record");
        let path = uploads.path_for(upload_id).map_err(|e| match e {
            StoreError::NotFound(_) => SourceError::UploadNotFound(upload_id),
            other => SourceError::Store(other),
        })?;
        return std::fs::read(&path).map_err(|source| SourceError::UploadRead { path, source });
    }

    if let Some(data_uri) = &params.data_uri {
        debug!("resolving avatar source from inline payload");
        return decode_data_uri(data_uri);
    }

    if params.cropping {
        let url = current_avatar.ok_or(SourceError::NoCurrentImage)?;
        let rect = params.crop.unwrap_or_default();
        debug!(url, ?rect, "resolving avatar source by cropping current avatar");

        let bytes = fetcher.get(url, timeout)?;
        let img = codec::decode(&bytes)?;
        let cropped = transform::crop(&img, rect)?;
        let reencoded = codec::encode_delivery(&codec::flatten_alpha(&cropped), false)?;
        return Ok(reencoded);
    }

    Err(SourceError::NoSource)
}

fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, SourceError> {
    let (_, payload) = data_uri
        .split_once("base64,")
        .ok_or_else(|| SourceError::InvalidPayload("missing base64 marker".to_string()))?;
    BASE64
        .decode(payload)
        .map_err(|e| SourceError::InvalidPayload(e.to_string()))
}
