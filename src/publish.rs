//! The derivative-generation and publish loop.
//!
//! For each [`VariantSpec`](crate::plan::VariantSpec) in plan order: decode
//! fresh from the source bytes, resize if bounded, flatten alpha, encode to
//! the delivery format, and hand the result to the object store. Each variant
//! decodes from the *original* bytes — never from a previously resized
//! raster — so quality loss never compounds across variants.
//!
//! Variants have no data dependency on each other, so they run on a small
//! dedicated worker pool. Collecting into `Result` keeps the output in plan
//! order regardless of completion order and fails the whole call on the
//! first variant error; no partial result ever reaches the caller.

use crate::imaging::codec::{self, CodecError};
use crate::imaging::transform;
use crate::plan::{VariantSpec, storage_key};
use crate::store::{ObjectStore, StoreError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";

/// Upper bound on concurrent variant derivations per process.
const VARIANT_WORKERS: usize = 4;

static VARIANT_POOL: LazyLock<rayon::ThreadPool> = LazyLock::new(|| {
    rayon::ThreadPoolBuilder::new()
        .num_threads(VARIANT_WORKERS)
        .thread_name(|i| format!("variant-{i}"))
        .build()
        .expect("failed to build variant worker pool")
});

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("variant {variant}: {source}")]
    Codec {
        variant: String,
        #[source]
        source: CodecError,
    },
    #[error("variant {variant}: upload of {key} failed: {source}")]
    Store {
        variant: String,
        key: String,
        #[source]
        source: StoreError,
    },
}

/// One published size variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantResult {
    pub name: String,
    pub storage_key: String,
    pub public_url: String,
}

/// Derive and publish every variant in `plan` from `source` bytes.
///
/// Results come back 1:1 with the plan, in plan order. Any single variant's
/// failure fails the whole call.
pub fn publish_variants(
    source: &[u8],
    plan: &[VariantSpec],
    key_prefix: &str,
    objects: &dyn ObjectStore,
) -> Result<Vec<VariantResult>, PublishError> {
    VARIANT_POOL.install(|| {
        plan.par_iter()
            .map(|spec| publish_one(source, spec, key_prefix, objects))
            .collect()
    })
}

fn publish_one(
    source: &[u8],
    spec: &VariantSpec,
    key_prefix: &str,
    objects: &dyn ObjectStore,
) -> Result<VariantResult, PublishError> {
    let codec_err = |source: CodecError| PublishError::Codec {
        variant: spec.name.to_string(),
        source,
    };

    let img = codec::decode(source).map_err(codec_err)?;
    let img = match spec.max_dimensions {
        Some((max_w, max_h)) => transform::resize_to_fit(img, max_w, max_h),
        None => img,
    };
    let encoded = codec::encode_delivery(&codec::flatten_alpha(&img), false).map_err(codec_err)?;

    let key = storage_key(key_prefix, spec.name);
    debug!(variant = spec.name, key = %key, bytes = encoded.len(), "publishing variant");
    let public_url = objects
        .put(&encoded, &key, CONTENT_TYPE_JPEG)
        .map_err(|source| PublishError::Store {
            variant: spec.name.to_string(),
            key: key.clone(),
            source,
        })?;

    Ok(VariantResult {
        name: spec.name.to_string(),
        storage_key: key,
        public_url,
    })
}

/// Variant name → public URL mapping for persistence.
pub fn url_map(results: &[VariantResult]) -> BTreeMap<String, String> {
    results
        .iter()
        .map(|r| (r.name.clone(), r.public_url.clone()))
        .collect()
}
