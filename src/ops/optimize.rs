//! Optimize operation: re-encode an existing image as progressive JPEG.
//!
//! A stateless single-variant special case — no variant plan, no resize, no
//! status transitions. The entity's published `original` is downloaded from
//! the CDN, re-encoded with a progressive scan script at the fixed delivery
//! quality, and published once under the `optimized` key.

use super::{ImageWorker, Outcome, WorkerError};
use crate::imaging::codec;
use crate::plan::storage_key;
use crate::publish::CONTENT_TYPE_JPEG;
use std::collections::BTreeMap;
use tracing::{error, info};

impl ImageWorker<'_> {
    pub fn optimize(&self, image_id: i64) -> Outcome {
        info!(image_id, "optimizing image");

        match self.run_optimize(image_id) {
            Ok(urls) => Outcome::ok(image_id, urls),
            Err(e) => {
                error!(image_id, error = %e, "image optimization failed");
                Outcome::failed(image_id, e)
            }
        }
    }

    fn run_optimize(&self, image_id: i64) -> Result<BTreeMap<String, String>, WorkerError> {
        let prefix = format!("images/{image_id}");
        let source_url = self.config.public_url(&storage_key(&prefix, "original"));

        let bytes = self.fetcher.get(&source_url, self.config.fetch_timeout)?;
        let img = codec::decode(&bytes)?;
        let optimized = codec::encode_delivery(&codec::flatten_alpha(&img), true)?;

        let key = storage_key(&prefix, "optimized");
        let url = self.objects.put(&optimized, &key, CONTENT_TYPE_JPEG)?;

        Ok(BTreeMap::from([("optimized".to_string(), url)]))
    }
}
