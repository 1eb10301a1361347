//! Upload operation: publish the variant set for a freshly uploaded image.

use super::{ImageWorker, Outcome, WorkerError};
use crate::plan::EntityKind;
use crate::publish::{publish_variants, url_map};
use crate::store::ImageStatus;
use std::collections::BTreeMap;
use tracing::{error, info};

impl ImageWorker<'_> {
    /// Process the staged upload `upload_id` into the variant set for image
    /// record `image_id`. On success the consumed upload record is deleted;
    /// on any failure the image record is marked `failed`.
    pub fn process_upload(&self, image_id: i64, upload_id: i64) -> Outcome {
        info!(image_id, upload_id, "processing image upload");

        match self.run_upload(image_id, upload_id) {
            Ok(urls) => {
                info!(image_id, variants = urls.len(), "image processed");
                Outcome::ok(image_id, urls)
            }
            Err(e) => {
                error!(image_id, error = %e, "image upload failed");
                if let Err(revert) = self.entities.set_image_status(image_id, ImageStatus::Failed)
                {
                    error!(image_id, error = %revert, "failed to mark image as failed");
                }
                Outcome::failed(image_id, e)
            }
        }
    }

    fn run_upload(
        &self,
        image_id: i64,
        upload_id: i64,
    ) -> Result<BTreeMap<String, String>, WorkerError> {
        self.entities
            .set_image_status(image_id, ImageStatus::Processing)?;

        let path = self.uploads.path_for(upload_id)?;
        let source =
            std::fs::read(&path).map_err(|source| WorkerError::UploadRead { path, source })?;

        let prefix = format!("images/{image_id}");
        let results = publish_variants(
            &source,
            EntityKind::ImageUpload.plan(),
            &prefix,
            self.objects,
        )?;
        let urls = url_map(&results);

        self.entities.set_image_urls(image_id, &urls)?;
        self.entities
            .set_image_status(image_id, ImageStatus::Processed)?;
        self.uploads.delete(upload_id)?;

        Ok(urls)
    }
}
