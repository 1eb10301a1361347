//! AvatarUpdate operation: replace a user's avatar from an upload, an inline
//! payload, or a crop of the current avatar.

use super::{ImageWorker, Outcome, WorkerError};
use crate::plan::EntityKind;
use crate::publish::{publish_variants, url_map};
use crate::source::{AvatarParams, resolve_avatar_source};
use std::collections::BTreeMap;
use tracing::{error, info};

impl ImageWorker<'_> {
    /// Update `user_id`'s avatar per `params`, notifying `updater_id` with
    /// the `medium` variant URL on success.
    ///
    /// The `avatar_processing` flag is raised at the start and lowered on
    /// every exit path, failure included — no invocation leaves it stuck.
    pub fn update_avatar(&self, user_id: i64, params: &AvatarParams, updater_id: i64) -> Outcome {
        info!(user_id, updater_id, "updating avatar");

        match self.run_avatar(user_id, params, updater_id) {
            Ok(urls) => {
                info!(user_id, "avatar updated");
                Outcome::ok(user_id, urls)
            }
            Err(e) => {
                error!(user_id, error = %e, "avatar update failed");
                if let Err(revert) = self.entities.set_avatar_processing(user_id, false) {
                    error!(user_id, error = %revert, "failed to clear avatar processing flag");
                }
                Outcome::failed(user_id, e)
            }
        }
    }

    fn run_avatar(
        &self,
        user_id: i64,
        params: &AvatarParams,
        updater_id: i64,
    ) -> Result<BTreeMap<String, String>, WorkerError> {
        self.entities.set_avatar_processing(user_id, true)?;

        let current = self.entities.current_avatar_url(user_id)?;
        let source = resolve_avatar_source(
            params,
            current.as_deref(),
            self.uploads,
            self.fetcher,
            self.config.fetch_timeout,
        )?;

        let prefix = format!("avatars/{user_id}");
        let results =
            publish_variants(&source, EntityKind::Avatar.plan(), &prefix, self.objects)?;
        let urls = url_map(&results);

        self.entities.set_user_avatar_urls(user_id, &urls)?;
        self.entities.set_avatar_processing(user_id, false)?;

        if let Some(medium) = urls.get("medium") {
            self.notifier.avatar_updated(updater_id, medium)?;
        }

        Ok(urls)
    }
}
