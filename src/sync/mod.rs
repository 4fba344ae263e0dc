// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription and episode action synchronization.

mod model;
mod nextcloud;

use async_trait::async_trait;

use crate::error::SyncServiceError;

pub use model::{
    EpisodeAction, EpisodeActionChanges, EpisodeActionKind, SubscriptionChanges,
    UploadChangesResponse,
};
pub use nextcloud::{NextcloudAccount, NextcloudSyncService, UPLOAD_BULK_SIZE};

/// A backend storing subscriptions and episode actions across devices
///
/// Every failure surfaces as [`SyncServiceError`].
#[async_trait]
pub trait SyncService: Send + Sync {
    async fn login(&mut self) -> Result<(), SyncServiceError>;

    /// Subscription changes since `since` (seconds since the epoch)
    async fn get_subscription_changes(
        &self,
        since: i64,
    ) -> Result<SubscriptionChanges, SyncServiceError>;

    async fn upload_subscription_changes(
        &self,
        added: &[String],
        removed: &[String],
    ) -> Result<UploadChangesResponse, SyncServiceError>;

    /// Episode actions since `since` (seconds since the epoch)
    async fn get_episode_action_changes(
        &self,
        since: i64,
    ) -> Result<EpisodeActionChanges, SyncServiceError>;

    async fn upload_episode_actions(
        &self,
        actions: &[EpisodeAction],
    ) -> Result<UploadChangesResponse, SyncServiceError>;

    async fn logout(&mut self);
}
