// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde_json::json;
use url::Url;

use crate::error::{SyncFailure, SyncServiceError};
use crate::http::{HttpClient, HttpRequest};
use crate::progress::{NoopReporter, ProgressEvent, SharedProgressReporter};

use super::SyncService;
use super::model::{EpisodeAction, EpisodeActionChanges, SubscriptionChanges, UploadChangesResponse};

/// Maximum number of episode actions sent per request
pub const UPLOAD_BULK_SIZE: usize = 30;

const GPODDERSYNC_API_BASE: &str = "/index.php/apps/gpoddersync";

/// Credentials of a Nextcloud account with the gpoddersync app
#[derive(Debug, Clone)]
pub struct NextcloudAccount {
    pub server_url: String,
    pub username: String,
    /// App password created for this client
    pub app_password: String,
}

#[derive(Debug, Clone)]
struct Session {
    server: Url,
    username: String,
    password: String,
}

/// Sync backend talking to the Nextcloud gpoddersync app
pub struct NextcloudSyncService<C: HttpClient> {
    client: C,
    account: Option<NextcloudAccount>,
    session: Option<Session>,
    reporter: SharedProgressReporter,
}

impl<C: HttpClient> NextcloudSyncService<C> {
    pub fn new(client: C, account: Option<NextcloudAccount>) -> Self {
        Self {
            client,
            account,
            session: None,
            reporter: NoopReporter::shared(),
        }
    }

    pub fn with_reporter(mut self, reporter: SharedProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session, SyncFailure> {
        self.session.as_ref().ok_or(SyncFailure::NotLoggedIn)
    }

    /// Absolute URL of a gpoddersync endpoint below the server's base path
    fn endpoint(&self, path: &str) -> Result<Url, SyncFailure> {
        let mut url = self.session()?.server.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{GPODDERSYNC_API_BASE}/{path}"));
        url.set_query(None);
        Ok(url)
    }

    fn endpoint_since(&self, path: &str, since: i64) -> Result<Url, SyncFailure> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("since", &since.to_string());
        Ok(url)
    }

    async fn perform(&self, request: HttpRequest) -> Result<Bytes, SyncFailure> {
        let session = self.session()?;
        let url = request.url.clone();
        self.reporter.report(ProgressEvent::Requesting {
            endpoint: url.clone(),
        });

        let request = request.with_basic_auth(&session.username, &session.password);
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| SyncFailure::RequestFailed {
                url: url.clone(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(SyncFailure::HttpStatus {
                url,
                status: response.status,
            });
        }
        Ok(response.body)
    }

    async fn upload_batch(&self, batch: &[EpisodeAction]) -> Result<(), SyncServiceError> {
        let url = self.endpoint("episode_action/create")?;
        let body = serde_json::to_string(batch)?;
        self.perform(HttpRequest::post_json(url.as_str(), body)).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClient> SyncService for NextcloudSyncService<C> {
    async fn login(&mut self) -> Result<(), SyncServiceError> {
        let account = self.account.as_ref().ok_or(SyncFailure::NoAccount)?;
        let server = Url::parse(account.server_url.trim())?;

        tracing::debug!(server = %server, username = %account.username, "logged in to Nextcloud");
        self.session = Some(Session {
            server,
            username: account.username.clone(),
            password: account.app_password.clone(),
        });
        Ok(())
    }

    async fn get_subscription_changes(
        &self,
        since: i64,
    ) -> Result<SubscriptionChanges, SyncServiceError> {
        let url = self.endpoint_since("subscriptions", since)?;
        let body = self.perform(HttpRequest::get(url.as_str())).await?;
        let changes: SubscriptionChanges = serde_json::from_slice(&body)?;

        self.reporter.report(ProgressEvent::SubscriptionsReceived {
            added: changes.add.len(),
            removed: changes.remove.len(),
        });
        Ok(changes)
    }

    async fn upload_subscription_changes(
        &self,
        added: &[String],
        removed: &[String],
    ) -> Result<UploadChangesResponse, SyncServiceError> {
        let url = self.endpoint("subscription_change/create")?;
        let body = json!({ "add": added, "remove": removed }).to_string();
        let response = self
            .perform(HttpRequest::post_json(url.as_str(), body))
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }

    async fn get_episode_action_changes(
        &self,
        since: i64,
    ) -> Result<EpisodeActionChanges, SyncServiceError> {
        let url = self.endpoint_since("episode_action", since)?;
        let body = self.perform(HttpRequest::get(url.as_str())).await?;
        let changes = EpisodeActionChanges::from_json(&body)?;

        self.reporter.report(ProgressEvent::EpisodeActionsReceived {
            count: changes.actions.len(),
        });
        Ok(changes)
    }

    /// Upload actions in batches; the first failed batch aborts the rest
    async fn upload_episode_actions(
        &self,
        actions: &[EpisodeAction],
    ) -> Result<UploadChangesResponse, SyncServiceError> {
        self.session()?;
        let total_batches = actions.len().div_ceil(UPLOAD_BULK_SIZE);

        for (batch_index, batch) in actions.chunks(UPLOAD_BULK_SIZE).enumerate() {
            self.reporter.report(ProgressEvent::UploadingBatch {
                batch_index,
                total_batches,
                actions_in_batch: batch.len(),
            });

            if let Err(e) = self.upload_batch(batch).await {
                tracing::error!(batch_index, total_batches, error = %e, "episode action upload failed");
                self.reporter.report(ProgressEvent::BatchFailed {
                    batch_index,
                    error: e.to_string(),
                });
                return Err(e);
            }
            self.reporter
                .report(ProgressEvent::BatchUploaded { batch_index });
        }

        Ok(UploadChangesResponse {
            timestamp: Utc::now().timestamp_millis() / 1000,
            update_urls: Vec::new(),
        })
    }

    async fn logout(&mut self) {
        self.session = None;
    }
}
