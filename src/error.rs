// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching and normalizing Audiothek content
///
/// All variants collapse to the same "fetch failed" outcome at the UI
/// boundary; they are kept apart for logging.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed JSON response: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("GraphQL request returned errors: {0}")]
    GraphQl(String),
}

/// Errors that can occur when fetching or parsing feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for feed {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Failed to parse JSON feed: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("Unsupported feed type {feed_type}: {reason}")]
    UnsupportedFeedType { feed_type: String, reason: String },

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur when loading or saving home screen preferences
#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Failed to read preferences file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preferences file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),
}

/// Underlying cause of a failed synchronization call
#[derive(Error, Debug)]
pub enum SyncFailure {
    #[error("No Nextcloud account selected")]
    NoAccount,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The single error kind surfaced by synchronization backends
#[derive(Error, Debug)]
#[error("Synchronization failed: {cause}")]
pub struct SyncServiceError {
    #[source]
    pub cause: SyncFailure,
}

impl SyncServiceError {
    pub fn cause(&self) -> &SyncFailure {
        &self.cause
    }
}

impl From<SyncFailure> for SyncServiceError {
    fn from(cause: SyncFailure) -> Self {
        Self { cause }
    }
}

impl From<serde_json::Error> for SyncServiceError {
    fn from(e: serde_json::Error) -> Self {
        SyncFailure::Json(e).into()
    }
}

impl From<url::ParseError> for SyncServiceError {
    fn from(e: url::ParseError) -> Self {
        SyncFailure::InvalidUrl(e).into()
    }
}
