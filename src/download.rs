// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preparation of feed and media download requests.

use std::path::PathBuf;

use url::Url;

use crate::audiothek::API_HOST;

/// Page size requested for Audiothek program set feeds
pub const AUDIOTHEK_PAGE_LIMIT: u32 = 100;

const PROGRAM_SET_PATH_PREFIX: &str = "/programsets/";

const LIMIT_KEY: &str = "limit";

/// Podcast-specific schemes that stand for plain http
const FEED_SCHEMES: [&str; 3] = ["feed://", "itpc://", "pcast://"];

/// Ask Audiothek program set URLs for a full page of episodes
///
/// Only URLs on the API host whose path starts with `/programsets/` are
/// touched. URLs whose query already names a `limit` key are returned
/// unchanged, as are URLs that cannot be parsed. Other query pairs such as
/// `order` are kept and the limit is appended after them.
pub fn ensure_audiothek_limit(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let is_program_set = parsed
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(API_HOST))
        && parsed.path().starts_with(PROGRAM_SET_PATH_PREFIX);
    if !is_program_set {
        return url.to_string();
    }

    let has_limit = parsed.query_pairs().any(|(key, _)| key == LIMIT_KEY);
    if has_limit {
        return url.to_string();
    }

    parsed
        .query_pairs_mut()
        .append_pair(LIMIT_KEY, &AUDIOTHEK_PAGE_LIMIT.to_string());
    parsed.into()
}

/// Normalize a user-supplied feed or media URL
///
/// Whitespace is trimmed, podcast schemes are mapped to http and URLs
/// without any scheme get `http://`.
pub fn prepare_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();

    if let Some(rest) = lower
        .strip_prefix("feed:")
        .filter(|rest| rest.starts_with("http://") || rest.starts_with("https://"))
    {
        return url[url.len() - rest.len()..].to_string();
    }
    if let Some(scheme) = FEED_SCHEMES.iter().find(|scheme| lower.starts_with(*scheme)) {
        return format!("http://{}", &url[scheme.len()..]);
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return url.to_string();
    }
    if url.contains("://") {
        return url.to_string();
    }
    format!("http://{url}")
}

/// What a download request fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadKind {
    /// A feed document; `page_nr` selects the page of a paged feed
    Feed { page_nr: u32 },
    /// An episode's media file
    Media,
}

/// A prepared download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub destination: PathBuf,
    pub source: String,
    pub title: Option<String>,
    pub kind: DownloadKind,
    pub last_modified: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub initiated_by_user: bool,
}

/// Builder for download requests
///
/// Feed sources are normalized and, for Audiothek program sets, given an
/// explicit page size. Local feeds are kept as they are.
#[derive(Debug, Clone)]
pub struct DownloadRequestBuilder {
    destination: PathBuf,
    source: String,
    title: Option<String>,
    kind: DownloadKind,
    last_modified: Option<String>,
    username: Option<String>,
    password: Option<String>,
    initiated_by_user: bool,
}

impl DownloadRequestBuilder {
    /// Start a request for a feed document
    pub fn for_feed(
        destination: impl Into<PathBuf>,
        feed_url: &str,
        is_local: bool,
        page_nr: u32,
    ) -> Self {
        let source = if is_local {
            feed_url.to_string()
        } else {
            ensure_audiothek_limit(&prepare_url(feed_url))
        };
        Self::new(destination.into(), source, DownloadKind::Feed { page_nr })
    }

    /// Start a request for an episode media file
    pub fn for_media(destination: impl Into<PathBuf>, media_url: &str) -> Self {
        Self::new(destination.into(), prepare_url(media_url), DownloadKind::Media)
    }

    fn new(destination: PathBuf, source: String, kind: DownloadKind) -> Self {
        Self {
            destination,
            source,
            title: None,
            kind,
            last_modified: None,
            username: None,
            password: None,
            initiated_by_user: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_initiated_by_user(mut self, initiated_by_user: bool) -> Self {
        self.initiated_by_user = initiated_by_user;
        self
    }

    /// Replace the source URL, for example after a redirect
    pub fn set_source(&mut self, source: &str) {
        self.source = ensure_audiothek_limit(source);
    }

    /// A forced download ignores the cached modification date
    pub fn set_force(&mut self, force: bool) {
        if force {
            self.last_modified = None;
        }
    }

    pub fn last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn with_authentication(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn build(self) -> DownloadRequest {
        tracing::debug!(source = %self.source, kind = ?self.kind, "prepared download request");
        DownloadRequest {
            destination: self.destination,
            source: self.source,
            title: self.title,
            kind: self.kind,
            last_modified: self.last_modified,
            username: self.username,
            password: self.password,
            initiated_by_user: self.initiated_by_user,
        }
    }
}
