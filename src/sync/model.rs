// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subscriptions added and removed on the server since a timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionChanges {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
    /// Server time of this change set, in seconds
    pub timestamp: i64,
}

/// Server answer to an upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadChangesResponse {
    /// Server time of the upload, in seconds
    pub timestamp: i64,
    /// Feed URLs the server rewrote, as (old, new) pairs
    #[serde(default)]
    pub update_urls: Vec<(String, String)>,
}

/// Kind of an episode action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EpisodeActionKind {
    New,
    Download,
    Play,
    Delete,
}

impl EpisodeActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EpisodeActionKind::New => "new",
            EpisodeActionKind::Download => "download",
            EpisodeActionKind::Play => "play",
            EpisodeActionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for EpisodeActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(EpisodeActionKind::New),
            "download" => Ok(EpisodeActionKind::Download),
            "play" => Ok(EpisodeActionKind::Play),
            "delete" => Ok(EpisodeActionKind::Delete),
            other => Err(format!("unknown episode action '{other}'")),
        }
    }
}

impl TryFrom<String> for EpisodeActionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Something that happened to an episode on one of the user's devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeAction {
    /// Feed URL of the podcast
    pub podcast: String,
    /// Media URL of the episode
    pub episode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub action: EpisodeActionKind,
    /// UTC time of the action
    #[serde(with = "gpodder_time")]
    pub timestamp: NaiveDateTime,
    /// Playback start, end and episode length in seconds; only for plays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl EpisodeAction {
    pub fn new(
        podcast: impl Into<String>,
        episode: impl Into<String>,
        action: EpisodeActionKind,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            podcast: podcast.into(),
            episode: episode.into(),
            guid: None,
            action,
            timestamp,
            started: None,
            position: None,
            total: None,
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Attach playback positions; other action kinds ignore them
    pub fn with_playback(mut self, started: i64, position: i64, total: i64) -> Self {
        if self.action == EpisodeActionKind::Play {
            self.started = Some(started);
            self.position = Some(position);
            self.total = Some(total);
        }
        self
    }
}

/// Episode actions recorded on the server since a timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeActionChanges {
    pub actions: Vec<EpisodeAction>,
    pub timestamp: i64,
}

#[derive(Deserialize)]
struct RawEpisodeActionChanges {
    #[serde(default)]
    actions: Vec<Value>,
    timestamp: i64,
}

impl EpisodeActionChanges {
    /// Parse a server response, skipping actions that cannot be read
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawEpisodeActionChanges = serde_json::from_slice(bytes)?;
        let actions = raw
            .actions
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(action) => Some(action),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable episode action");
                    None
                }
            })
            .collect();

        Ok(Self {
            actions,
            timestamp: raw.timestamp,
        })
    }
}

/// Timestamps as `YYYY-MM-DDTHH:MM:SS` in UTC without zone suffix
mod gpodder_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        let value = value.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(value, READ_FORMAT).map_err(de::Error::custom)
    }
}
