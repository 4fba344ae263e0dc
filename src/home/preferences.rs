// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PreferencesError;

/// Tags of every section the home screen knows, in default order
pub const DEFAULT_SECTION_ORDER: [&str; 12] = [
    "AudiothekHotSection",
    "AudiothekChartsSection",
    "AudiothekHeuteWichtigSection",
    "AudiothekFeaturedSection",
    "AudiothekSection",
    "QueueSection",
    "InboxSection",
    "EpisodesSurpriseSection",
    "SubscriptionsSection",
    "DownloadsSection",
    "AudiothekLiveSection",
    "AudiothekStageSection",
];

/// Sections hidden until the user configures otherwise
pub const DEFAULT_HIDDEN_SECTIONS: [&str; 2] = ["AudiothekStageSection", "AudiothekLiveSection"];

const SEPARATOR: char = ',';

/// Stored visibility and order of home screen sections
///
/// Both lists are kept as comma-joined strings; an empty string means
/// "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePreferences {
    #[serde(rename = "PrefHomeSectionsString", default)]
    hidden_sections: String,
    #[serde(rename = "PrefHomeSectionOrder", default)]
    section_order: String,
}

impl HomePreferences {
    /// Load preferences, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(PreferencesError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| PreferencesError::JsonParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Store new hidden sections and order, then write them to `path`
    pub fn save_changes(
        &mut self,
        path: &Path,
        hidden_sections: &[String],
        section_order: &[String],
    ) -> Result<(), PreferencesError> {
        self.hidden_sections = hidden_sections.join(",");
        self.section_order = section_order.join(",");

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| PreferencesError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn hidden_section_tags(&self) -> Vec<String> {
        let hidden = split_list(&self.hidden_sections);
        if hidden.is_empty() {
            return to_owned(&DEFAULT_HIDDEN_SECTIONS);
        }
        hidden
    }

    pub fn section_order(&self) -> Vec<String> {
        let order = split_list(&self.section_order);
        if order.is_empty() {
            return to_owned(&DEFAULT_SECTION_ORDER);
        }
        order
    }

    /// Visible section tags in display order
    ///
    /// Known sections missing from the stored order go last, keeping their
    /// default relative order.
    pub fn sorted_section_tags(&self) -> Vec<String> {
        let order = self.section_order();
        let hidden = self.hidden_section_tags();

        let mut tags = to_owned(&DEFAULT_SECTION_ORDER);
        tags.sort_by_key(|tag| order.iter().position(|o| o == tag).unwrap_or(usize::MAX));
        tags.retain(|tag| !hidden.contains(tag));
        tags
    }
}

fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(SEPARATOR).map(String::from).collect()
}

fn to_owned(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}
