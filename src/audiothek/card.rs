// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

/// A normalized promotional or search unit shown as a card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentCard {
    /// Display title, empty when absent upstream
    pub title: String,
    pub image_url: Option<String>,
    /// Subscribable feed resource, never empty
    pub feed_url: String,
    pub program_set_id: Option<String>,
    pub target: CardTarget,
}

/// What tapping a card does, decided once at normalization time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardTarget {
    /// Open the subscription flow for the card's feed URL
    Browsable,
    /// Play the attached audio right away
    Playable(PlayableAudio),
}

/// Inline-playable audio attached to a card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayableAudio {
    pub audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Publication timestamp as delivered by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

impl ContentCard {
    /// Create a card that opens the feed when tapped
    pub fn browsable(title: String, image_url: Option<String>, feed_url: String) -> Self {
        Self {
            title,
            image_url,
            feed_url,
            program_set_id: None,
            target: CardTarget::Browsable,
        }
    }

    /// The playable audio, if this card plays directly
    pub fn playable(&self) -> Option<&PlayableAudio> {
        match &self.target {
            CardTarget::Playable(audio) => Some(audio),
            CardTarget::Browsable => None,
        }
    }
}

/// A titled, ordered collection of cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub title: String,
    pub cards: Vec<ContentCard>,
}

/// A program set found by the search provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodcastSearchResult {
    pub title: String,
    pub image_url: Option<String>,
    pub feed_url: String,
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browsable_card_has_no_audio() {
        let card = ContentCard::browsable(
            "Show".to_string(),
            None,
            "https://api.ardaudiothek.de/programsets/1".to_string(),
        );
        assert!(card.playable().is_none());
    }

    #[test]
    fn playable_card_exposes_audio() {
        let card = ContentCard {
            title: "Episode".to_string(),
            image_url: None,
            feed_url: "https://api.ardaudiothek.de/programsets/1".to_string(),
            program_set_id: Some("1".to_string()),
            target: CardTarget::Playable(PlayableAudio {
                audio_url: "https://example.com/a.mp3".to_string(),
                description: None,
                duration_seconds: Some(60),
                publish_date: None,
                item_id: None,
            }),
        };
        assert_eq!(
            card.playable().map(|a| a.audio_url.as_str()),
            Some("https://example.com/a.mp3")
        );
    }
}
