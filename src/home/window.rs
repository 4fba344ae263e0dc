// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering windows over loaded cards padded with placeholder slots.

use chrono::Utc;
use url::Url;

use crate::audiothek::{CardTarget, ContentCard, HomeSection, Module, PROVIDER_NAME};
use crate::feed::media::{GENERIC_AUDIO_MIME, duration_ms_from_seconds};
use crate::feed::{Enclosure, Episode, Podcast, parse_date_not_in_future};

/// Opacity of a slot showing a loaded card
pub const CARD_ALPHA: f32 = 1.0;

/// Opacity of a placeholder slot
pub const PLACEHOLDER_ALPHA: f32 = 0.1;

/// Content of a single position in a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Card(&'a ContentCard),
    Placeholder,
}

impl Slot<'_> {
    pub fn alpha(&self) -> f32 {
        match self {
            Slot::Card(_) => CARD_ALPHA,
            Slot::Placeholder => PLACEHOLDER_ALPHA,
        }
    }

    /// Placeholders neither show a title nor react to taps
    pub fn is_interactive(&self) -> bool {
        matches!(self, Slot::Card(_))
    }
}

/// Outcome of tapping a card
#[derive(Debug, Clone)]
pub enum TapAction {
    /// Open the program set for subscription
    OpenFeed { feed_url: String },
    /// Play an episode wrapped in an unsubscribed single-episode feed
    PlayEpisode(Podcast),
}

/// A flat list of cards followed by placeholder slots
#[derive(Debug, Clone)]
pub struct CardWindow {
    section: HomeSection,
    cards: Vec<ContentCard>,
    placeholders: usize,
}

impl CardWindow {
    pub fn new(section: HomeSection) -> Self {
        Self {
            section,
            cards: Vec::new(),
            placeholders: 0,
        }
    }

    /// Show `count` placeholders after the current cards
    pub fn set_placeholders(&mut self, count: usize) {
        self.placeholders = count;
    }

    /// Replace the cards; placeholders are left as they are
    pub fn update(&mut self, cards: Vec<ContentCard>) {
        self.cards = cards;
    }

    pub fn cards(&self) -> &[ContentCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len() + self.placeholders
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slot(&self, position: usize) -> Option<Slot<'_>> {
        if let Some(card) = self.cards.get(position) {
            Some(Slot::Card(card))
        } else if position < self.len() {
            Some(Slot::Placeholder)
        } else {
            None
        }
    }

    /// Resolve a tap on `position`; placeholders yield nothing
    pub fn tap(&self, position: usize) -> Option<TapAction> {
        let card = self.cards.get(position)?;
        Some(tap_action(self.section, card))
    }
}

/// Modules of cards followed by placeholder modules
#[derive(Debug, Clone, Default)]
pub struct ModuleWindow {
    modules: Vec<Module>,
    placeholder_modules: usize,
    placeholder_cards: usize,
}

impl ModuleWindow {
    pub fn set_placeholders(&mut self, modules: usize, cards_per_module: usize) {
        self.placeholder_modules = modules;
        self.placeholder_cards = cards_per_module;
    }

    pub fn update(&mut self, modules: Vec<Module>) {
        self.modules = modules;
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.placeholder_modules
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Title of a module row; placeholder rows have none
    pub fn title(&self, row: usize) -> Option<&str> {
        self.modules.get(row).map(|module| module.title.as_str())
    }

    /// Cards of a module row, or a placeholder-only row past the loaded modules
    pub fn row(&self, row: usize) -> Option<CardWindow> {
        if let Some(module) = self.modules.get(row) {
            return Some(CardWindow {
                section: HomeSection::Modules,
                cards: module.cards.clone(),
                placeholders: 0,
            });
        }
        (row < self.len()).then(|| CardWindow {
            section: HomeSection::Modules,
            cards: Vec::new(),
            placeholders: self.placeholder_cards,
        })
    }
}

/// Decide what tapping `card` does
pub fn tap_action(section: HomeSection, card: &ContentCard) -> TapAction {
    match &card.target {
        CardTarget::Playable(_) => match ephemeral_feed(section, card) {
            Some(podcast) => TapAction::PlayEpisode(podcast),
            None => TapAction::OpenFeed {
                feed_url: card.feed_url.clone(),
            },
        },
        CardTarget::Browsable => TapAction::OpenFeed {
            feed_url: card.feed_url.clone(),
        },
    }
}

/// Wrap a playable card in an unsubscribed feed holding just that episode
///
/// Returns `None` when the card is not playable or its audio URL is invalid.
pub fn ephemeral_feed(section: HomeSection, card: &ContentCard) -> Option<Podcast> {
    let audio = card.playable()?;
    let program_set_id = card.program_set_id.as_deref().unwrap_or_default();
    let feed_url = Url::parse(&format!("audiothek:{}:{program_set_id}", section.key())).ok()?;
    let image_url = card.image_url.as_deref().and_then(|url| Url::parse(url).ok());

    let enclosure = Enclosure {
        url: Url::parse(&audio.audio_url).ok()?,
        length: None,
        mime_type: Some(GENERIC_AUDIO_MIME.to_string()),
        duration_ms: audio.duration_seconds.and_then(duration_ms_from_seconds),
    };

    let episode = Episode {
        title: card.title.clone(),
        description: audio.description.clone(),
        link: None,
        pub_date: audio
            .publish_date
            .as_deref()
            .and_then(|date| parse_date_not_in_future(date, Utc::now())),
        guid: audio.item_id.clone(),
        image_url: image_url.clone(),
        enclosure: Some(enclosure),
        duration: None,
        episode_number: None,
        season_number: None,
    };

    Some(Podcast {
        title: PROVIDER_NAME.to_string(),
        description: None,
        link: None,
        author: None,
        image_url,
        feed_url,
        episodes: vec![episode],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audiothek::PlayableAudio;

    fn browsable(title: &str) -> ContentCard {
        ContentCard::browsable(
            title.to_string(),
            None,
            format!("https://api.ardaudiothek.de/programsets/{title}"),
        )
    }

    fn playable(duration_seconds: Option<u64>, publish_date: Option<&str>) -> ContentCard {
        ContentCard {
            title: "Episode".to_string(),
            image_url: Some("https://img/600".to_string()),
            feed_url: "https://api.ardaudiothek.de/programsets/42".to_string(),
            program_set_id: Some("42".to_string()),
            target: CardTarget::Playable(PlayableAudio {
                audio_url: "https://dl/a.mp3".to_string(),
                description: Some("About".to_string()),
                duration_seconds,
                publish_date: publish_date.map(String::from),
                item_id: Some("urn:ep".to_string()),
            }),
        }
    }

    #[test]
    fn three_cards_and_five_placeholders() {
        let mut window = CardWindow::new(HomeSection::Hot);
        window.update(vec![browsable("1"), browsable("2"), browsable("3")]);
        window.set_placeholders(5);

        assert_eq!(window.len(), 8);
        assert!(matches!(window.slot(2), Some(Slot::Card(_))));

        let slot = window.slot(3).unwrap();
        assert_eq!(slot, Slot::Placeholder);
        assert_eq!(slot.alpha(), PLACEHOLDER_ALPHA);
        assert!(!slot.is_interactive());
        assert!(window.tap(3).is_none());

        assert!(window.slot(8).is_none());
    }

    #[test]
    fn loaded_window_without_placeholders() {
        let mut window = CardWindow::new(HomeSection::HeuteWichtig);
        window.set_placeholders(8);
        window.update(vec![browsable("1")]);
        window.set_placeholders(0);

        assert_eq!(window.len(), 1);
        assert_eq!(window.slot(0).unwrap().alpha(), CARD_ALPHA);
        assert!(window.slot(1).is_none());
    }

    #[test]
    fn browsable_card_opens_feed() {
        let mut window = CardWindow::new(HomeSection::Hot);
        window.update(vec![browsable("7")]);

        match window.tap(0) {
            Some(TapAction::OpenFeed { feed_url }) => {
                assert_eq!(feed_url, "https://api.ardaudiothek.de/programsets/7")
            }
            other => panic!("Expected OpenFeed, got {other:?}"),
        }
    }

    #[test]
    fn playable_card_plays_ephemeral_episode() {
        let card = playable(Some(1800), Some("2024-01-15T06:00:00+01:00"));
        let podcast = match tap_action(HomeSection::Hot, &card) {
            TapAction::PlayEpisode(podcast) => podcast,
            other => panic!("Expected PlayEpisode, got {other:?}"),
        };

        assert_eq!(podcast.title, "ARD Audiothek");
        assert_eq!(podcast.feed_url.as_str(), "audiothek:hot:42");
        assert_eq!(podcast.episodes.len(), 1);

        let episode = &podcast.episodes[0];
        assert_eq!(episode.title, "Episode");
        assert_eq!(episode.guid.as_deref(), Some("urn:ep"));
        assert!(episode.pub_date.is_some());

        let enclosure = episode.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url.as_str(), "https://dl/a.mp3");
        assert_eq!(enclosure.mime_type.as_deref(), Some("audio/*"));
        assert_eq!(enclosure.duration_ms, Some(1_800_000));
    }

    #[test]
    fn ephemeral_episode_drops_future_date_and_huge_duration() {
        let card = playable(Some(5_000_000), Some("2999-01-01T00:00:00+00:00"));
        let podcast = ephemeral_feed(HomeSection::Live, &card).unwrap();

        assert_eq!(podcast.feed_url.as_str(), "audiothek:live:42");
        let episode = &podcast.episodes[0];
        assert!(episode.pub_date.is_none());
        assert_eq!(episode.enclosure.as_ref().unwrap().duration_ms, None);
    }

    #[test]
    fn module_window_pads_rows() {
        let mut window = ModuleWindow::default();
        window.set_placeholders(2, 8);
        assert_eq!(window.len(), 2);
        assert_eq!(window.row(0).unwrap().len(), 8);
        assert!(window.title(0).is_none());

        window.update(vec![Module {
            title: "Featured".to_string(),
            cards: vec![browsable("1")],
        }]);
        window.set_placeholders(0, 0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.title(0), Some("Featured"));
        assert_eq!(window.row(0).unwrap().len(), 1);
        assert!(window.row(1).is_none());
    }
}
