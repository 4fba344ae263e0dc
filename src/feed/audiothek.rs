// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for the Audiothek JSON program set and editorial collection
//! documents, delivered in place of an RSS feed.

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use crate::audiothek::json::{array, first_present, first_str, image_url, object, string, unsigned};
use crate::error::FeedError;

use super::media::{duration_ms_from_seconds, mime_type_for_url};
use super::parse::{Enclosure, Episode, Podcast, UNTITLED_EPISODE, parse_date_not_in_future};

/// Image width requested for feed and episode artwork
pub const IMAGE_WIDTH: u32 = 300;

const FEED_TYPE: &str = "json";

/// Parse an Audiothek JSON document into a Podcast
///
/// The document must carry `data.programSet` or `data.editorialCollection`;
/// the program set wins when both are present. `fallback_title` is used
/// when the document has no title of its own.
pub fn parse_audiothek_json(
    bytes: &[u8],
    feed_url: Url,
    fallback_title: Option<&str>,
) -> Result<Podcast, FeedError> {
    let root: Value = serde_json::from_slice(bytes)?;

    let data = object(&root, "data").ok_or_else(|| unsupported("Missing data"))?;
    let feed_root = object(data, "programSet")
        .or_else(|| object(data, "editorialCollection"))
        .ok_or_else(|| unsupported("Missing data.programSet"))?;

    let now = Utc::now();
    let episodes = object(feed_root, "items")
        .and_then(|items| array(items, "nodes"))
        .unwrap_or_default()
        .iter()
        .filter(|node| node.is_object())
        .map(|node| parse_node(node, now))
        .collect();

    Ok(Podcast {
        title: string(feed_root, "title")
            .or_else(|| fallback_title.map(String::from))
            .unwrap_or_default(),
        description: string(feed_root, "synopsis"),
        link: string(feed_root, "sharingUrl").and_then(|link| Url::parse(&link).ok()),
        author: None,
        image_url: parse_image(feed_root),
        feed_url,
        episodes,
    })
}

fn unsupported(reason: &str) -> FeedError {
    FeedError::UnsupportedFeedType {
        feed_type: FEED_TYPE.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_image(value: &Value) -> Option<Url> {
    image_url(object(value, "image"), IMAGE_WIDTH).and_then(|url| Url::parse(&url).ok())
}

fn parse_node(node: &Value, now: DateTime<Utc>) -> Episode {
    Episode {
        // Episode titles are not optional, so untitled nodes share the RSS placeholder
        title: string(node, "title").unwrap_or_else(|| UNTITLED_EPISODE.to_string()),
        description: string(node, "synopsis"),
        link: string(node, "sharingUrl").and_then(|link| Url::parse(&link).ok()),
        pub_date: string(node, "publicationStartDateAndTime")
            .and_then(|date| parse_date_not_in_future(&date, now)),
        guid: first_str(node, &["publicationId", "assetId", "id"]),
        image_url: parse_image(node),
        enclosure: parse_enclosure(node),
        duration: None,
        episode_number: None,
        season_number: None,
    }
}

/// Enclosure from the first entry of `audios`, preferring its download URL
fn parse_enclosure(node: &Value) -> Option<Enclosure> {
    let audio = array(node, "audios")?.first()?;
    let url = first_present([string(audio, "downloadUrl"), string(audio, "url")])?;
    let url = Url::parse(&url).ok()?;

    Some(Enclosure {
        mime_type: Some(mime_type_for_url(&url)),
        url,
        length: None,
        duration_ms: unsigned(node, "duration").and_then(duration_ms_from_seconds),
    })
}
