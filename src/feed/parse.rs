// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, Utc};
use url::Url;

use crate::error::FeedError;

use super::media::{duration_ms_from_seconds, parse_itunes_duration};

/// Title used for episodes that carry none
pub const UNTITLED_EPISODE: &str = "Untitled Episode";

/// Represents a parsed podcast feed
#[derive(Debug, Clone)]
pub struct Podcast {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<Url>,
    pub author: Option<String>,
    pub image_url: Option<Url>,
    pub feed_url: Url,
    pub episodes: Vec<Episode>,
}

/// Represents a single podcast episode
#[derive(Debug, Clone)]
pub struct Episode {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<Url>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub guid: Option<String>,
    pub image_url: Option<Url>,
    pub enclosure: Option<Enclosure>,
    pub duration: Option<String>,
    pub episode_number: Option<u32>,
    pub season_number: Option<u32>,
}

/// Represents the audio file attached to an episode
#[derive(Debug, Clone)]
pub struct Enclosure {
    pub url: Url,
    pub length: Option<u64>,
    pub mime_type: Option<String>,
    /// Playback duration in milliseconds, bounded by `i32::MAX`
    pub duration_ms: Option<u32>,
}

/// Parse RSS feed XML bytes into a Podcast struct
pub fn parse_rss(xml_bytes: &[u8], feed_url: Url) -> Result<Podcast, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;
    let now = Utc::now();

    let episodes = channel
        .items()
        .iter()
        .map(|item| parse_episode(item, now))
        .collect();

    let image_url = channel
        .image()
        .and_then(|img| Url::parse(img.url()).ok())
        .or_else(|| {
            channel
                .itunes_ext()
                .and_then(|ext| ext.image())
                .and_then(|url| Url::parse(url).ok())
        });

    let author = channel
        .itunes_ext()
        .and_then(|ext| ext.author().map(String::from))
        .or_else(|| channel.managing_editor().map(String::from));

    Ok(Podcast {
        title: channel.title().to_string(),
        description: Some(channel.description().to_string()).filter(|s| !s.is_empty()),
        link: Url::parse(channel.link()).ok(),
        author,
        image_url,
        feed_url,
        episodes,
    })
}

fn parse_episode(item: &rss::Item, now: DateTime<Utc>) -> Episode {
    let itunes = item.itunes_ext();
    let duration = itunes.and_then(|ext| ext.duration().map(String::from));

    let enclosure = item.enclosure().and_then(|enclosure| {
        Some(Enclosure {
            url: Url::parse(enclosure.url()).ok()?,
            length: enclosure.length().parse().ok(),
            mime_type: Some(enclosure.mime_type().to_string()).filter(|s| !s.is_empty()),
            duration_ms: duration
                .as_deref()
                .and_then(parse_itunes_duration)
                .and_then(duration_ms_from_seconds),
        })
    });

    let guid = item
        .guid()
        .map(|g| g.value().to_string())
        .or_else(|| enclosure.as_ref().map(|e| e.url.to_string()));

    Episode {
        title: item
            .title()
            .map(String::from)
            .unwrap_or_else(|| UNTITLED_EPISODE.to_string()),
        description: item.description().map(String::from),
        link: item.link().and_then(|link| Url::parse(link).ok()),
        pub_date: item
            .pub_date()
            .and_then(|date_str| parse_date_not_in_future(date_str, now)),
        guid,
        image_url: itunes
            .and_then(|ext| ext.image())
            .and_then(|url| Url::parse(url).ok()),
        enclosure,
        duration,
        episode_number: itunes.and_then(|ext| ext.episode().and_then(|e| e.parse().ok())),
        season_number: itunes.and_then(|ext| ext.season().and_then(|s| s.parse().ok())),
    }
}

/// Parse a publication date, discarding dates that lie in the future
pub fn parse_date_not_in_future(
    date_str: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<FixedOffset>> {
    parse_date(date_str).filter(|date| date.with_timezone(&Utc) <= now)
}

/// Parse RFC 2822, RFC 3339 and a few common relaxed variants
pub fn parse_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let date_str = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(date_str) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt);
    }

    let formats = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    formats
        .iter()
        .find_map(|format| DateTime::parse_from_str(date_str, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Test Podcast</title>
    <description>A test podcast for unit testing</description>
    <link>https://example.com</link>
    <itunes:author>Test Author</itunes:author>
    <itunes:image href="https://example.com/image.jpg"/>
    <item>
      <title>Episode 1</title>
      <description>First episode</description>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <guid>ep1-guid</guid>
      <enclosure url="https://example.com/ep1.mp3" length="1234567" type="audio/mpeg"/>
      <itunes:duration>30:00</itunes:duration>
      <itunes:episode>1</itunes:episode>
      <itunes:season>1</itunes:season>
    </item>
    <item>
      <title>Episode 2</title>
      <enclosure url="https://example.com/ep2.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Announcement</title>
      <pubDate>Fri, 01 Jan 2100 12:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    fn feed_url() -> Url {
        Url::parse("https://example.com/feed.xml").unwrap()
    }

    #[test]
    fn parse_rss_extracts_podcast_metadata() {
        let podcast = parse_rss(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        assert_eq!(podcast.title, "Test Podcast");
        assert_eq!(
            podcast.description,
            Some("A test podcast for unit testing".to_string())
        );
        assert_eq!(podcast.author, Some("Test Author".to_string()));
        assert_eq!(podcast.feed_url, feed_url());
    }

    #[test]
    fn parse_rss_extracts_episodes() {
        let podcast = parse_rss(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();
        assert_eq!(podcast.episodes.len(), 3);

        let ep1 = &podcast.episodes[0];
        assert_eq!(ep1.title, "Episode 1");
        assert_eq!(ep1.guid, Some("ep1-guid".to_string()));
        assert_eq!(ep1.duration, Some("30:00".to_string()));
        assert_eq!(ep1.episode_number, Some(1));
        assert_eq!(ep1.season_number, Some(1));

        let enclosure = ep1.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.length, Some(1234567));
        assert_eq!(enclosure.duration_ms, Some(1_800_000));
    }

    #[test]
    fn parse_rss_handles_missing_optional_fields() {
        let podcast = parse_rss(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        let ep2 = &podcast.episodes[1];
        assert_eq!(ep2.title, "Episode 2");
        assert!(ep2.pub_date.is_none());
        assert!(ep2.duration.is_none());
        assert!(ep2.episode_number.is_none());
        assert_eq!(ep2.guid.as_deref(), Some("https://example.com/ep2.mp3"));
    }

    #[test]
    fn parse_rss_keeps_items_without_enclosure() {
        let podcast = parse_rss(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        let announcement = &podcast.episodes[2];
        assert!(announcement.enclosure.is_none());
        assert!(announcement.guid.is_none());
        assert!(announcement.pub_date.is_none());
    }

    #[test]
    fn future_dates_are_discarded() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(parse_date_not_in_future("2024-01-22T00:01:39+01:00", now).is_some());
        assert!(parse_date_not_in_future("2026-01-22T00:01:39+01:00", now).is_none());
        assert!(parse_date_not_in_future("not a date", now).is_none());
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        assert!(parse_date("Mon, 01 Jan 2024 12:00:00 +0000").is_some());
        assert!(parse_date("2024-01-22T00:01:39+01:00").is_some());
        assert!(parse_date("2024-01-22T00:01:39.123Z").is_some());
        assert!(parse_date("2024-01-22 00:01:39 +0100").is_some());
    }
}
