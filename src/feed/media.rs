// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

/// Mime type used when the URL does not reveal the media format
pub const GENERIC_AUDIO_MIME: &str = "audio/*";

/// Guess the mime type of a media URL from its file extension
pub fn mime_type_for_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|filename| filename.rsplit_once('.'))
        .and_then(|(_, ext)| extension_to_mime(ext))
        .unwrap_or(GENERIC_AUDIO_MIME)
        .to_string()
}

/// Map file extensions to media mime types
fn extension_to_mime(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" | "oga" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "wav" => Some("audio/wav"),
        "flac" => Some("audio/flac"),
        "mp4" | "m4v" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Convert a duration in seconds to milliseconds
///
/// Zero durations and values that do not fit a signed 32 bit integer
/// yield `None`.
pub fn duration_ms_from_seconds(seconds: u64) -> Option<u32> {
    seconds
        .checked_mul(1000)
        .filter(|ms| *ms > 0 && *ms <= i32::MAX as u64)
        .map(|ms| ms as u32)
}

/// Parse an `itunes:duration` value (`HH:MM:SS`, `MM:SS` or plain seconds)
pub fn parse_itunes_duration(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    parts.iter().try_fold(0u64, |total, part| {
        let part = part.trim();
        let number = part
            .parse::<u64>()
            .ok()
            .or_else(|| part.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))?;
        total.checked_mul(60)?.checked_add(number)
    })
}
