// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod audiothek;
mod fetch;
pub mod media;
mod parse;

pub use audiothek::parse_audiothek_json;
pub use fetch::{fetch_feed, is_json_document, is_url, parse_feed_bytes, parse_feed_file};
pub use parse::{
    Enclosure, Episode, Podcast, UNTITLED_EPISODE, parse_date, parse_date_not_in_future, parse_rss,
};
