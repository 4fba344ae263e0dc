// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ARD Audiothek content API: response normalizers, search and home sections.

mod card;
pub mod graphql;
pub mod hal;
pub(crate) mod json;
pub mod search;
mod sections;

pub use card::{CardTarget, ContentCard, Module, PlayableAudio, PodcastSearchResult};
pub use json::substitute_width;
pub use sections::{HomeSection, SectionContent};

pub const API_BASE_URL: &str = "https://api.ardaudiothek.de";
pub const API_HOST: &str = "api.ardaudiothek.de";
pub const GRAPHQL_URL: &str = "https://api.ardaudiothek.de/graphql";
pub const HOMESCREEN_URL: &str = "https://api.ardaudiothek.de/homescreen";
pub const PROGRAM_SET_URL_TEMPLATE: &str = "https://api.ardaudiothek.de/programsets/%s";

/// Display name of the content provider
pub const PROVIDER_NAME: &str = "ARD Audiothek";

/// Build the subscribable feed URL of a program set
pub fn program_set_feed_url(template: &str, program_set_id: &str) -> String {
    template.replacen("%s", program_set_id, 1)
}
