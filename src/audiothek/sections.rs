// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use super::card::{ContentCard, Module};
use super::graphql::{
    HEUTE_WICHTIG_REQUEST_BODY, HEUTE_WICHTIG_TITLE, MAX_SECTION_ITEMS, parse_editorial_section,
    parse_stage, stage_request_body,
};
use super::hal::{parse_homescreen, parse_live};
use super::{GRAPHQL_URL, HOMESCREEN_URL};
use crate::error::FetchError;
use crate::http::{HttpClient, HttpRequest};

/// Number of placeholder modules shown while the modules section loads
const PLACEHOLDER_MODULES: usize = 2;

/// A home screen section backed by the Audiothek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeSection {
    /// Featured and most-played modules from the HAL homescreen
    Modules,
    /// The homescreen stage carousel
    Hot,
    /// The "Heute wichtig" editorial section
    HeuteWichtig,
    /// Items module of the HAL homescreen
    Live,
}

/// Normalized content of a section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Cards(Vec<ContentCard>),
    Modules(Vec<Module>),
}

impl SectionContent {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::Cards(cards) => cards.is_empty(),
            SectionContent::Modules(modules) => modules.is_empty(),
        }
    }
}

impl HomeSection {
    pub const ALL: [HomeSection; 4] = [
        HomeSection::Hot,
        HomeSection::HeuteWichtig,
        HomeSection::Modules,
        HomeSection::Live,
    ];

    /// Identifier used in the stored section order
    pub fn tag(self) -> &'static str {
        match self {
            HomeSection::Modules => "AudiothekSection",
            HomeSection::Hot => "AudiothekHotSection",
            HomeSection::HeuteWichtig => "AudiothekHeuteWichtigSection",
            HomeSection::Live => "AudiothekLiveSection",
        }
    }

    /// Short key used when naming ephemeral feeds
    pub fn key(self) -> &'static str {
        match self {
            HomeSection::Modules => "modules",
            HomeSection::Hot => "hot",
            HomeSection::HeuteWichtig => "heute-wichtig",
            HomeSection::Live => "live",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.tag() == tag)
    }

    /// Placeholder geometry as (modules, cards per module)
    ///
    /// Card sections report a single implicit module.
    pub fn placeholders(self) -> (usize, usize) {
        match self {
            HomeSection::Modules => (PLACEHOLDER_MODULES, MAX_SECTION_ITEMS),
            _ => (1, MAX_SECTION_ITEMS),
        }
    }

    fn request(self) -> HttpRequest {
        match self {
            HomeSection::Modules | HomeSection::Live => HttpRequest::get(HOMESCREEN_URL),
            HomeSection::Hot => HttpRequest::post_json(GRAPHQL_URL, stage_request_body()),
            HomeSection::HeuteWichtig => {
                HttpRequest::post_json(GRAPHQL_URL, HEUTE_WICHTIG_REQUEST_BODY)
            }
        }
    }

    /// Normalize a response body of this section
    pub fn normalize(self, body: &[u8]) -> Result<SectionContent, FetchError> {
        match self {
            HomeSection::Modules => parse_homescreen(body).map(SectionContent::Modules),
            HomeSection::Hot => parse_stage(body).map(SectionContent::Cards),
            HomeSection::HeuteWichtig => {
                parse_editorial_section(body, HEUTE_WICHTIG_TITLE).map(SectionContent::Cards)
            }
            HomeSection::Live => parse_live(body).map(SectionContent::Cards),
        }
    }

    /// Fetch and normalize the content of this section
    pub async fn fetch<C: HttpClient + ?Sized>(
        self,
        client: &C,
    ) -> Result<SectionContent, FetchError> {
        let body = fetch_body(client, self.request()).await?;
        self.normalize(&body)
    }
}

/// Send a one-shot request, treating any non-2xx status as failure
async fn fetch_body<C: HttpClient + ?Sized>(
    client: &C,
    request: HttpRequest,
) -> Result<Bytes, FetchError> {
    let url = request.url.clone();
    let response = client
        .send(request)
        .await
        .map_err(|e| FetchError::RequestFailed {
            url: url.clone(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            url,
            status: response.status,
        });
    }
    Ok(response.body)
}

impl fmt::Display for HomeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for HomeSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.key() == s || section.tag() == s)
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::http::testing::MockHttpClient;

    const STAGE_BODY: &str = r#"{"data":{"homescreen":{"sections":[{"__typename":"Stage","nodes":[{"title":"A","programSet":{"id":"1"},"audios":[{"url":"https://a.mp3"}]}]}]}}}"#;

    #[tokio::test]
    async fn hot_posts_stage_query() {
        let client = MockHttpClient::new().route(GRAPHQL_URL, 200, STAGE_BODY);

        let content = HomeSection::Hot.fetch(&client).await.unwrap();
        match content {
            SectionContent::Cards(cards) => {
                assert_eq!(cards.len(), 1);
                assert!(cards[0].playable().is_some());
            }
            other => panic!("Expected cards, got {other:?}"),
        }

        let requests = client.recorded();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body.as_deref(), Some(stage_request_body().as_str()));
    }

    #[tokio::test]
    async fn heute_wichtig_sends_fixed_body() {
        let client = MockHttpClient::new().route(GRAPHQL_URL, 200, r#"{"data":{}}"#);

        let content = HomeSection::HeuteWichtig.fetch(&client).await.unwrap();
        assert!(content.is_empty());
        assert_eq!(
            client.recorded()[0].body.as_deref(),
            Some(HEUTE_WICHTIG_REQUEST_BODY)
        );
    }

    #[tokio::test]
    async fn modules_get_homescreen() {
        let client = MockHttpClient::new().route(HOMESCREEN_URL, 200, "{}");

        let content = HomeSection::Modules.fetch(&client).await.unwrap();
        assert_eq!(content, SectionContent::Modules(vec![]));
        assert_eq!(client.recorded()[0].method, Method::Get);
    }

    #[tokio::test]
    async fn non_success_status_is_failure() {
        let client = MockHttpClient::new().route(HOMESCREEN_URL, 500, "{}");
        let result = HomeSection::Live.fetch(&client).await;
        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 500, .. })
        ));
    }

    #[test]
    fn sections_parse_from_key_and_tag() {
        assert_eq!("hot".parse::<HomeSection>().unwrap(), HomeSection::Hot);
        assert_eq!(
            "AudiothekLiveSection".parse::<HomeSection>().unwrap(),
            HomeSection::Live
        );
        assert!("queue".parse::<HomeSection>().is_err());
        assert_eq!(
            HomeSection::from_tag("AudiothekSection"),
            Some(HomeSection::Modules)
        );
    }

    #[test]
    fn modules_section_shows_two_placeholder_rows() {
        assert_eq!(HomeSection::Modules.placeholders(), (2, 8));
        assert_eq!(HomeSection::Hot.placeholders(), (1, 8));
    }
}
