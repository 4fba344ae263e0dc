// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Program set search against the Audiothek GraphQL endpoint.

use serde_json::{Value, json};

use super::card::PodcastSearchResult;
use super::json::{check_graphql_errors, first_str, image_url, object, parse_json, path, string};
use super::{GRAPHQL_URL, PROGRAM_SET_URL_TEMPLATE, PROVIDER_NAME, program_set_feed_url};
use crate::error::FetchError;
use crate::http::{HttpClient, HttpRequest};

/// Image width for search result thumbnails
pub const IMAGE_WIDTH: u32 = 128;

/// Number of results requested per search
pub const SEARCH_LIMIT: u32 = 24;

pub const PROGRAM_SET_SEARCH_QUERY: &str = concat!(
    "query SearchProgramSets($query:String!, $offset:Int!, $limit:Int!) {",
    " search(query:$query, offset:$offset, limit:$limit, type:ProgramSets) {",
    "  programSets {",
    "   nodes {",
    "    id rowId title synopsis sharingUrl ",
    "    image { url url1X1 } ",
    "    publicationService { organizationName }",
    "   }",
    "  }",
    " }",
    "}",
);

/// Normalize a `data.search.programSets.nodes` response
///
/// `feed_url_template` receives the program set identifier in place of `%s`.
pub fn parse_program_sets(root: &Value, feed_url_template: &str) -> Vec<PodcastSearchResult> {
    path(root, &["data", "search", "programSets"])
        .and_then(|program_sets| program_sets.get("nodes"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|node| search_result(node, feed_url_template))
        .collect()
}

fn search_result(node: &Value, feed_url_template: &str) -> Option<PodcastSearchResult> {
    if !node.is_object() {
        return None;
    }
    let program_set_id = first_str(node, &["rowId", "id"])?;

    Some(PodcastSearchResult {
        title: string(node, "title").unwrap_or_default(),
        image_url: image_url(object(node, "image"), IMAGE_WIDTH),
        feed_url: program_set_feed_url(feed_url_template, &program_set_id),
        author: object(node, "publicationService")
            .and_then(|service| string(service, "organizationName")),
    })
}

/// Request body for a program set search
pub fn search_request_body(query: &str) -> String {
    json!({
        "query": PROGRAM_SET_SEARCH_QUERY,
        "variables": {
            "query": query,
            "offset": 0,
            "limit": SEARCH_LIMIT,
        },
    })
    .to_string()
}

/// Podcast search provider backed by the Audiothek
pub struct AudiothekSearcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> AudiothekSearcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Search program sets matching `query`
    pub async fn search(&self, query: &str) -> Result<Vec<PodcastSearchResult>, FetchError> {
        let request = HttpRequest::post_json(GRAPHQL_URL, search_request_body(query));
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: GRAPHQL_URL.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                url: GRAPHQL_URL.to_string(),
                status: response.status,
            });
        }

        let root = parse_json(&response.body)?;
        check_graphql_errors(&root)?;

        let results = parse_program_sets(&root, PROGRAM_SET_URL_TEMPLATE);
        tracing::debug!(query, count = results.len(), "search finished");
        Ok(results)
    }

    /// Search results already point at feeds
    pub async fn lookup_url(&self, result_url: &str) -> Result<String, FetchError> {
        Ok(result_url.to_string())
    }

    pub fn url_needs_lookup(&self, _result_url: &str) -> bool {
        false
    }

    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
