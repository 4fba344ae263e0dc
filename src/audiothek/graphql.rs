// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalizers for the GraphQL homescreen stage and editorial categories.

use serde_json::{Value, json};

use super::card::{CardTarget, ContentCard, PlayableAudio};
use super::json::{
    array, check_graphql_errors, first_present, image_url, object, parse_json, path, string,
    unsigned,
};
use super::{PROGRAM_SET_URL_TEMPLATE, program_set_feed_url};
use crate::error::FetchError;

/// Maximum number of nodes taken from a section
pub const MAX_SECTION_ITEMS: usize = 8;

/// Image width for hero/stage cards
pub const STAGE_IMAGE_WIDTH: u32 = 600;

/// Image width for regular list thumbnails
pub const LIST_IMAGE_WIDTH: u32 = 400;

/// Title of the editorial section shown as "Heute wichtig"
pub const HEUTE_WICHTIG_TITLE: &str = "Heute wichtig";

pub const HOMESCREEN_STAGE_QUERY: &str = concat!(
    "query HomescreenStage {",
    " homescreen {",
    "  sections {",
    "   __typename ",
    "   ... on Stage {",
    "    nodes {",
    "     __typename title ",
    "     image { url url1X1 } ",
    "     ... on Item { id title synopsis duration publicationStartDateAndTime audios { url downloadUrl } programSet { id title } }",
    "     ... on EventLivestream { id title editorialDescription broadcastStart audios { url downloadUrl } programSet { id title } }",
    "     ... on Extra { id title synopsis duration audios { url downloadUrl } programSet { id title } }",
    "     ... on CoreSection { id title synopsis audios { url downloadUrl } programSet { id title } }",
    "    }",
    "   }",
    "  }",
    " }",
    "}",
);

/// Complete request body for the "Heute wichtig" editorial category
pub const HEUTE_WICHTIG_REQUEST_BODY: &str = r#"{"query":"query { editorialCategory(id: \"51850530\") { sections { title nodes { __typename id title image { url url1X1 } ... on ItemInterface { programSet { id title } } } } } }"}"#;

/// Request body for the homescreen stage query
pub fn stage_request_body() -> String {
    json!({
        "query": HOMESCREEN_STAGE_QUERY,
        "variables": {},
    })
    .to_string()
}

/// Normalize a `data.homescreen.sections` response to the cards of its stage
pub fn parse_stage(bytes: &[u8]) -> Result<Vec<ContentCard>, FetchError> {
    let root = parse_json(bytes)?;
    check_graphql_errors(&root)?;

    let cards = path(&root, &["data", "homescreen"])
        .and_then(|homescreen| array(homescreen, "sections"))
        .and_then(|sections| {
            sections
                .iter()
                .find(|section| section.get("__typename").and_then(Value::as_str) == Some("Stage"))
        })
        .map(|stage| section_cards(stage, STAGE_IMAGE_WIDTH, stage_card))
        .unwrap_or_default();

    Ok(cards)
}

/// Normalize a `data.editorialCategory.sections` response to the cards of
/// the section titled `section_title`
pub fn parse_editorial_section(
    bytes: &[u8],
    section_title: &str,
) -> Result<Vec<ContentCard>, FetchError> {
    let root = parse_json(bytes)?;
    check_graphql_errors(&root)?;

    let cards = path(&root, &["data", "editorialCategory"])
        .and_then(|category| array(category, "sections"))
        .and_then(|sections| {
            sections
                .iter()
                .find(|section| section.get("title").and_then(Value::as_str) == Some(section_title))
        })
        .map(|section| section_cards(section, LIST_IMAGE_WIDTH, editorial_card))
        .unwrap_or_default();

    Ok(cards)
}

fn section_cards(
    section: &Value,
    image_width: u32,
    map_node: fn(&Value, u32) -> Option<ContentCard>,
) -> Vec<ContentCard> {
    array(section, "nodes")
        .unwrap_or_default()
        .iter()
        .take(MAX_SECTION_ITEMS)
        .filter_map(|node| map_node(node, image_width))
        .collect()
}

/// Card for an editorial node; opens the program set
fn editorial_card(node: &Value, image_width: u32) -> Option<ContentCard> {
    let program_set = object(node, "programSet")?;
    let program_set_id = string(program_set, "id")?;

    Some(ContentCard {
        title: string(node, "title").unwrap_or_default(),
        image_url: image_url(object(node, "image"), image_width),
        feed_url: program_set_feed_url(PROGRAM_SET_URL_TEMPLATE, &program_set_id),
        program_set_id: Some(program_set_id),
        target: CardTarget::Browsable,
    })
}

/// Card for a stage node; plays its first audio when it has one
fn stage_card(node: &Value, image_width: u32) -> Option<ContentCard> {
    let program_set = object(node, "programSet")?;
    let program_set_id = string(program_set, "id")?;

    let title = first_present([string(node, "title"), string(program_set, "title")])
        .unwrap_or_default();
    let image = object(node, "image").or_else(|| object(program_set, "image"));

    let target = match first_audio_url(node) {
        Some(audio_url) => CardTarget::Playable(PlayableAudio {
            audio_url,
            description: first_present([
                string(node, "synopsis"),
                string(node, "editorialDescription"),
            ]),
            duration_seconds: unsigned(node, "duration"),
            publish_date: string(node, "publicationStartDateAndTime"),
            item_id: string(node, "id"),
        }),
        None => CardTarget::Browsable,
    };

    Some(ContentCard {
        title,
        image_url: image_url(image, image_width),
        feed_url: program_set_feed_url(PROGRAM_SET_URL_TEMPLATE, &program_set_id),
        program_set_id: Some(program_set_id),
        target,
    })
}

/// Download URL of the first audio, falling back to its streaming URL
pub(crate) fn first_audio_url(node: &Value) -> Option<String> {
    let audio = array(node, "audios")?.first()?;
    first_present([string(audio, "downloadUrl"), string(audio, "url")])
}
