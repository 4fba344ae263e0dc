// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalizers for the HAL+JSON `/homescreen` document.

use serde_json::Value;

use super::API_BASE_URL;
use super::card::{ContentCard, Module};
use super::json::{
    first_present, object, one_or_many, parse_json, path, string, substitute_placeholders,
};
use crate::error::FetchError;

/// Image width for homescreen thumbnails
pub const IMAGE_WIDTH: u32 = 400;

/// Aspect ratio requested for homescreen thumbnails
pub const IMAGE_RATIO: &str = "1x1";

const PAGING_TEMPLATE: &str = "{?order,offset,limit}";
const OFFSET_TEMPLATE: &str = "{?offset,limit}";
const OFFSET_DEFAULTS: &str = "?offset=0&limit=50";
const MALFORMED_HOST: &str = "://api.ardaudiothek.de./";
const FIXED_HOST: &str = "://api.ardaudiothek.de/";

/// Normalize the homescreen into its featured and most-played modules
///
/// Modules without any usable card are left out.
pub fn parse_homescreen(bytes: &[u8]) -> Result<Vec<Module>, FetchError> {
    let root = parse_json(bytes)?;
    let Some(embedded) = object(&root, "_embedded") else {
        return Ok(Vec::new());
    };

    let featured = object(embedded, "mt:featuredProgramSets").and_then(|featured| {
        let program_sets = one_or_many(path(featured, &["_embedded"])?.get("mt:programSets"));
        Some(Module {
            title: module_title(featured),
            cards: program_sets.into_iter().filter_map(program_set_card).collect(),
        })
    });

    let most_played = object(embedded, "mt:mostPlayed").and_then(|most_played| {
        let items = one_or_many(path(most_played, &["_embedded"])?.get("mt:items"));
        Some(Module {
            title: module_title(most_played),
            cards: items.into_iter().filter_map(item_card).collect(),
        })
    });

    Ok([featured, most_played]
        .into_iter()
        .flatten()
        .filter(|module| !module.cards.is_empty())
        .collect())
}

/// Normalize the `mt:items` module of the homescreen into a flat card list
///
/// Items come first, followed by plain program sets.
pub fn parse_live(bytes: &[u8]) -> Result<Vec<ContentCard>, FetchError> {
    let root = parse_json(bytes)?;
    let Some(module) = path(&root, &["_embedded", "mt:items", "_embedded"]) else {
        return Ok(Vec::new());
    };

    let items = one_or_many(module.get("mt:items"))
        .into_iter()
        .filter_map(item_card);
    let program_sets = one_or_many(module.get("mt:programSets"))
        .into_iter()
        .filter_map(program_set_card);

    Ok(items.chain(program_sets).collect())
}

/// Title of a homescreen module: widget title, then plain title
fn module_title(module: &Value) -> String {
    first_present([
        object(module, "widget").and_then(|widget| string(widget, "widget_title")),
        string(module, "title"),
    ])
    .unwrap_or_default()
}

/// Card for an `mt:items` entry, which links its program set as embedded resource
fn item_card(item: &Value) -> Option<ContentCard> {
    let program_set = path(item, &["_embedded", "mt:programSet"])?;
    program_set_card(program_set)
}

/// Card for a program set resource carrying a `self` link
fn program_set_card(program_set: &Value) -> Option<ContentCard> {
    let links = object(program_set, "_links")?;
    let href = object(links, "self").and_then(|link| string(link, "href"))?;

    let image_url = first_present([object(links, "mt:squareImage"), object(links, "mt:image")])
        .and_then(|image| string(image, "href"))
        .map(|href| substitute_placeholders(&href, IMAGE_WIDTH, IMAGE_RATIO));

    Some(ContentCard::browsable(
        string(program_set, "title").unwrap_or_default(),
        image_url,
        feed_url_from_href(&href),
    ))
}

/// Resolve a `self` href into an absolute, normalized feed URL
pub fn feed_url_from_href(href: &str) -> String {
    let href = href.replace(PAGING_TEMPLATE, "");
    if href.starts_with("http") {
        normalize_feed_url(&href)
    } else {
        normalize_feed_url(&format!("{API_BASE_URL}{href}"))
    }
}

/// Repair known artifacts in feed URLs derived from the homescreen
///
/// The API sometimes reports its host with a trailing dot; templated
/// paging parameters are removed or filled with defaults.
pub fn normalize_feed_url(url: &str) -> String {
    url.replace(MALFORMED_HOST, FIXED_HOST)
        .replace(PAGING_TEMPLATE, "")
        .replace(OFFSET_TEMPLATE, OFFSET_DEFAULTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn program_set(title: &str, href: &str) -> Value {
        json!({
            "title": title,
            "_links": {
                "self": {"href": href},
                "mt:image": {"href": "https://img/{ratio}/{width}/generic"},
                "mt:squareImage": {"href": "https://img/{ratio}/{width}/square"}
            }
        })
    }

    #[test]
    fn host_artifact_is_repaired() {
        assert_eq!(
            normalize_feed_url("https://api.ardaudiothek.de./programsets/5"),
            "https://api.ardaudiothek.de/programsets/5"
        );
        assert_eq!(
            normalize_feed_url("https://example.de./programsets/5"),
            "https://example.de./programsets/5"
        );
    }

    #[test]
    fn offset_template_gets_defaults() {
        assert_eq!(
            normalize_feed_url("https://api.ardaudiothek.de/editorialcollections/1{?offset,limit}"),
            "https://api.ardaudiothek.de/editorialcollections/1?offset=0&limit=50"
        );
    }

    #[test]
    fn relative_href_is_prefixed_and_untemplated() {
        assert_eq!(
            feed_url_from_href("/programsets/5{?order,offset,limit}"),
            "https://api.ardaudiothek.de/programsets/5"
        );
        assert_eq!(
            feed_url_from_href("https://api.ardaudiothek.de./programsets/6{?order,offset,limit}"),
            "https://api.ardaudiothek.de/programsets/6"
        );
    }

    #[test]
    fn homescreen_yields_featured_and_most_played_modules() {
        let body = json!({
            "_embedded": {
                "mt:featuredProgramSets": {
                    "title": "Featured",
                    "widget": {"widget_title": "Unsere Empfehlungen"},
                    "_embedded": {"mt:programSets": [
                        program_set("Show A", "/programsets/1{?order,offset,limit}"),
                        {"title": "No links"}
                    ]}
                },
                "mt:mostPlayed": {
                    "title": "Meistgehört",
                    "_embedded": {"mt:items": [
                        {"_embedded": {"mt:programSet": program_set("Show B", "https://api.ardaudiothek.de./programsets/2")}},
                        {"title": "loose item"}
                    ]}
                }
            }
        })
        .to_string();

        let modules = parse_homescreen(body.as_bytes()).unwrap();
        assert_eq!(modules.len(), 2);

        assert_eq!(modules[0].title, "Unsere Empfehlungen");
        assert_eq!(modules[0].cards.len(), 1);
        assert_eq!(
            modules[0].cards[0].feed_url,
            "https://api.ardaudiothek.de/programsets/1"
        );
        assert_eq!(
            modules[0].cards[0].image_url.as_deref(),
            Some("https://img/1x1/400/square")
        );

        assert_eq!(modules[1].title, "Meistgehört");
        assert_eq!(modules[1].cards[0].title, "Show B");
        assert_eq!(
            modules[1].cards[0].feed_url,
            "https://api.ardaudiothek.de/programsets/2"
        );
    }

    #[test]
    fn most_played_accepts_single_object() {
        let body = json!({
            "_embedded": {
                "mt:mostPlayed": {
                    "_embedded": {"mt:items": {"_embedded": {"mt:programSet": program_set("Solo", "/programsets/3")}}}
                }
            }
        })
        .to_string();

        let modules = parse_homescreen(body.as_bytes()).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "");
        assert_eq!(modules[0].cards[0].title, "Solo");
    }

    #[test]
    fn featured_accepts_single_program_set_object() {
        let body = json!({
            "_embedded": {
                "mt:featuredProgramSets": {
                    "title": "Featured",
                    "_embedded": {"mt:programSets": program_set("Solo", "/programsets/4")}
                }
            }
        })
        .to_string();

        let modules = parse_homescreen(body.as_bytes()).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Featured");
        assert_eq!(modules[0].cards.len(), 1);
        assert_eq!(
            modules[0].cards[0].feed_url,
            "https://api.ardaudiothek.de/programsets/4"
        );
    }

    #[test]
    fn live_accepts_single_program_set_object() {
        let body = json!({
            "_embedded": {
                "mt:items": {
                    "_embedded": {"mt:programSets": program_set("Live Show", "/programsets/7")}
                }
            }
        })
        .to_string();

        let cards = parse_live(body.as_bytes()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Live Show");
    }

    #[test]
    fn empty_modules_are_omitted() {
        let body = json!({
            "_embedded": {
                "mt:featuredProgramSets": {"_embedded": {"mt:programSets": []}},
                "mt:mostPlayed": {"_embedded": {"mt:items": []}}
            }
        })
        .to_string();
        assert!(parse_homescreen(body.as_bytes()).unwrap().is_empty());
        assert!(parse_homescreen(b"{}").unwrap().is_empty());
    }

    #[test]
    fn generic_image_used_without_square() {
        let set = json!({
            "title": "Show",
            "_links": {
                "self": {"href": "/programsets/9"},
                "mt:image": {"href": "https://img/{ratio}/{width}"}
            }
        });
        let card = program_set_card(&set).unwrap();
        assert_eq!(card.image_url.as_deref(), Some("https://img/1x1/400"));
    }

    #[test]
    fn live_lists_items_then_program_sets() {
        let body = json!({
            "_embedded": {
                "mt:items": {
                    "_embedded": {
                        "mt:items": {"_embedded": {"mt:programSet": program_set("Item Show", "/programsets/1")}},
                        "mt:programSets": [program_set("Set Show", "/programsets/2")]
                    }
                }
            }
        })
        .to_string();

        let cards = parse_live(body.as_bytes()).unwrap();
        let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Item Show", "Set Show"]);
    }

    #[test]
    fn malformed_document_fails() {
        assert!(matches!(
            parse_homescreen(b"{\"_embedded\":"),
            Err(FetchError::MalformedJson(_))
        ));
    }
}
