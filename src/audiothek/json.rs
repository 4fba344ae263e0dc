// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defensive accessors over loosely shaped Audiothek JSON.
//!
//! Missing keys, `null` values and values of the wrong type are all
//! treated as absent. Only unparsable documents are errors.

use serde_json::Value;

use crate::error::FetchError;

const WIDTH_PLACEHOLDER: &str = "{width}";
const RATIO_PLACEHOLDER: &str = "{ratio}";

/// Parse a response body into a JSON value
pub(crate) fn parse_json(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Fail when a GraphQL envelope carries a non-empty `errors` array
pub(crate) fn check_graphql_errors(root: &Value) -> Result<(), FetchError> {
    match root.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => Err(FetchError::GraphQl(
            Value::Array(errors.clone()).to_string(),
        )),
        _ => Ok(()),
    }
}

/// Non-empty string value of `key`; numbers are rendered as strings
pub(crate) fn string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
}

/// First of `keys` that holds a non-empty string
pub(crate) fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string(value, key))
}

/// First of `candidates` that yields a value
pub(crate) fn first_present<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Object value of `key`
pub(crate) fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

/// Follow a chain of object keys
pub(crate) fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| object(current, key))
}

/// Array value of `key`
pub(crate) fn array<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Objects of a collection that may be delivered as a single object or an array
pub(crate) fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Object(_)) => value.into_iter().collect(),
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    }
}

/// Non-negative integer value of `key`
pub(crate) fn unsigned(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    })
}

/// Replace the `{width}` placeholder of an image URL
pub fn substitute_width(url: &str, width: u32) -> String {
    url.replace(WIDTH_PLACEHOLDER, &width.to_string())
}

/// Replace both the `{width}` and `{ratio}` placeholders of an image URL
pub(crate) fn substitute_placeholders(url: &str, width: u32, ratio: &str) -> String {
    substitute_width(url, width).replace(RATIO_PLACEHOLDER, ratio)
}

/// Square image URL of a GraphQL `image { url url1X1 }` object at `width`
pub(crate) fn image_url(image: Option<&Value>, width: u32) -> Option<String> {
    image
        .and_then(|image| first_str(image, &["url1X1", "url"]))
        .map(|url| substitute_width(&url, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn errors_array_fails() {
        let root = json!({"errors": [{"message": "boom"}], "data": {}});
        assert!(matches!(
            check_graphql_errors(&root),
            Err(FetchError::GraphQl(_))
        ));
    }

    #[test]
    fn empty_errors_array_is_ok() {
        let root = json!({"errors": [], "data": {}});
        assert!(check_graphql_errors(&root).is_ok());
    }

    #[test]
    fn string_treats_null_and_empty_as_absent() {
        let value = json!({"a": null, "b": "", "c": "x", "d": 42});
        assert_eq!(string(&value, "a"), None);
        assert_eq!(string(&value, "b"), None);
        assert_eq!(string(&value, "c"), Some("x".to_string()));
        assert_eq!(string(&value, "d"), Some("42".to_string()));
        assert_eq!(string(&value, "missing"), None);
    }

    #[test]
    fn first_str_respects_priority() {
        let value = json!({"publicationId": "", "assetId": "asset", "id": "id"});
        assert_eq!(
            first_str(&value, &["publicationId", "assetId", "id"]),
            Some("asset".to_string())
        );
    }

    #[test]
    fn first_present_skips_missing() {
        assert_eq!(first_present([None, Some(2), Some(3)]), Some(2));
        assert_eq!(first_present::<u8>([None, None]), None);
    }

    #[test]
    fn path_stops_at_missing_object() {
        let value = json!({"data": {"search": "not an object"}});
        assert!(path(&value, &["data"]).is_some());
        assert!(path(&value, &["data", "search"]).is_none());
        assert!(path(&value, &["data", "search", "programSets"]).is_none());
    }

    #[test]
    fn one_or_many_accepts_single_object() {
        let single = json!({"title": "a"});
        let many = json!([{"title": "a"}, 5, {"title": "b"}]);
        assert_eq!(one_or_many(Some(&single)).len(), 1);
        assert_eq!(one_or_many(Some(&many)).len(), 2);
        assert!(one_or_many(Some(&json!("x"))).is_empty());
        assert!(one_or_many(None).is_empty());
    }

    #[test]
    fn width_substitution_without_token_is_identity() {
        let url = "https://img.example/static.jpg";
        assert_eq!(substitute_width(url, 400), url);
        assert_eq!(
            substitute_width("https://img.example/{width}.jpg", 400),
            "https://img.example/400.jpg"
        );
    }

    #[test]
    fn placeholders_substitute_ratio() {
        assert_eq!(
            substitute_placeholders("https://img.example/{ratio}/{width}.jpg", 400, "1x1"),
            "https://img.example/1x1/400.jpg"
        );
    }

    #[test]
    fn image_url_prefers_square_variant() {
        let image = json!({"url": "https://img/{width}", "url1X1": "https://img/sq/{width}"});
        assert_eq!(
            image_url(Some(&image), 128),
            Some("https://img/sq/128".to_string())
        );
        let generic = json!({"url": "https://img/{width}"});
        assert_eq!(
            image_url(Some(&generic), 128),
            Some("https://img/128".to_string())
        );
        assert_eq!(image_url(None, 128), None);
    }

    #[test]
    fn unsigned_rejects_negative() {
        let value = json!({"a": 10, "b": -5, "c": "x"});
        assert_eq!(unsigned(&value, "a"), Some(10));
        assert_eq!(unsigned(&value, "b"), None);
        assert_eq!(unsigned(&value, "c"), None);
    }
}
