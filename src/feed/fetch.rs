// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use bytes::Bytes;
use url::Url;

use crate::download::{ensure_audiothek_limit, prepare_url};
use crate::error::FeedError;
use crate::http::{HttpClient, HttpRequest};

use super::audiothek::parse_audiothek_json;
use super::parse::{Podcast, parse_rss};

/// Whether a downloaded feed document is JSON rather than XML
pub fn is_json_document(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

/// Parse a feed document, choosing the parser by its first character
pub fn parse_feed_bytes(
    bytes: &[u8],
    feed_url: Url,
    fallback_title: Option<&str>,
) -> Result<Podcast, FeedError> {
    if is_json_document(bytes) {
        tracing::debug!(%feed_url, "parsing JSON feed");
        parse_audiothek_json(bytes, feed_url, fallback_title)
    } else {
        parse_rss(bytes, feed_url)
    }
}

/// Fetch raw feed bytes from a URL (without parsing)
pub async fn fetch_feed_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Bytes, FeedError> {
    let response = client
        .send(HttpRequest::get(url))
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(FeedError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

/// Read raw feed bytes from a local file (without parsing)
pub fn read_feed_file(path: &Path) -> Result<Vec<u8>, FeedError> {
    std::fs::read(path).map_err(|e| FeedError::FileReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Construct a file:// URL for a local file path
pub fn file_path_to_url(path: &Path) -> Result<Url, FeedError> {
    let absolute = std::path::absolute(path).map_err(|e| FeedError::FileReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    match Url::from_file_path(&absolute) {
        Ok(url) => Ok(url),
        Err(()) => Ok(Url::parse(&format!("file://{}", absolute.display()))?),
    }
}

/// Fetch and parse a podcast feed from a URL
///
/// Audiothek program set URLs are requested with an explicit page size.
pub async fn fetch_feed<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Podcast, FeedError> {
    let url = ensure_audiothek_limit(&prepare_url(url));
    let feed_url = Url::parse(&url)?;
    let bytes = fetch_feed_bytes(client, &url).await?;
    parse_feed_bytes(&bytes, feed_url, None)
}

/// Parse a podcast feed from a local file
///
/// `feed_url` names the feed the file was downloaded from; without one the
/// file's own URL is used.
pub fn parse_feed_file(path: &Path, feed_url: Option<Url>) -> Result<Podcast, FeedError> {
    let bytes = read_feed_file(path)?;
    let feed_url = match feed_url {
        Some(url) => url,
        None => file_path_to_url(path)?,
    };
    parse_feed_bytes(&bytes, feed_url, None)
}

/// Determine if a string is a URL or a file path
pub fn is_url(source: &str) -> bool {
    let source = source.trim_start();
    ["http://", "https://", "feed://", "itpc://", "pcast://"]
        .iter()
        .any(|scheme| source.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MockHttpClient;
    use std::io::Write;

    const RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Xml</title><link>https://example.com</link><description>d</description></channel></rss>"#;
    const JSON: &str = r#"  {"data":{"programSet":{"title":"Json","items":{"nodes":[]}}}}"#;

    #[test]
    fn json_detection_skips_leading_whitespace() {
        assert!(is_json_document(b"\n\t {\"data\":{}}"));
        assert!(!is_json_document(b"<?xml version=\"1.0\"?>"));
        assert!(!is_json_document(b"   "));
    }

    #[test]
    fn dispatches_on_document_type() {
        let url = Url::parse("https://example.com/feed").unwrap();
        let xml = parse_feed_bytes(RSS.as_bytes(), url.clone(), None).unwrap();
        assert_eq!(xml.title, "Xml");

        let json = parse_feed_bytes(JSON.as_bytes(), url, None).unwrap();
        assert_eq!(json.title, "Json");
    }

    #[test]
    fn parse_feed_file_uses_given_feed_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();

        let feed_url = Url::parse("https://api.ardaudiothek.de/programsets/1").unwrap();
        let podcast = parse_feed_file(file.path(), Some(feed_url.clone())).unwrap();
        assert_eq!(podcast.feed_url, feed_url);

        let podcast = parse_feed_file(file.path(), None).unwrap();
        assert_eq!(podcast.feed_url.scheme(), "file");
    }

    #[test]
    fn parse_feed_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_feed_file(&dir.path().join("missing.xml"), None);
        assert!(matches!(result, Err(FeedError::FileReadFailed { .. })));
    }

    #[tokio::test]
    async fn fetch_feed_requests_page_size_for_program_sets() {
        let client = MockHttpClient::new().route("https://api.ardaudiothek.de/programsets/7", 200, JSON);

        let podcast = fetch_feed(&client, "https://api.ardaudiothek.de/programsets/7")
            .await
            .unwrap();
        assert_eq!(podcast.title, "Json");
        assert_eq!(
            client.recorded()[0].url,
            "https://api.ardaudiothek.de/programsets/7?limit=100"
        );
    }

    #[tokio::test]
    async fn fetch_feed_fails_on_http_error() {
        let client = MockHttpClient::new();
        let result = fetch_feed(&client, "https://example.com/feed.xml").await;
        assert!(matches!(result, Err(FeedError::HttpStatus { status: 404, .. })));
    }

    #[test]
    fn is_url_detects_feed_schemes() {
        assert!(is_url("http://example.com/feed.xml"));
        assert!(is_url("https://example.com/feed.xml"));
        assert!(is_url("itpc://example.com/feed.xml"));
        assert!(!is_url("/path/to/feed.xml"));
        assert!(!is_url("feed.xml"));
    }
}
