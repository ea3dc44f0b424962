//! Best-effort metadata fetching.
//!
//! `fetch_metadata` never fails: transport or parse errors degrade to a
//! record synthesized entirely from the URL itself (hostname title, empty
//! description, no preview image). Callers treat an empty field as "omit
//! that card element", not as an error.
//!
//! Title, description and image alt are entity-encoded here and nowhere
//! else; the card renderer inserts them verbatim.

mod scrape;

pub use scrape::{OpenGraph, scrape};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::fetch::Transport;
use crate::log;

/// Third-party favicon service, keyed by hostname.
const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?domain=";

// ============================================================================
// MetadataRecord
// ============================================================================

/// Resolved, render-ready metadata for one target URL.
///
/// `title`, `description` and `image_alt` are HTML-entity-safe. Empty
/// `favicon_src` / `image_src` / `description` mean the corresponding card
/// element is omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: String,
    pub description: String,
    pub favicon_src: String,
    pub image_src: String,
    pub image_alt: String,
    pub display_url: String,
    /// Canonical target URL, used as the card's href.
    pub url: String,
}

/// Fetch and synthesize metadata for a target URL.
///
/// `parsed` must be the parsed form of `target_url`. The favicon source is
/// always the favicon service URL and `image_src` the remote Open Graph
/// image URL; the caller substitutes cached filenames when caching is on.
pub async fn fetch_metadata(
    target_url: &str,
    parsed: &Url,
    transport: &dyn Transport,
    shorten_url: bool,
) -> MetadataRecord {
    let og = match transport.get_text(parsed).await {
        Ok(html) => Some(scrape(&html)),
        Err(err) => {
            log!("error"; "failed to get the Open Graph data of {target_url}: {err}");
            None
        }
    };

    synthesize(og, target_url, parsed, shorten_url)
}

/// Build a complete record from a (possibly missing or partial) scrape.
pub fn synthesize(
    og: Option<OpenGraph>,
    target_url: &str,
    parsed: &Url,
    shorten_url: bool,
) -> MetadataRecord {
    let og = og.unwrap_or_default();
    let hostname = parsed.host_str().unwrap_or_default();

    let title = og
        .title
        .filter(|t| !t.is_empty())
        .map(|t| encode(&t))
        .unwrap_or_else(|| hostname.to_string());

    let description = og
        .description
        .map(|d| encode(&d))
        .unwrap_or_default();

    let image_src = og.image_url.unwrap_or_default();
    let image_alt = og
        .image_alt
        .filter(|a| !a.is_empty())
        .map(|a| encode(&a))
        .unwrap_or_else(|| title.clone());

    let favicon_src = format!("{FAVICON_SERVICE}{hostname}");

    let display_url = if shorten_url {
        hostname.to_string()
    } else {
        target_url.to_string()
    };
    let display_url = decode_for_display(&display_url);

    MetadataRecord {
        title,
        description,
        favicon_src,
        image_src,
        image_alt,
        display_url,
        url: target_url.to_string(),
    }
}

/// Entity-encode a text field for safe embedding in markup.
///
/// Encoded fields end up in both text and attribute positions, so quotes
/// are encoded along with `&`, `<` and `>`.
fn encode(text: &str) -> String {
    html_escape::encode_safe(text).into_owned()
}

/// Percent-decode a URL for display.
///
/// Escapes that are not valid UTF-8 keep the encoded form verbatim; the
/// failure is logged, never surfaced.
fn decode_for_display(url: &str) -> String {
    match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            log!("error"; "cannot decode url \"{url}\": {err}");
            url.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
