//! Open Graph extraction from fetched HTML.
//!
//! Best-effort: reads `og:*` meta tags with `<title>` and
//! `meta[name=description]` fallbacks. Entity references in scraped values
//! are decoded here; re-encoding for markup is the record synthesis step's
//! job, so values never go through two encode passes.

use html_escape::decode_html_entities;

/// Raw scrape result. Every field is optional; synthesis fills the gaps.
#[derive(Debug, Default, Clone)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
}

/// Extract Open Graph data from an HTML document.
///
/// Unparseable HTML yields an empty result rather than an error.
pub fn scrape(html: &str) -> OpenGraph {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return OpenGraph::default();
    };
    let parser = dom.parser();

    let mut og = OpenGraph::default();
    let mut fallback_title = None;
    let mut fallback_description = None;

    for handle in dom.query_selector("meta").into_iter().flatten() {
        let Some(tag) = handle.get(parser).and_then(|node| node.as_tag()) else {
            continue;
        };
        let Some(content) = attr(tag, "content") else {
            continue;
        };

        match attr(tag, "property").as_deref() {
            Some("og:title") => og.title = Some(content),
            Some("og:description") => og.description = Some(content),
            Some("og:image") => og.image_url = Some(content),
            Some("og:image:alt") => og.image_alt = Some(content),
            _ => {
                if attr(tag, "name").as_deref() == Some("description") {
                    fallback_description = Some(content);
                }
            }
        }
    }

    if og.title.is_none()
        && let Some(handle) = dom.query_selector("title").and_then(|mut it| it.next())
        && let Some(tag) = handle.get(parser).and_then(|node| node.as_tag())
    {
        let text = decode_html_entities(tag.inner_text(parser).trim()).into_owned();
        if !text.is_empty() {
            fallback_title = Some(text);
        }
    }

    og.title = og.title.or(fallback_title);
    og.description = og.description.or(fallback_description);
    og
}

/// Read a decoded attribute value from a tag.
fn attr(tag: &tl::HTMLTag<'_>, name: &str) -> Option<String> {
    let value = tag.attributes().get(name).flatten()?;
    Some(decode_html_entities(&value.as_utf8_str()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_og_tags() {
        let html = r#"<html><head>
            <meta property="og:title" content="Example Title">
            <meta property="og:description" content="An example page">
            <meta property="og:image" content="https://example.com/og.png">
            <meta property="og:image:alt" content="a picture">
        </head><body></body></html>"#;

        let og = scrape(html);
        assert_eq!(og.title.as_deref(), Some("Example Title"));
        assert_eq!(og.description.as_deref(), Some("An example page"));
        assert_eq!(og.image_url.as_deref(), Some("https://example.com/og.png"));
        assert_eq!(og.image_alt.as_deref(), Some("a picture"));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><title>Page &amp; Title</title></head></html>";
        let og = scrape(html);
        assert_eq!(og.title.as_deref(), Some("Page & Title"));
    }

    #[test]
    fn test_og_title_beats_title_tag() {
        let html = r#"<head>
            <title>Fallback</title>
            <meta property="og:title" content="Preferred">
        </head>"#;
        assert_eq!(scrape(html).title.as_deref(), Some("Preferred"));
    }

    #[test]
    fn test_meta_description_fallback() {
        let html = r#"<head><meta name="description" content="plain description"></head>"#;
        assert_eq!(
            scrape(html).description.as_deref(),
            Some("plain description")
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = r#"<head><meta property="og:title" content="Fish &amp; Chips"></head>"#;
        assert_eq!(scrape(html).title.as_deref(), Some("Fish & Chips"));
    }

    #[test]
    fn test_empty_document() {
        let og = scrape("");
        assert!(og.title.is_none());
        assert!(og.description.is_none());
        assert!(og.image_url.is_none());
    }
}
