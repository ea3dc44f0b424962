//! Link card markup rendering.
//!
//! `render_card` is a pure function from a resolved metadata record to an
//! HTML fragment. Text fields arrive already entity-encoded from the
//! metadata layer; this module performs no escaping of its own, so encoding
//! happens exactly once.
//!
//! `LinkCard` is the AST node that replaces an eligible paragraph. It keeps
//! the resolved record for inspection and emits the prebuilt markup raw.

use markdown_it::{Node, NodeValue, Renderer};

use crate::metadata::MetadataRecord;

/// Replacement node for an eligible paragraph.
#[derive(Debug)]
pub struct LinkCard {
    /// Resolved metadata the markup was rendered from.
    pub record: MetadataRecord,
    /// Prebuilt card markup, inserted verbatim into HTML output.
    pub html: String,
}

impl LinkCard {
    pub fn new(record: MetadataRecord) -> Self {
        let html = render_card(&record);
        Self { record, html }
    }
}

impl NodeValue for LinkCard {
    fn render(&self, _node: &Node, fmt: &mut dyn Renderer) {
        fmt.cr();
        fmt.text_raw(&self.html);
        fmt.cr();
    }
}

/// Render a resolved record into card markup.
///
/// Omission rules: no favicon element without a favicon source, no
/// description block for an empty description, no image block without a
/// preview image source.
pub fn render_card(record: &MetadataRecord) -> String {
    let favicon_element = if record.favicon_src.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img class="lc-favicon" src="{}" alt="{} favicon" width="16" height="16" decoding="async" loading="lazy">"#,
            record.favicon_src, record.title,
        )
    };

    let description_element = if record.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="lc-description">{}</div>"#,
            record.description
        )
    };

    let image_element = if record.image_src.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="lc-image-container"><img class="lc-image" src="{}" alt="{}" decoding="async" loading="lazy"></div>"#,
            record.image_src, record.image_alt,
        )
    };

    format!(
        r#"<a class="lc-container" href="{url}">
  <div class="lc-info">
    <div class="lc-title">{title}</div>
    {description}
    <div class="lc-url-container">
      {favicon}
      <span class="lc-url">{display_url}</span>
    </div>
  </div>
  {image}
</a>"#,
        url = record.url,
        title = record.title,
        description = description_element,
        favicon = favicon_element,
        display_url = record.display_url,
        image = image_element,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetadataRecord {
        MetadataRecord {
            title: "Example Title".to_string(),
            description: "A description".to_string(),
            favicon_src: "https://www.google.com/s2/favicons?domain=example.com".to_string(),
            image_src: "https://example.com/og.png".to_string(),
            image_alt: "Example Title".to_string(),
            display_url: "example.com".to_string(),
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_full_card() {
        let html = render_card(&record());
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"<div class="lc-title">Example Title</div>"#));
        assert!(html.contains(r#"<div class="lc-description">A description</div>"#));
        assert!(html.contains("lc-favicon"));
        assert!(html.contains(r#"<img class="lc-image" src="https://example.com/og.png""#));
        assert!(html.contains(r#"<span class="lc-url">example.com</span>"#));
    }

    #[test]
    fn test_empty_description_omits_block() {
        let html = render_card(&MetadataRecord {
            description: String::new(),
            ..record()
        });
        assert!(!html.contains("lc-description"));
    }

    #[test]
    fn test_missing_favicon_omits_element() {
        let html = render_card(&MetadataRecord {
            favicon_src: String::new(),
            ..record()
        });
        assert!(!html.contains("lc-favicon"));
    }

    #[test]
    fn test_missing_image_omits_block() {
        let html = render_card(&MetadataRecord {
            image_src: String::new(),
            ..record()
        });
        assert!(!html.contains("lc-image"));
    }

    #[test]
    fn test_no_double_encoding() {
        // Fields arrive pre-encoded; the renderer must not encode again
        let html = render_card(&MetadataRecord {
            title: "Fish &amp; Chips".to_string(),
            ..record()
        });
        assert!(html.contains("Fish &amp; Chips"));
        assert!(!html.contains("&amp;amp;"));
    }
}
