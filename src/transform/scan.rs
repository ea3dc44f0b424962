//! Eligible paragraph detection.
//!
//! A paragraph is eligible when it has exactly one child, that child is a
//! text inline, and the text contains exactly one URL-shaped substring.
//! Paragraphs that gained extra inlines (emphasis, links, code) or carry
//! several URLs are left alone.

use markdown_it::Node;
use markdown_it::parser::inline::Text;
use markdown_it::plugins::cmark::block::paragraph::Paragraph;
use regex::Regex;
use std::sync::LazyLock;

/// URL-shaped substring: an http(s) scheme or a `www.` prefix followed by
/// anything up to the next whitespace.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)[-.\w]+[^ \t\r\n]*").unwrap());

/// A scanned replacement target.
///
/// Targets are keyed by their ordinal position in the depth-first eligible
/// sequence plus a snapshot of the paragraph text, never by a child index:
/// the commit pass re-resolves each target against the current tree and
/// treats any mismatch as a benign no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleParagraph {
    /// The single URL found in the paragraph text.
    pub url: String,
    /// Full text content at scan time, checked again at commit time.
    pub snapshot: String,
}

/// Apply the eligibility predicate to a single node.
pub fn eligible(node: &Node) -> Option<EligibleParagraph> {
    if !node.is::<Paragraph>() || node.children.len() != 1 {
        return None;
    }
    let text = node.children[0].cast::<Text>()?;

    let mut matches = URL_PATTERN.find_iter(&text.content);
    let url = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    Some(EligibleParagraph {
        url: url.as_str().to_string(),
        snapshot: text.content.clone(),
    })
}

/// Collect every eligible paragraph, depth first.
///
/// The traversal order here defines the job keys; the commit pass repeats
/// the identical traversal to re-resolve targets.
pub fn scan(root: &Node) -> Vec<EligibleParagraph> {
    let mut targets = Vec::new();
    walk(root, &mut targets);
    targets
}

fn walk(node: &Node, targets: &mut Vec<EligibleParagraph>) {
    for child in &node.children {
        if let Some(target) = eligible(child) {
            targets.push(target);
        } else {
            walk(child, targets);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_it::MarkdownIt;

    fn parse(src: &str) -> Node {
        let mut md = MarkdownIt::new();
        markdown_it::plugins::cmark::add(&mut md);
        md.parse(src)
    }

    #[test]
    fn test_bare_url_paragraph_is_eligible() {
        let ast = parse("https://example.com");
        let targets = scan(&ast);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "https://example.com");
        assert_eq!(targets[0].snapshot, "https://example.com");
    }

    #[test]
    fn test_url_with_surrounding_text_is_eligible() {
        // One text child, one URL substring
        let targets = scan(&parse("see https://example.com for details"));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "https://example.com");
    }

    #[test]
    fn test_www_url_is_eligible() {
        let targets = scan(&parse("www.example.com"));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "www.example.com");
    }

    #[test]
    fn test_plain_text_is_not_eligible() {
        assert!(scan(&parse("just a sentence")).is_empty());
    }

    #[test]
    fn test_two_urls_in_one_paragraph_not_eligible() {
        assert!(scan(&parse("https://a.example and https://b.example")).is_empty());
    }

    #[test]
    fn test_multiple_children_not_eligible() {
        // Emphasis splits the paragraph into several inline children
        assert!(scan(&parse("**bold** https://example.com")).is_empty());
    }

    #[test]
    fn test_heading_not_eligible() {
        assert!(scan(&parse("# https://example.com")).is_empty());
    }

    #[test]
    fn test_nested_paragraph_in_blockquote_is_eligible() {
        let targets = scan(&parse("> https://example.com"));
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_sibling_paragraphs_scan_in_order() {
        let targets = scan(&parse("https://a.example\n\nhttps://b.example"));
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].url, "https://a.example");
        assert_eq!(targets[1].url, "https://b.example");
    }

    #[test]
    fn test_url_pattern_counts_not_just_finds() {
        // Same URL twice still means two matches
        assert!(scan(&parse("https://a.example https://a.example")).is_empty());
    }
}
