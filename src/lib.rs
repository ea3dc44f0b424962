//! Replace bare-URL paragraphs in a markdown AST with rich link cards.
//!
//! A paragraph whose only content is a single URL becomes an `<a>` card
//! carrying the page title, description, favicon and preview image pulled
//! from the target's Open Graph metadata. Everything runs best-effort: a
//! paragraph whose metadata cannot be resolved simply stays a paragraph.
//!
//! With `cache` enabled, favicon and preview images are downloaded once,
//! optionally re-encoded (webp by default), and stored under a
//! content-addressed filename so repeated builds and repeated URLs never
//! re-fetch.
//!
//! # Example
//!
//! ```no_run
//! use linkcard::{LinkCardConfig, transform};
//! use markdown_it::MarkdownIt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut md = MarkdownIt::new();
//! markdown_it::plugins::cmark::add(&mut md);
//! let mut ast = md.parse("https://example.com\n");
//!
//! transform(&mut ast, &LinkCardConfig::default()).await;
//! let html = ast.render();
//! # }
//! ```

pub mod cache;
pub mod card;
pub mod config;
pub mod fetch;
pub mod logger;
pub mod metadata;
pub mod transform;

pub use cache::{AssetCache, CacheError, ImageKind, UrlHash};
pub use card::{LinkCard, render_card};
pub use config::{ImageReductionConfig, LinkCardConfig};
pub use fetch::{FetchError, HttpTransport, Transport};
pub use metadata::MetadataRecord;
pub use transform::{transform, transform_with_transport};
