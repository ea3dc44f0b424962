//! Content-addressable asset cache.
//!
//! Fetched favicon and preview images are stored once under
//! `{save_directory}/{output_path}/{hash}.{ext}` and shared by every card
//! that references the same source URL. There is no expiry: entries are
//! immutable after creation and freshness is out of scope.

mod hash;
mod sniff;
mod store;

pub use hash::UrlHash;
pub use sniff::ImageKind;
pub use store::{AssetCache, CacheError};
