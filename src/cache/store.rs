//! Content-addressable asset store.
//!
//! `materialize` turns a remote image URL into a cached local filename:
//!
//! 1. hash the decoded source URL (the dedup key)
//! 2. return any existing `{hash}.*` file without fetching
//! 3. otherwise fetch, optionally re-encode, sniff the true format,
//!    and write `{hash}.{ext}`
//!
//! Racing jobs on the same not-yet-cached hash are serialized through an
//! in-flight registry scoped to this cache instance, so the loser of the
//! race sees the winner's file and performs no second fetch. The registry
//! does not extend across processes; concurrent *processes* may still both
//! fetch, with last-writer-wins on a byte-valid file.

use dashmap::DashMap;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use super::hash::UrlHash;
use super::sniff::ImageKind;
use crate::config::ImageReductionConfig;
use crate::fetch::{FetchError, Transport};
use crate::{debug, log};

// ============================================================================
// Errors
// ============================================================================

/// Failures while materializing one asset.
///
/// Every variant is non-fatal to the job: the caller renders the card
/// without the affected image.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to parse url \"{url}\": {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unsupported target encoding \"{0}\"")]
    UnsupportedTarget(String),

    #[error("failed to convert image to {format}: {source}")]
    Convert {
        format: String,
        source: image::ImageError,
    },

    #[error("unknown image format")]
    UnknownFormat,

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ============================================================================
// AssetCache
// ============================================================================

/// On-disk, content-addressable store for fetched images.
///
/// Entries are written once and never expired or deleted by this system.
pub struct AssetCache {
    dir: PathBuf,
    reduction: ImageReductionConfig,
    transport: Arc<dyn Transport>,
    /// Per-hash locks serializing concurrent materializations of the same
    /// not-yet-cached asset within this cache instance.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl AssetCache {
    /// Create a cache rooted at `dir`.
    pub fn new(dir: PathBuf, reduction: ImageReductionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            dir,
            reduction,
            transport,
            in_flight: DashMap::new(),
        }
    }

    /// Materialize a remote image into the cache.
    ///
    /// Returns the cache filename (`{hash}.{ext}`), or `None` when anything
    /// goes wrong; failures are logged, never propagated. `None` means the
    /// caller renders without this image.
    pub async fn materialize(&self, source_url: &str) -> Option<String> {
        match self.try_materialize(source_url).await {
            Ok(filename) => Some(filename),
            Err(err) => {
                log!("error"; "failed to cache image from {source_url}: {err}");
                None
            }
        }
    }

    async fn try_materialize(&self, source_url: &str) -> Result<String, CacheError> {
        let parsed = Url::parse(source_url).map_err(|source| CacheError::Url {
            url: source_url.to_string(),
            source,
        })?;

        let hash = UrlHash::of_url(parsed.as_str());
        let stem = hash.to_hex();

        // Serialize racing jobs on the same hash. The clone must complete
        // before the await so no dashmap guard is held across it.
        let lock = self
            .in_flight
            .entry(stem.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Cache hit: any existing file with this hash prefix wins, no fetch.
        if let Some(existing) = self.find_with_prefix(&stem).await? {
            debug!("cache"; "hit {hash} -> {existing}");
            return Ok(existing);
        }

        // create_dir_all tolerates directory-creation races by design.
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut bytes = self.transport.get_bytes(&parsed).await?;

        if self.reduction.enable {
            bytes = reencode(bytes, &self.reduction.format).await?;
        }

        // The extension comes from the final buffer, never from the URL.
        let kind = ImageKind::sniff(&bytes).ok_or(CacheError::UnknownFormat)?;
        let filename = format!("{stem}.{}", kind.extension());

        tokio::fs::write(self.dir.join(&filename), &bytes).await?;
        debug!("cache"; "stored {hash} -> {filename}");

        Ok(filename)
    }

    /// Find an existing cache file whose name starts with `prefix`.
    ///
    /// A missing cache directory is an ordinary miss, not an error.
    async fn find_with_prefix(&self, prefix: &str) -> Result<Option<String>, CacheError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(name) = name.to_str()
                && name.starts_with(prefix)
            {
                return Ok(Some(name.to_string()));
            }
        }
        Ok(None)
    }
}

/// Re-encode an image buffer into the target format on a blocking thread.
async fn reencode(bytes: Vec<u8>, format: &str) -> Result<Vec<u8>, CacheError> {
    let target = ImageFormat::from_extension(format)
        .ok_or_else(|| CacheError::UnsupportedTarget(format.to_string()))?;
    let format = format.to_string();

    tokio::task::spawn_blocking(move || {
        let convert_err = |source| CacheError::Convert {
            format: format.clone(),
            source,
        };

        let img = image::load_from_memory(&bytes).map_err(convert_err)?;
        // JPEG cannot encode an alpha channel
        let img = if target == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img
        };

        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), target)
            .map_err(convert_err)?;
        Ok(out)
    })
    .await?
}

// ============================================================================
// Tests
// ============================================================================
