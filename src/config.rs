//! Link card transform configuration.
//!
//! All fields are optional in TOML; missing fields fall back to defaults, so
//! an empty table is a valid configuration.
//!
//! # Example
//!
//! ```toml
//! cache = true
//! shorten_url = true
//! save_directory = "public"
//! output_path = "/linkcard/"
//!
//! [image_reduction]
//! enable = true
//! format = "webp"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Conventional browser-like User-Agent sent with every outbound fetch.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

// ============================================================================
// Main Config
// ============================================================================

/// Options controlling the link card transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkCardConfig {
    /// Materialize favicon and preview images into an on-disk asset cache.
    /// When disabled, card markup references the remote URLs directly.
    pub cache: bool,

    /// Display only the hostname instead of the full URL in the card footer.
    pub shorten_url: bool,

    /// Re-encoding of fetched images before they are cached.
    pub image_reduction: ImageReductionConfig,

    /// Base directory that holds the public asset tree.
    pub save_directory: PathBuf,

    /// Public path prefix under which cached assets are served.
    /// Joined with the cache filename when building card markup.
    pub output_path: String,

    /// Per-request timeout for metadata and asset fetches, in seconds.
    pub timeout_secs: u64,

    /// Override for the outbound User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for LinkCardConfig {
    fn default() -> Self {
        Self {
            cache: false,
            shorten_url: false,
            image_reduction: ImageReductionConfig::default(),
            save_directory: PathBuf::from("public"),
            output_path: "/linkcard/".to_string(),
            timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl LinkCardConfig {
    /// Directory where cached assets are written:
    /// `{save_directory}/{output_path}`.
    pub fn asset_dir(&self) -> PathBuf {
        self.save_directory
            .join(self.output_path.trim_start_matches('/'))
    }

    /// Public src for a cached asset filename.
    pub fn public_src(&self, filename: &str) -> String {
        let prefix = self.output_path.trim_end_matches('/');
        format!("{prefix}/{filename}")
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// User-Agent header value (configured override or browser-like default).
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        Ok(toml::from_str(&raw)?)
    }

    /// Normalize the save directory relative to a root directory.
    /// Absolute paths are kept as-is.
    pub fn normalize(&mut self, root: &Path) {
        if self.save_directory.is_relative() {
            self.save_directory = root.join(&self.save_directory);
        }
    }
}

// ============================================================================
// Image Reduction
// ============================================================================

/// `[image_reduction]` section: re-encode fetched images before caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageReductionConfig {
    /// Re-encode fetched images into `format` before writing to the cache.
    pub enable: bool,

    /// Target encoding (file extension form, e.g. "webp", "png", "jpeg").
    pub format: String,
}

impl Default for ImageReductionConfig {
    fn default() -> Self {
        Self {
            enable: true,
            format: "webp".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
