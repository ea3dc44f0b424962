//! Content-addressing key for cached assets.
//!
//! Assets are keyed by the SHA-256 of the percent-decoded source URL string.
//! Two URLs that decode to the same string deliberately collide; two URLs
//! that decode to different strings never share an entry, however similar
//! their encoded forms look.

use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};

use crate::debug;

/// A 256-bit cache key (SHA-256 of the decoded source URL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrlHash([u8; 32]);

impl UrlHash {
    /// Compute the cache key for a source URL string.
    ///
    /// The URL is percent-decoded first so encoding differences do not
    /// produce distinct entries for the same logical resource. URLs whose
    /// escapes are not valid UTF-8 are hashed in their encoded form (the
    /// decode failure is logged, not surfaced).
    pub fn of_url(source_url: &str) -> Self {
        let decoded = match percent_decode_str(source_url).decode_utf8() {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!("cache"; "cannot decode url \"{source_url}\": {err}");
                source_url.into()
            }
        };

        let digest = Sha256::digest(decoded.as_bytes());
        Self(digest.into())
    }

    /// Hex form used as the cache filename stem.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for UrlHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are plenty for log lines
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_url_same_hash() {
        let a = UrlHash::of_url("https://example.com/image.png");
        let b = UrlHash::of_url("https://example.com/image.png");
        assert_eq!(a, b);
    }

    #[test]
    fn test_encoded_and_decoded_forms_collide() {
        // %2D decodes to '-', so these are the same logical URL
        let encoded = UrlHash::of_url("https://example.com/a%2Db.png");
        let plain = UrlHash::of_url("https://example.com/a-b.png");
        assert_eq!(encoded, plain);
    }

    #[test]
    fn test_distinct_decoded_strings_distinct_hashes() {
        // %41 decodes to 'A', %42 decodes to 'B' - similar encoded, distinct decoded
        let a = UrlHash::of_url("https://example.com/%41.png");
        let b = UrlHash::of_url("https://example.com/%42.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_is_64_chars() {
        let hash = UrlHash::of_url("https://example.com");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_display_is_truncated() {
        let hash = UrlHash::of_url("https://example.com");
        assert_eq!(format!("{hash}").len(), 16);
    }
}
