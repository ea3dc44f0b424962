//! Image format detection by magic-number signatures.
//!
//! The cache filename extension is derived from the *final* buffer (after any
//! re-encoding), never from the source URL's apparent extension, so a
//! transcoded asset is always named for what it actually contains.

/// Known image formats, in signature-match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Avif,
}

/// Leading-byte signatures for each known format.
///
/// WebP files start with the RIFF container magic; AVIF files with an
/// `ftypavif` box at a fixed offset.
const SIGNATURES: &[(ImageKind, &[u8])] = &[
    (ImageKind::Jpeg, &[0xff, 0xd8, 0xff]),
    (ImageKind::Png, &[0x89, 0x50, 0x4e, 0x47]),
    (ImageKind::Gif, &[0x47, 0x49, 0x46, 0x38]),
    (ImageKind::Bmp, &[0x42, 0x4d]),
    (ImageKind::Webp, &[0x52, 0x49, 0x46, 0x46]),
    (
        ImageKind::Avif,
        &[
            0x00, 0x00, 0x00, 0x1c, 0x66, 0x74, 0x79, 0x70, 0x61, 0x76, 0x69, 0x66,
        ],
    ),
];

impl ImageKind {
    /// Match the leading bytes of a buffer against the signature table.
    pub fn sniff(buffer: &[u8]) -> Option<Self> {
        SIGNATURES
            .iter()
            .find(|(_, sig)| buffer.starts_with(sig))
            .map(|(kind, _)| *kind)
    }

    /// File extension used for the cache filename.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }
}
