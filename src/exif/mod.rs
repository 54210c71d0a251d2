//! EXIF metadata codec for PNG and JPEG containers.
//!
//! This module provides the three operations the round-trip driver needs:
//!
//! - [`dump`] — Serialize an [`ExifRecord`] to a big-endian TIFF block
//! - [`insert`] — Splice a TIFF block into a PNG (`eXIf` chunk) or JPEG (`APP1` segment)
//! - [`load`] — Extract and parse the TIFF block back into an [`ExifRecord`]
//!
//! Container surgery goes through `img-parts`. The IFD layout is written here
//! and read back with `nom-exif`.

mod reader;
mod record;
mod writer;

pub use reader::{load, parse_tiff};
pub use record::{ExifIfd, ExifRecord, ZerothIfd};
pub use writer::{dump, insert};

use serde::Serialize;

use crate::png;

// IFD0 tag IDs
pub const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
pub const TAG_SOFTWARE: u16 = 0x0131;
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_XP_TITLE: u16 = 0x9C9B;
pub const TAG_XP_COMMENT: u16 = 0x9C9C;
pub const TAG_XP_KEYWORDS: u16 = 0x9C9E;
pub const TAG_XP_SUBJECT: u16 = 0x9C9F;

// ExifIFD tag IDs
pub const TAG_USER_COMMENT: u16 = 0x9286;

// TIFF field types
const FORMAT_BYTE: u16 = 1;
const FORMAT_ASCII: u16 = 2;
const FORMAT_LONG: u16 = 4;
const FORMAT_UNDEFINED: u16 = 7;

/// Image container formats the codec can embed EXIF into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    Png,
    Jpeg,
}

impl ContainerKind {
    /// Sniff the container from its leading magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&png::SIGNATURE) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Upper-case label used in console and error output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }

    /// Conventional file extension for artifacts of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_png() {
        assert_eq!(ContainerKind::detect(&png::build_minimal_png()), Some(ContainerKind::Png));
    }

    #[test]
    fn detect_jpeg() {
        assert_eq!(ContainerKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ContainerKind::Jpeg));
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(ContainerKind::detect(b"GIF89a"), None);
        assert_eq!(ContainerKind::detect(&[]), None);
        assert_eq!(ContainerKind::detect(&[0xFF]), None);
    }

    #[test]
    fn labels() {
        assert_eq!(ContainerKind::Png.name(), "PNG");
        assert_eq!(ContainerKind::Jpeg.name(), "JPEG");
        assert_eq!(ContainerKind::Jpeg.extension(), "jpg");
    }
}
