//! Error type shared by the packer, the PNG builder, the EXIF codec and the
//! round-trip driver.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while building, embedding or verifying metadata.
#[derive(Debug, Error)]
pub enum Error {
    /// A pack format string or its value list is malformed.
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    /// The bytes are neither a PNG nor a JPEG stream.
    #[error("Unrecognized image container")]
    UnrecognizedFormat,

    /// img-parts refused to parse or rebuild the container.
    #[error("Container error: {0}")]
    Container(String),

    /// PNG framing or checksum error.
    #[error("Malformed PNG: {0}")]
    MalformedPng(String),

    /// TIFF header or IFD structure error.
    #[error("Malformed EXIF: {0}")]
    MalformedExif(String),

    /// A field read back differs from the value that was embedded.
    #[error("{format}: {field} mismatch. Expected {expected:?}, got {actual:?}")]
    Mismatch {
        format: &'static str,
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_format_and_field() {
        let err = Error::Mismatch {
            format: "PNG",
            field: "UserComment",
            expected: "a".into(),
            actual: "b".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("PNG: UserComment mismatch"));
        assert!(msg.contains("\"b\""));
    }

    #[test]
    fn io_error_carries_path() {
        let err = Error::io(
            "tests/files/noexif.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("tests/files/noexif.jpg"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
