/// Metadata held in IFD0 (the "0th" image directory).
///
/// The `xp_*` fields keep the raw null-terminated UCS-2 bytes exactly as
/// stored in the file; use [`crate::ucs2`] to convert them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZerothIfd {
    pub image_description: Option<String>,
    pub software: Option<String>,
    pub xp_title: Option<Vec<u8>>,
    pub xp_comment: Option<Vec<u8>>,
    pub xp_keywords: Option<Vec<u8>>,
    pub xp_subject: Option<Vec<u8>>,
}

impl ZerothIfd {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Metadata held in the Exif sub-IFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifIfd {
    pub user_comment: Option<String>,
}

impl ExifIfd {
    pub fn is_empty(&self) -> bool {
        self.user_comment.is_none()
    }
}

/// Typed EXIF content, one struct per namespace.
///
/// # Example
///
/// ```rust
/// use comment_roundtrip::exif::ExifRecord;
/// use comment_roundtrip::ucs2;
///
/// let mut record = ExifRecord::default();
/// record.zeroth.image_description = Some("Harbour at dusk".into());
/// record.zeroth.xp_comment = Some(ucs2::encode("Shot from the pier"));
/// record.exif.user_comment = Some("Long exposure".into());
/// assert!(!record.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifRecord {
    pub zeroth: ZerothIfd,
    pub exif: ExifIfd,
}

impl ExifRecord {
    pub fn is_empty(&self) -> bool {
        self.zeroth.is_empty() && self.exif.is_empty()
    }
}
