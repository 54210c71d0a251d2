use std::io::Cursor;

use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use nom_exif::{EntryValue, ExifIter, MediaParser, MediaSource};

use super::record::ExifRecord;
use super::{
    ContainerKind, TAG_IMAGE_DESCRIPTION, TAG_SOFTWARE, TAG_USER_COMMENT, TAG_XP_COMMENT,
    TAG_XP_KEYWORDS, TAG_XP_SUBJECT, TAG_XP_TITLE,
};
use crate::error::{Error, Result};
use crate::pack::Endian;
use crate::ucs2;

/// Tags with a field in [`ExifRecord`]. An unreadable value for one of these
/// fails the parse; any other broken entry is skipped.
const RECORD_TAGS: [u16; 7] = [
    TAG_IMAGE_DESCRIPTION,
    TAG_SOFTWARE,
    TAG_XP_TITLE,
    TAG_XP_COMMENT,
    TAG_XP_KEYWORDS,
    TAG_XP_SUBJECT,
    TAG_USER_COMMENT,
];

fn byte_order(data: &[u8]) -> Result<Endian> {
    match data.get(0..2) {
        Some(b"MM") => Ok(Endian::Big),
        Some(b"II") => Ok(Endian::Little),
        _ => Err(Error::MalformedExif("invalid TIFF byte order".into())),
    }
}

/// Text up to the first NUL.
fn until_nul(value: &[u8]) -> &[u8] {
    let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
    &value[..end]
}

/// Raw bytes of a BYTE or UNDEFINED value.
fn entry_bytes(value: &EntryValue) -> Option<Vec<u8>> {
    match value {
        EntryValue::U8Array(bytes) | EntryValue::Undefined(bytes) => Some(bytes.clone()),
        EntryValue::U8(b) => Some(vec![*b]),
        _ => None,
    }
}

fn entry_text(value: &EntryValue) -> String {
    match value {
        EntryValue::Text(s) => s.split('\0').next().unwrap_or_default().to_string(),
        other => match entry_bytes(other) {
            Some(bytes) => String::from_utf8_lossy(until_nul(&bytes)).into_owned(),
            None => other.to_string(),
        },
    }
}

/// XP* tags carry UCS-2 bytes; a value already decoded to text is re-encoded.
fn entry_ucs2(value: &EntryValue) -> Vec<u8> {
    match value {
        EntryValue::Text(s) => ucs2::encode(s),
        other => entry_bytes(other).unwrap_or_else(|| ucs2::encode(&other.to_string())),
    }
}

/// UserComment: 8-byte character code, then the text. `UNICODE` text is
/// UTF-16 in the block's byte order.
fn user_comment(value: &EntryValue, endian: Endian) -> String {
    let Some(raw) = entry_bytes(value) else {
        return entry_text(value);
    };
    let (charset, text) = raw.split_at(raw.len().min(8));
    if charset.starts_with(b"UNICODE") {
        let units: Vec<u16> = text
            .chunks_exact(2)
            .map(|p| match endian {
                Endian::Big => u16::from_be_bytes([p[0], p[1]]),
                Endian::Little => u16::from_le_bytes([p[0], p[1]]),
            })
            .take_while(|&u| u != 0)
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        // ASCII, undefined and JIS all fall back to a lossy byte read
        String::from_utf8_lossy(until_nul(text)).into_owned()
    }
}

/// Parse a raw TIFF block (no `Exif\0\0` prefix) into an [`ExifRecord`].
///
/// Only the closed tag set of [`ExifRecord`] is kept. Entries of the
/// thumbnail IFD and tags outside that set are ignored, even when broken.
pub fn parse_tiff(data: &[u8]) -> Result<ExifRecord> {
    let endian = byte_order(data)?;
    let ms = MediaSource::seekable(Cursor::new(data))
        .map_err(|e| Error::MalformedExif(format!("unreadable TIFF block: {e}")))?;
    let mut parser = MediaParser::new();
    let iter: ExifIter = parser
        .parse(ms)
        .map_err(|e| Error::MalformedExif(format!("unreadable TIFF block: {e}")))?;

    let mut record = ExifRecord::default();
    for entry in iter {
        if entry.ifd_index() != 0 {
            continue;
        }
        let tag = entry.tag_code();
        let value = match entry.get_result() {
            Ok(value) => value,
            Err(e) if RECORD_TAGS.contains(&tag) => {
                return Err(Error::MalformedExif(format!("tag {tag:#06x} is unreadable: {e:?}")));
            }
            Err(e) => {
                log::debug!("Skipping unreadable tag {tag:#06x}: {e:?}");
                continue;
            }
        };

        let zeroth = &mut record.zeroth;
        match tag {
            TAG_IMAGE_DESCRIPTION => zeroth.image_description = Some(entry_text(value)),
            TAG_SOFTWARE => zeroth.software = Some(entry_text(value)),
            TAG_XP_TITLE => zeroth.xp_title = Some(entry_ucs2(value)),
            TAG_XP_COMMENT => zeroth.xp_comment = Some(entry_ucs2(value)),
            TAG_XP_KEYWORDS => zeroth.xp_keywords = Some(entry_ucs2(value)),
            TAG_XP_SUBJECT => zeroth.xp_subject = Some(entry_ucs2(value)),
            TAG_USER_COMMENT => record.exif.user_comment = Some(user_comment(value, endian)),
            other => log::debug!("Ignoring tag {other:#06x}: {value}"),
        }
    }

    Ok(record)
}

/// Pull the raw TIFF block out of a PNG or JPEG, `None` if there is none.
fn extract(image: &[u8]) -> Result<Option<Bytes>> {
    let kind = ContainerKind::detect(image).ok_or(Error::UnrecognizedFormat)?;
    let bytes = Bytes::copy_from_slice(image);
    let exif = match kind {
        ContainerKind::Png => Png::from_bytes(bytes)
            .map_err(|e| Error::Container(format!("Failed to parse PNG: {e}")))?
            .exif(),
        ContainerKind::Jpeg => Jpeg::from_bytes(bytes)
            .map_err(|e| Error::Container(format!("Failed to parse JPEG: {e}")))?
            .exif(),
    };
    Ok(exif)
}

/// Read the EXIF metadata embedded in a PNG or JPEG stream.
///
/// Returns an empty [`ExifRecord`] when the image carries no EXIF block.
pub fn load(image: &[u8]) -> Result<ExifRecord> {
    match extract(image)? {
        Some(tiff) if !tiff.is_empty() => parse_tiff(&tiff),
        _ => {
            log::debug!("No EXIF block found");
            Ok(ExifRecord::default())
        }
    }
}
