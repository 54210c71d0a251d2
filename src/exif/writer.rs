use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};

use super::record::ExifRecord;
use super::{
    ContainerKind, FORMAT_ASCII, FORMAT_BYTE, FORMAT_LONG, FORMAT_UNDEFINED,
    TAG_EXIF_IFD_POINTER, TAG_IMAGE_DESCRIPTION, TAG_SOFTWARE, TAG_USER_COMMENT,
    TAG_XP_COMMENT, TAG_XP_KEYWORDS, TAG_XP_SUBJECT, TAG_XP_TITLE,
};
use crate::error::{Error, Result};
use crate::pack::pack_format;
use crate::png::{EXIF, IDAT, IEND};

/// "MM" + magic 42 + IFD0 offset.
const TIFF_HEADER_LEN: u32 = 8;

// UserComment starts with an 8-byte character code
const CHARSET_ASCII: &[u8; 8] = b"ASCII\0\0\0";
const CHARSET_UNICODE: &[u8; 8] = b"UNICODE\0";

// APP1 payload = "Exif\0\0" + TIFF, and the segment length field covers itself
const JPEG_APP1_MAX_TIFF: usize = 0xFFFF - 2 - 6;

// img-parts inserts the EXIF segment at index 3
const JPEG_MIN_SEGMENTS: usize = 3;

/// A raw IFD entry. Payloads of four bytes or less live in the entry's value
/// field, longer ones in the data area that follows the directory.
struct RawIfdEntry {
    tag_id: u16,
    data_format: u16,
    count: u32,
    data: Vec<u8>,
}

impl RawIfdEntry {
    fn ascii(tag_id: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self { tag_id, data_format: FORMAT_ASCII, count: data.len() as u32, data }
    }

    fn bytes(tag_id: u16, value: &[u8]) -> Self {
        Self { tag_id, data_format: FORMAT_BYTE, count: value.len() as u32, data: value.to_vec() }
    }

    fn long(tag_id: u16, value: u32) -> Self {
        Self { tag_id, data_format: FORMAT_LONG, count: 1, data: value.to_be_bytes().to_vec() }
    }

    /// UserComment (UNDEFINED) with its character-code prefix. Plain ASCII is
    /// stored as such, anything else as big-endian UTF-16 to match the "MM"
    /// byte order this writer always uses.
    fn user_comment(tag_id: u16, value: &str) -> Self {
        let mut data = Vec::with_capacity(8 + value.len() * 2);
        if value.is_ascii() {
            data.extend_from_slice(CHARSET_ASCII);
            data.extend_from_slice(value.as_bytes());
        } else {
            data.extend_from_slice(CHARSET_UNICODE);
            data.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
        }
        Self { tag_id, data_format: FORMAT_UNDEFINED, count: data.len() as u32, data }
    }

    fn is_inline(&self) -> bool {
        self.data.len() <= 4
    }
}

/// Out-of-line values start on word boundaries.
fn padded_len(len: usize) -> usize {
    len + (len & 1)
}

/// Bytes one directory occupies: entry count, entries, next-IFD pointer and
/// its out-of-line data.
fn ifd_size(entries: &[RawIfdEntry]) -> usize {
    let data: usize = entries
        .iter()
        .filter(|e| !e.is_inline())
        .map(|e| padded_len(e.data.len()))
        .sum();
    2 + entries.len() * 12 + 4 + data
}

/// Append one directory plus its data area. Offsets are relative to the start
/// of `out`, which must begin with the TIFF header.
fn write_ifd(out: &mut Vec<u8>, entries: &[RawIfdEntry], next_ifd: u32) -> Result<()> {
    let start = out.len();
    out.extend(pack_format(">H", &[entries.len() as u32])?);

    let mut data_offset = start + 2 + entries.len() * 12 + 4;
    let mut data_area = Vec::new();
    for entry in entries {
        let value = if entry.is_inline() {
            let mut inline = [0u8; 4];
            inline[..entry.data.len()].copy_from_slice(&entry.data);
            u32::from_be_bytes(inline)
        } else {
            let offset = data_offset as u32;
            data_area.extend_from_slice(&entry.data);
            if entry.data.len() % 2 != 0 {
                data_area.push(0);
            }
            data_offset += padded_len(entry.data.len());
            offset
        };
        out.extend(pack_format(
            ">HHII",
            &[
                u32::from(entry.tag_id),
                u32::from(entry.data_format),
                entry.count,
                value,
            ],
        )?);
    }

    out.extend(pack_format(">I", &[next_ifd])?);
    out.extend(data_area);
    Ok(())
}

/// Serialize `record` into a big-endian TIFF block ready for [`insert`].
///
/// IFD0 comes first at offset 8 with its entries sorted by tag. An Exif
/// sub-IFD is only written when the record has Exif fields.
pub fn dump(record: &ExifRecord) -> Result<Vec<u8>> {
    let zeroth = &record.zeroth;
    let mut ifd0: Vec<RawIfdEntry> = Vec::new();
    if let Some(ref desc) = zeroth.image_description {
        ifd0.push(RawIfdEntry::ascii(TAG_IMAGE_DESCRIPTION, desc));
    }
    if let Some(ref software) = zeroth.software {
        ifd0.push(RawIfdEntry::ascii(TAG_SOFTWARE, software));
    }
    for (tag_id, value) in [
        (TAG_XP_TITLE, &zeroth.xp_title),
        (TAG_XP_COMMENT, &zeroth.xp_comment),
        (TAG_XP_KEYWORDS, &zeroth.xp_keywords),
        (TAG_XP_SUBJECT, &zeroth.xp_subject),
    ] {
        if let Some(bytes) = value {
            ifd0.push(RawIfdEntry::bytes(tag_id, bytes));
        }
    }

    let mut exif_ifd: Vec<RawIfdEntry> = Vec::new();
    if let Some(ref comment) = record.exif.user_comment {
        exif_ifd.push(RawIfdEntry::user_comment(TAG_USER_COMMENT, comment));
    }

    // Pointer value is patched once IFD0's size is known
    if !exif_ifd.is_empty() {
        ifd0.push(RawIfdEntry::long(TAG_EXIF_IFD_POINTER, 0));
    }
    ifd0.sort_by_key(|e| e.tag_id);

    let exif_offset = TIFF_HEADER_LEN as usize + ifd_size(&ifd0);
    let total = exif_offset + if exif_ifd.is_empty() { 0 } else { ifd_size(&exif_ifd) };
    if total > u32::MAX as usize {
        return Err(Error::MalformedExif(format!("record too large for TIFF offsets ({total} bytes)")));
    }
    if let Some(pointer) = ifd0.iter_mut().find(|e| e.tag_id == TAG_EXIF_IFD_POINTER) {
        pointer.data = (exif_offset as u32).to_be_bytes().to_vec();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"MM");
    out.extend(pack_format(">HI", &[42, TIFF_HEADER_LEN])?);
    write_ifd(&mut out, &ifd0, 0)?;
    if !exif_ifd.is_empty() {
        debug_assert_eq!(out.len(), exif_offset);
        write_ifd(&mut out, &exif_ifd, 0)?;
    }

    log::debug!(
        "Dumped EXIF: {} IFD0 entries, {} Exif entries, {} bytes",
        ifd0.len(),
        exif_ifd.len(),
        out.len()
    );
    Ok(out)
}

/// img-parts appends `eXIf` just before `IEND`; decoders expect it ahead of
/// the image data.
fn move_exif_before_idat(png: &mut Png) {
    let chunks = png.chunks_mut();
    let exif = chunks.iter().position(|c| c.kind() == EXIF);
    let idat = chunks.iter().position(|c| c.kind() == IDAT);
    if let (Some(exif), Some(idat)) = (exif, idat) {
        if exif > idat {
            let chunk = chunks.remove(exif);
            chunks.insert(idat, chunk);
        }
    }
}

/// Splice a TIFF block (as produced by [`dump`]) into a PNG or JPEG stream,
/// replacing any EXIF already present. An empty `exif` strips it instead.
///
/// Fails with [`Error::UnrecognizedFormat`] when `image` is neither PNG nor
/// JPEG, rather than producing a corrupt file.
pub fn insert(exif: &[u8], image: &[u8]) -> Result<Vec<u8>> {
    let kind = ContainerKind::detect(image).ok_or(Error::UnrecognizedFormat)?;
    let exif = if exif.is_empty() {
        None
    } else {
        Some(Bytes::copy_from_slice(exif))
    };
    let bytes = Bytes::copy_from_slice(image);

    let output = match kind {
        ContainerKind::Png => {
            let mut png = Png::from_bytes(bytes)
                .map_err(|e| Error::Container(format!("Failed to parse PNG: {e}")))?;
            if png.chunks().last().map(|c| c.kind()) != Some(IEND) {
                return Err(Error::Container("PNG stream does not end with IEND".into()));
            }
            png.set_exif(exif);
            move_exif_before_idat(&mut png);
            png.encoder().bytes()
        }
        ContainerKind::Jpeg => {
            if exif.as_ref().is_some_and(|e| e.len() > JPEG_APP1_MAX_TIFF) {
                return Err(Error::Container(format!(
                    "EXIF block of {} bytes does not fit a JPEG APP1 segment",
                    exif.as_ref().map_or(0, |e| e.len())
                )));
            }
            let mut jpeg = Jpeg::from_bytes(bytes)
                .map_err(|e| Error::Container(format!("Failed to parse JPEG: {e}")))?;
            if jpeg.segments().len() < JPEG_MIN_SEGMENTS {
                return Err(Error::Container(format!(
                    "JPEG stream has {} segment(s), need at least {JPEG_MIN_SEGMENTS}",
                    jpeg.segments().len()
                )));
            }
            jpeg.set_exif(exif);
            jpeg.encoder().bytes()
        }
    };

    log::debug!(
        "Inserted EXIF into {}: {} -> {} bytes",
        kind.name(),
        image.len(),
        output.len()
    );
    Ok(output.to_vec())
}
