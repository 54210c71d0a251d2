//! Minimal PNG synthesis and chunk-level validation.
//!
//! PNG data is a fixed 8-byte signature followed by chunks. Each chunk is a
//! 4-byte big-endian payload length, a 4-byte ASCII type, the payload, and a
//! CRC-32 over type and payload.

use crate::checksum::Crc32;
use crate::error::{Error, Result};
use crate::pack::{PackSpec, pack_format, unpack};

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

pub const IHDR: [u8; 4] = *b"IHDR";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";
pub const EXIF: [u8; 4] = *b"eXIf";

/// zlib stream inflating to one filtered scanline: filter 0, then R=255 G=0 B=0.
const RED_PIXEL_IDAT: [u8; 12] = [
    0x78, 0x9C, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00,
];

/// Truecolor, no alpha.
const COLOR_TYPE_RGB: u32 = 2;

/// A single PNG chunk. Length and CRC are derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    kind: [u8; 4],
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(kind: [u8; 4], data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    pub fn kind(&self) -> [u8; 4] {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn crc(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.kind);
        crc.update(&self.data);
        crc.finalize()
    }

    /// Size of the serialized chunk including length, type and CRC fields.
    pub fn encoded_len(&self) -> usize {
        12 + self.data.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.length().to_be_bytes());
        out.extend_from_slice(&self.kind);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.crc().to_be_bytes());
        out
    }
}

/// Build a 1x1 8-bit truecolor PNG holding one red pixel and no metadata.
pub fn build_minimal_png() -> Vec<u8> {
    let (width, height, bit_depth) = (1, 1, 8);
    let (compression, filter, interlace) = (0, 0, 0);
    let ihdr_data = pack_format(
        ">IIBBBBB",
        &[width, height, bit_depth, COLOR_TYPE_RGB, compression, filter, interlace],
    )
    .expect("IHDR format has seven fields");

    let chunks = [
        Chunk::new(IHDR, ihdr_data),
        Chunk::new(IDAT, RED_PIXEL_IDAT.to_vec()),
        Chunk::new(IEND, Vec::new()),
    ];

    let mut png = SIGNATURE.to_vec();
    for chunk in &chunks {
        png.extend_from_slice(&chunk.to_bytes());
    }
    log::debug!("Synthesized minimal PNG ({} bytes)", png.len());
    png
}

/// Split a PNG stream into chunks, checking the signature, chunk framing and
/// every CRC. Reading stops after `IEND`; trailing bytes are ignored.
pub fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk>> {
    if !bytes.starts_with(&SIGNATURE) {
        return Err(Error::MalformedPng("missing PNG signature".into()));
    }

    let word = PackSpec::parse(">I")?;
    let mut chunks = Vec::new();
    let mut pos = SIGNATURE.len();
    loop {
        let header = bytes
            .get(pos..pos + 8)
            .ok_or_else(|| Error::MalformedPng(format!("truncated chunk header at offset {pos}")))?;
        let length = unpack(&word, header)?[0] as usize;
        let kind = [header[4], header[5], header[6], header[7]];

        let data_start = pos + 8;
        let crc_start = data_start + length;
        let stored = bytes.get(crc_start..crc_start + 4).ok_or_else(|| {
            Error::MalformedPng(format!(
                "chunk {} at offset {pos} runs past end of data",
                String::from_utf8_lossy(&kind)
            ))
        })?;
        let stored = unpack(&word, stored)?[0];

        let chunk = Chunk::new(kind, bytes[data_start..crc_start].to_vec());
        if chunk.crc() != stored {
            return Err(Error::MalformedPng(format!(
                "CRC mismatch in {} chunk: stored {stored:#010x}, computed {:#010x}",
                String::from_utf8_lossy(&kind),
                chunk.crc()
            )));
        }

        pos = crc_start + 4;
        let is_end = kind == IEND;
        chunks.push(chunk);
        if is_end {
            return Ok(chunks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc32;

    #[test]
    fn starts_with_signature() {
        let png = build_minimal_png();
        assert_eq!(&png[..8], &SIGNATURE);
    }

    #[test]
    fn chunk_order_and_payloads() {
        let chunks = read_chunks(&build_minimal_png()).unwrap();
        let kinds: Vec<[u8; 4]> = chunks.iter().map(Chunk::kind).collect();
        assert_eq!(kinds, [IHDR, IDAT, IEND]);
        assert_eq!(chunks[0].data(), [0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]);
        assert!(chunks[2].data().is_empty());
    }

    #[test]
    fn chunk_crcs_cover_type_and_data() {
        for chunk in read_chunks(&build_minimal_png()).unwrap() {
            let mut covered = chunk.kind().to_vec();
            covered.extend_from_slice(chunk.data());
            assert_eq!(chunk.crc(), crc32(&covered));
        }
    }

    #[test]
    fn iend_chunk_bytes() {
        let iend = Chunk::new(IEND, Vec::new()).to_bytes();
        assert_eq!(iend, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn total_length_is_signature_plus_chunks() {
        let png = build_minimal_png();
        let chunks = read_chunks(&png).unwrap();
        let expected: usize = SIGNATURE.len() + chunks.iter().map(|c| 4 + 4 + c.data().len() + 4).sum::<usize>();
        assert_eq!(png.len(), expected);
    }

    #[test]
    fn decodes_to_one_red_pixel() {
        let png = build_minimal_png();
        let img = image::load_from_memory_with_format(&png, image::ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0xFF, 0x00, 0x00]);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut png = build_minimal_png();
        png[1] = b'X';
        assert!(matches!(read_chunks(&png), Err(Error::MalformedPng(_))));
    }

    #[test]
    fn rejects_flipped_crc() {
        let mut png = build_minimal_png();
        // last byte of the IHDR CRC
        png[8 + 12 + 13 - 1] ^= 0xFF;
        let err = read_chunks(&png).unwrap_err();
        assert!(err.to_string().contains("CRC mismatch in IHDR"));
    }

    #[test]
    fn rejects_truncated_stream() {
        let png = build_minimal_png();
        assert!(read_chunks(&png[..png.len() - 3]).is_err());
    }
}
