//! Null-terminated UCS-2 little-endian text, the encoding of the Windows
//! `XP*` EXIF tags.

/// Encode `text` as 2-byte little-endian units plus a `00 00` terminator.
///
/// Characters outside the Basic Multilingual Plane are truncated to their
/// low 16 bits; no surrogate pairs are written.
pub fn encode(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .chars()
        .flat_map(|c| (u32::from(c) as u16).to_le_bytes())
        .collect();
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

/// Decode 2-byte little-endian units up to the first zero unit or the end of
/// `bytes`, whichever comes first. A dangling odd byte is ignored.
pub fn decode(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_terminator() {
        assert_eq!(encode("My"), [b'M', 0, b'y', 0, 0, 0]);
        assert_eq!(encode(""), [0, 0]);
    }

    #[test]
    fn encode_bmp_character() {
        // U+00E9, U+4E2D
        assert_eq!(encode("é中"), [0xE9, 0x00, 0x2D, 0x4E, 0, 0]);
    }

    #[test]
    fn encode_truncates_astral_planes() {
        // U+1F600 keeps only 0xF600
        assert_eq!(encode("\u{1F600}"), [0x00, 0xF6, 0, 0]);
    }

    #[test]
    fn decode_stops_at_first_zero_unit() {
        let bytes = [b'A', 0, 0, 0, b'B', 0];
        assert_eq!(decode(&bytes), "A");
    }

    #[test]
    fn decode_without_terminator_reads_everything() {
        let bytes = [b'H', 0, b'i', 0];
        assert_eq!(decode(&bytes), "Hi");
    }

    #[test]
    fn decode_ignores_odd_trailing_byte() {
        assert_eq!(decode(&[b'o', 0, b'k', 0, 0x41]), "ok");
    }

    #[test]
    fn round_trip() {
        for s in ["My XP Comment", "", "Grüße aus Köln", "日本語テキスト", "\u{FFFD}\u{0001}"] {
            assert_eq!(decode(&encode(s)), s);
        }
    }
}
