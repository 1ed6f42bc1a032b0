//! Decoding for the tool's output file, whose encoding depends on the tool
//! build and Windows locale settings.

use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};

/// Decodes report bytes, trying encodings in a fixed preference order:
/// UTF-8 with BOM, UTF-16 (either BOM), strict UTF-8, then the legacy
/// single-byte code page as a never-failing last resort.
pub fn decode_report_bytes(data: &[u8]) -> String {
    if let Some(stripped) = data.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(stripped).into_owned();
    }
    if data.starts_with(&[0xFF, 0xFE]) {
        let (text, _, _) = UTF_16LE.decode(&data[2..]);
        return text.into_owned();
    }
    if data.starts_with(&[0xFE, 0xFF]) {
        let (text, _, _) = UTF_16BE.decode(&data[2..]);
        return text.into_owned();
    }
    if let Ok(text) = std::str::from_utf8(data) {
        return text.to_string();
    }
    let (text, _, _) = WINDOWS_1252.decode(data);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_with_bom() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice("CrystalDiskInfo".as_bytes());
        assert_eq!(decode_report_bytes(&data), "CrystalDiskInfo");
    }

    #[test]
    fn decodes_utf16_le_with_bom() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "Disk".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_report_bytes(&data), "Disk");
    }

    #[test]
    fn decodes_utf16_be_with_bom() {
        let mut data = vec![0xFE, 0xFF];
        for unit in "Disk".encode_utf16() {
            data.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_report_bytes(&data), "Disk");
    }

    #[test]
    fn plain_utf8_and_legacy_fallback() {
        assert_eq!(decode_report_bytes("plain".as_bytes()), "plain");
        // 0xE9 is not valid UTF-8 on its own; windows-1252 maps it to e-acute.
        assert_eq!(decode_report_bytes(&[0x41, 0xE9]), "A\u{e9}");
    }
}
