//! Base64 and UTF-8 transcoding at the API boundary.

use crate::Result;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Standard alphabet, padded on encode, padding optional on decode.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 text into raw bytes.
///
/// ASCII whitespace (line wrapping included) is skipped. Any other byte
/// outside the standard alphabet fails with a malformed-input error.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(ENGINE.decode(compact)?)
    } else {
        Ok(ENGINE.decode(text)?)
    }
}

/// Encode raw bytes as padded, unwrapped base64.
pub fn encode(data: &[u8]) -> String {
    ENGINE.encode(data)
}

/// Interpret decompressed bytes as UTF-8 text.
pub fn into_utf8(data: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"hello"), "aGVsbG8=");
        assert_eq!(encode(&[0xff, 0x00, 0xfe]), "/wD+");
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        assert_eq!(decode("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_skips_line_wrapping() {
        assert_eq!(decode("aGVs\nbG8=\r\n").unwrap(), b"hello");
        assert_eq!(decode(" aGVsbG8= ").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_foreign_alphabet() {
        let err = decode("not*base64!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        // URL-safe characters are outside the standard alphabet
        let err = decode("_-8=").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_binary_survives_encoding() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    #[test]
    fn test_into_utf8() {
        assert_eq!(into_utf8(b"caf\xc3\xa9".to_vec()).unwrap(), "café");

        let err = into_utf8(vec![0xc3, 0x28]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }
}
