use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode dataset bytes into UTF-8 using: BOM -> strict UTF-8 -> chardetng fallback.
///
/// A leading BOM is stripped from the returned text.
pub fn decode_text(bytes: &[u8]) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_string(),
            encoding_label: UTF_8.name().to_string(),
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, false);
    decode_with(bytes, enc)
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, used, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: used.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::decode_text;

    #[test]
    fn plain_utf8_passes_through() {
        let decoded = decode_text("héllo".as_bytes()).unwrap();
        assert_eq!(decoded.text, "héllo");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let decoded = decode_text(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn utf16_bom_is_honoured() {
        let decoded = decode_text(b"\xFF\xFEh\0i\0").unwrap();
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding_label, "UTF-16LE");
    }

    #[test]
    fn legacy_single_byte_text_is_detected() {
        let decoded = decode_text(b"caf\xe9 au lait").unwrap();
        assert!(decoded.text.starts_with("caf"));
        assert!(decoded.text.ends_with(" au lait"));
        assert_ne!(decoded.encoding_label, "UTF-8");
    }
}
