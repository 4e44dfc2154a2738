use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{Result, Scte35Error};

/// Text encoding a cue payload was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Hex,
    Base64,
}

/// Turn a manifest payload string into raw section bytes.
///
/// An optional `0x`/`0X` prefix forces hex. Otherwise text made only of an
/// even number of hex digits is read as hex and everything else as base64.
pub fn decode_payload(text: &str) -> Result<(Vec<u8>, PayloadEncoding)> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Scte35Error::InvalidPayload("empty payload".to_string()));
    }

    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return hex::decode(digits)
            .map(|bytes| (bytes, PayloadEncoding::Hex))
            .map_err(|e| Scte35Error::InvalidPayload(format!("bad hex payload: {e}")));
    }

    if text.len() % 2 == 0
        && text.bytes().all(|b| b.is_ascii_hexdigit())
        && let Ok(bytes) = hex::decode(text)
    {
        return Ok((bytes, PayloadEncoding::Hex));
    }

    STANDARD
        .decode(text)
        .map(|bytes| (bytes, PayloadEncoding::Base64))
        .map_err(|e| Scte35Error::InvalidPayload(format!("bad base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_hex() {
        let (bytes, encoding) = decode_payload("0xFC3011").unwrap();
        assert_eq!(bytes, vec![0xFC, 0x30, 0x11]);
        assert_eq!(encoding, PayloadEncoding::Hex);
    }

    #[test]
    fn bare_hex() {
        let (bytes, encoding) = decode_payload("fc30").unwrap();
        assert_eq!(bytes, vec![0xFC, 0x30]);
        assert_eq!(encoding, PayloadEncoding::Hex);
    }

    #[test]
    fn base64_with_padding() {
        let (bytes, encoding) = decode_payload("/DAR").unwrap();
        assert_eq!(bytes, vec![0xFC, 0x30, 0x11]);
        assert_eq!(encoding, PayloadEncoding::Base64);
    }

    #[test]
    fn rejects_empty_and_junk() {
        assert!(decode_payload("   ").is_err());
        assert!(decode_payload("0xZZ").is_err());
        assert!(decode_payload("%%%").is_err());
    }
}
