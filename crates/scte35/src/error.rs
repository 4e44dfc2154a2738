use thiserror::Error;

#[derive(Debug, Error)]
pub enum Scte35Error {
    #[error("payload is neither hex nor base64: {0}")]
    InvalidPayload(String),

    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("invalid table id: expected 0x{expected:02X}, got 0x{actual:02X}")]
    InvalidTableId { expected: u8, actual: u8 },

    #[error("malformed splice_info_section: {0}")]
    Malformed(String),
}
