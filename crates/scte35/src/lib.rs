//! SCTE-35 cue payload decoding.
//!
//! HLS manifests carry SCTE-35 splice information as text, either hex
//! (`0xFC30...`) or base64 (`/DAlAAAA...`). This crate turns that text back
//! into bytes and parses the `splice_info_section`, including the splice
//! command, the descriptor loop and the trailing CRC-32.

pub mod crc32;
pub mod descriptor;
pub mod error;
pub mod payload;
pub mod section;

pub use crc32::{mpeg2_crc32, section_crc_matches};
pub use descriptor::{SegmentationDescriptor, SpliceDescriptor};
pub use error::Scte35Error;
pub use payload::{PayloadEncoding, decode_payload};
pub use section::{
    BreakDuration, SpliceCommand, SpliceCommandType, SpliceInfoSection, SpliceInsert, TimeSignal,
};

/// Result type for SCTE-35 decoding operations
pub type Result<T> = std::result::Result<T, Scte35Error>;

/// Decode a textual (hex or base64) SCTE-35 payload into a parsed section.
pub fn decode(text: &str) -> Result<SpliceInfoSection> {
    let (bytes, encoding) = decode_payload(text)?;
    tracing::trace!(?encoding, len = bytes.len(), "decoded SCTE-35 payload text");
    SpliceInfoSection::parse(&bytes)
}
