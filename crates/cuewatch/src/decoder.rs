//! Binary SCTE-35 payload decoding as an injectable capability.

use thiserror::Error;
use tracing::debug;

/// Text stored on a cue when its payload cannot be decoded.
pub const DECODE_FAILURE: &str = "Failed to decode binarydata";

#[derive(Debug, Error)]
#[error("payload decode failed: {reason}")]
pub struct DecodeError {
    pub reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<scte35::Scte35Error> for DecodeError {
    fn from(err: scte35::Scte35Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Turns an encoded (hex or base64) payload into a human-readable report.
pub trait PayloadDecoder: Send + Sync {
    fn decode(&self, payload: &str) -> Result<String, DecodeError>;
}

/// Decodes `splice_info_section` payloads and reports them as pretty JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scte35Decoder;

impl PayloadDecoder for Scte35Decoder {
    fn decode(&self, payload: &str) -> Result<String, DecodeError> {
        let section = scte35::decode(payload)?;
        Ok(section.to_json_pretty()?)
    }
}

/// Decode `payload`, swallowing any failure into [`DECODE_FAILURE`].
pub fn decode_or_placeholder(decoder: &dyn PayloadDecoder, payload: &str) -> String {
    match decoder.decode(payload) {
        Ok(report) => report,
        Err(e) => {
            debug!(error = %e, payload, "SCTE-35 payload decode failed");
            DECODE_FAILURE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIME_SIGNAL: &str =
        "/DA0AAAAAAAA///wBQb+cr0AUAAeAhxDVUVJSAAAjn/PAAGlmbAICAAAAAAsoKGKNAIAmsnRfg==";

    #[test]
    fn scte35_decoder_reports_json() {
        let report = Scte35Decoder.decode(TIME_SIGNAL).unwrap();
        assert!(report.contains("\"splice_command_type\": \"time_signal\""));
        assert!(report.contains("Provider Placement Opportunity Start"));
    }

    #[test]
    fn failures_become_placeholder() {
        assert_eq!(
            decode_or_placeholder(&Scte35Decoder, "definitely not scte35"),
            DECODE_FAILURE
        );
        // decodes as hex, wrong table id
        assert_eq!(decode_or_placeholder(&Scte35Decoder, "AAAAAAAAAAAAAAAAAAAA"), DECODE_FAILURE);
    }
}
