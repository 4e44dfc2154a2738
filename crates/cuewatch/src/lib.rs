//! Live HLS ad-break monitoring.
//!
//! A [`Session`] fetches a master playlist, picks variants and polls each
//! media playlist with a [`CueMonitor`] until SCTE-35 style cue tags
//! (`#EXT-X-CUE-OUT`, `#EXT-X-DATERANGE`, `#EXT-OATCLS-SCTE35` or a custom
//! keyword) show up. Progress is reported as [`MonitorEvent`]s over an mpsc
//! channel.

pub mod config;
pub mod cue;
pub mod decoder;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod manifest;
pub mod monitor;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{FetchConfig, MonitorConfig, VariantSelection};
pub use cue::{AttrValue, Cue, CueFilter, CueKind, CueParser};
pub use decoder::{DECODE_FAILURE, DecodeError, PayloadDecoder, Scte35Decoder};
pub use error::MonitorError;
pub use events::{MonitorEvent, MonitorOutcome};
pub use fetcher::{HttpFetcher, ManifestFetcher};
pub use manifest::{VariantDescriptor, chunk_duration, extract_cues, parse_master_manifest};
pub use monitor::CueMonitor;
pub use session::{ResolvedVariant, Session, validate_master_url};
