//! Document-level manifest parsing: polling interval, cue extraction and
//! master playlist variants.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cue::{Cue, CueFilter, CueKind, CueParser};
use crate::decoder::PayloadDecoder;

/// Polling interval used when a manifest carries no target duration.
pub const DEFAULT_CHUNK_DURATION: Duration = Duration::from_secs(6);

const TARGET_DURATION_TAG: &str = "#EXT-X-TARGETDURATION";

/// Substrings whose absence lets extraction skip a manifest entirely.
pub const CUE_MARKERS: [&str; 3] = ["EXT-X-CUE", "EXT-X-DATERANGE", "EXT-OATCLS-SCTE35"];

static VARIANT_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:BANDWIDTH=(\d+))|(?:AVERAGE-BANDWIDTH=(\d+))|(?:RESOLUTION=(\d+x\d+))|(?:FRAME-RATE=([\d.]+))|(?:CODECS="([^"]*)")"#,
    )
    .unwrap()
});

/// Rounded `#EXT-X-TARGETDURATION` in seconds, if the manifest declares one.
pub fn target_duration(manifest: &str) -> Option<u64> {
    let line = manifest
        .lines()
        .find(|line| line.starts_with(TARGET_DURATION_TAG))?;
    let value = line.split(':').nth(1)?.trim();
    match value.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs.round_ties_even() as u64),
        _ => {
            warn!(value, "unparseable target duration");
            None
        }
    }
}

/// Expected segment length, used as the polling interval.
pub fn chunk_duration(manifest: &str) -> Duration {
    target_duration(manifest)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CHUNK_DURATION)
}

/// Whether the manifest carries any of the structural cue markers.
///
/// A manifest without one yields no cues, whatever the filter.
pub fn may_contain_cues(manifest: &str) -> bool {
    CUE_MARKERS.iter().any(|marker| manifest.contains(marker))
}

fn parse_line(line: &str, filter: &CueFilter, parser: &CueParser<'_>) -> Option<Cue> {
    let dialect_hit = |kind: CueKind| {
        kind.marker().is_some_and(|marker| line.contains(marker)) && filter.accepts(kind)
    };

    if dialect_hit(CueKind::Cue) {
        parser.parse_cue_out(line)
    } else if dialect_hit(CueKind::DateRange) {
        parser.parse_date_range(line)
    } else if dialect_hit(CueKind::Oatcls) {
        parser.parse_oatcls(line)
    } else if let Some(keyword) = filter.keyword() {
        CueParser::parse_custom(line, keyword)
    } else {
        None
    }
}

/// Extract the cues of a media manifest in line order, at most one per line.
///
/// `decoder` is only consulted in decode mode.
pub fn extract_cues(
    manifest: &str,
    filter: &CueFilter,
    decoder: Option<&dyn PayloadDecoder>,
) -> Vec<Cue> {
    if !may_contain_cues(manifest) {
        return Vec::new();
    }

    let parser = decoder.map(CueParser::with_decoder).unwrap_or_default();
    let cues: Vec<Cue> = manifest
        .lines()
        .filter_map(|line| parse_line(line, filter, &parser))
        .collect();
    debug!(count = cues.len(), "extracted cues from manifest");
    cues
}

/// One media rendition listed by a master playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDescriptor {
    /// URI as written in the playlist, possibly relative.
    pub path: String,
    pub bandwidth: u64,
    pub average_bandwidth: u64,
    pub resolution: String,
    pub frame_rate: f64,
    pub codecs: String,
}

impl fmt::Display for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Path: {}, bandwidth: {}, average-bandwidth: {}, resolution: {}, frame_rate: {}, codecs: {}",
            self.path,
            self.bandwidth,
            self.average_bandwidth,
            self.resolution,
            self.frame_rate,
            self.codecs
        )
    }
}

#[derive(Default)]
struct VariantAttributes {
    bandwidth: Option<u64>,
    average_bandwidth: Option<u64>,
    resolution: Option<String>,
    frame_rate: Option<f64>,
    codecs: Option<String>,
}

impl VariantAttributes {
    fn scan(line: &str) -> Self {
        let mut attrs = Self::default();
        for caps in VARIANT_ATTRIBUTES.captures_iter(line) {
            if let Some(m) = caps.get(1) {
                attrs.bandwidth = m.as_str().parse().ok();
            } else if let Some(m) = caps.get(2) {
                attrs.average_bandwidth = m.as_str().parse().ok();
            } else if let Some(m) = caps.get(3) {
                attrs.resolution = Some(m.as_str().to_string());
            } else if let Some(m) = caps.get(4) {
                attrs.frame_rate = m.as_str().parse().ok();
            } else if let Some(m) = caps.get(5) {
                attrs.codecs = Some(m.as_str().to_string());
            }
        }
        attrs
    }

    fn into_variant(self, path: &str) -> Option<VariantDescriptor> {
        Some(VariantDescriptor {
            path: path.to_string(),
            bandwidth: self.bandwidth?,
            average_bandwidth: self.average_bandwidth?,
            resolution: self.resolution?,
            frame_rate: self.frame_rate?,
            codecs: self.codecs?,
        })
    }
}

/// Variants of a master playlist, in document order.
///
/// A line must carry all five of BANDWIDTH, AVERAGE-BANDWIDTH, RESOLUTION,
/// FRAME-RATE and CODECS; the line after it is the variant's URI.
pub fn parse_master_manifest(manifest: &str) -> Vec<VariantDescriptor> {
    let lines: Vec<&str> = manifest.lines().collect();
    lines
        .iter()
        .zip(lines.iter().skip(1))
        .filter_map(|(line, next)| VariantAttributes::scan(line).into_variant(next))
        .collect()
}

/// Whether the text looks like a media (rather than master) playlist.
pub fn is_media_manifest(manifest: &str) -> bool {
    manifest
        .lines()
        .any(|line| line.starts_with("#EXTINF") || line.starts_with(TARGET_DURATION_TAG))
}
