use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use cuewatch_engine::{CueFilter, CueKind, FetchConfig, MonitorConfig, VariantSelection};

#[derive(Parser, Debug)]
#[command(
    name = "cuewatch",
    version,
    about = "Watch a live HLS stream for SCTE-35 ad-break cues",
    long_about = None
)]
pub struct Args {
    /// Master playlist URL (http or https, path ending in .m3u8)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Stop as soon as an ad break is found
    #[arg(
        short = 'e',
        long,
        value_name = "BOOL",
        default_value = "true",
        value_parser = parse_bool,
        action = ArgAction::Set
    )]
    pub exit_if_found: bool,

    /// Decode binary SCTE-35 payloads attached to cues
    #[arg(
        short = 'd',
        long,
        value_name = "BOOL",
        default_value = "false",
        value_parser = parse_bool,
        action = ArgAction::Set
    )]
    pub decode: bool,

    /// Cue tag dialect to look for [default: EXT-X-CUE]
    #[arg(short = 't', long, value_enum, conflicts_with = "custom")]
    pub ad_break_type: Option<CueKind>,

    /// Report every line containing this keyword instead of a tag dialect
    #[arg(short = 'c', long, value_name = "KEYWORD")]
    pub custom: Option<String>,

    /// Which variants of the master playlist to monitor
    #[arg(long, value_enum, default_value_t = VariantSelection::First)]
    pub variant: VariantSelection,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Stop each variant after this many polling cycles
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Accepts yes/no, true/false, t/f, y/n and 1/0 in any case.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got `{value}`")),
    }
}

impl Args {
    pub fn cue_filter(&self) -> CueFilter {
        match &self.custom {
            Some(keyword) => CueFilter::Keyword(keyword.clone()),
            None => CueFilter::Dialect(self.ad_break_type.unwrap_or(CueKind::Cue)),
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            exit_if_found: self.exit_if_found,
            decode: self.decode,
            filter: self.cue_filter(),
            max_cycles: self.max_cycles,
            variant_selection: self.variant,
            fetch: FetchConfig {
                timeout: Duration::from_secs(self.timeout),
                ..FetchConfig::default()
            },
            ..MonitorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://h.test/live/master.m3u8";

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["cuewatch", URL]).unwrap();
        assert!(args.exit_if_found);
        assert!(!args.decode);
        assert_eq!(args.cue_filter(), CueFilter::Dialect(CueKind::Cue));
        assert_eq!(args.output, OutputFormat::Pretty);
        assert_eq!(args.monitor_config().variant_selection, VariantSelection::First);
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "cuewatch",
            URL,
            "-e",
            "no",
            "-d",
            "Y",
            "-t",
            "EXT-X-DATERANGE",
            "--variant",
            "highest",
            "--max-cycles",
            "5",
        ])
        .unwrap();
        let config = args.monitor_config();
        assert!(!config.exit_if_found);
        assert!(config.decode);
        assert_eq!(config.filter, CueFilter::Dialect(CueKind::DateRange));
        assert_eq!(config.variant_selection, VariantSelection::HighestBandwidth);
        assert_eq!(config.max_cycles, Some(5));
    }

    #[test]
    fn custom_keyword() {
        let args = Args::try_parse_from(["cuewatch", URL, "-c", "SPLICEPOINT"]).unwrap();
        assert_eq!(args.cue_filter(), CueFilter::Keyword("SPLICEPOINT".into()));
    }

    #[test]
    fn dialect_and_custom_conflict() {
        assert!(Args::try_parse_from(["cuewatch", URL, "-t", "ALL", "-c", "X"]).is_err());
    }

    #[test]
    fn bool_values() {
        for value in ["yes", "TRUE", "t", "y", "1"] {
            assert_eq!(parse_bool(value), Ok(true));
        }
        for value in ["no", "False", "f", "n", "0"] {
            assert_eq!(parse_bool(value), Ok(false));
        }
        assert!(parse_bool("maybe").is_err());
    }
}
