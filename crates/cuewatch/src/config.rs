use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::cue::CueFilter;
use crate::manifest::DEFAULT_CHUNK_DURATION;

pub const DEFAULT_USER_AGENT: &str = concat!("cuewatch/", env!("CARGO_PKG_VERSION"));

/// HTTP options for manifest requests
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Overall timeout for a single manifest request
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: HeaderMap::new(),
            follow_redirects: true,
        }
    }
}

/// Which variants of a master playlist get monitored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VariantSelection {
    /// First complete variant in document order
    #[default]
    First,
    #[cfg_attr(feature = "clap", value(name = "highest"))]
    HighestBandwidth,
    #[cfg_attr(feature = "clap", value(name = "lowest"))]
    LowestBandwidth,
    /// Every variant, one after another
    All,
}

/// Settings for a monitoring session
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Stop at the first cycle that finds a cue
    pub exit_if_found: bool,

    /// Attach a decode report to cues carrying a binary payload
    pub decode: bool,

    pub filter: CueFilter,

    /// Polling interval for manifests without `#EXT-X-TARGETDURATION`
    pub default_chunk_duration: Duration,

    /// Lower bound on the polling interval
    pub min_poll_interval: Duration,

    /// Stop after this many fetch cycles (unbounded when `None`)
    pub max_cycles: Option<u64>,

    pub variant_selection: VariantSelection,

    pub fetch: FetchConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            exit_if_found: true,
            decode: false,
            filter: CueFilter::default(),
            default_chunk_duration: DEFAULT_CHUNK_DURATION,
            min_poll_interval: Duration::from_secs(1),
            max_cycles: None,
            variant_selection: VariantSelection::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Delay before the next fetch of a manifest whose target duration is `target`.
    pub fn poll_interval(&self, target: Option<u64>) -> Duration {
        target
            .map(Duration::from_secs)
            .unwrap_or(self.default_chunk_duration)
            .max(self.min_poll_interval)
    }
}
