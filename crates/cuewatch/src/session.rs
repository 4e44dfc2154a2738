//! Bootstrap: validate the master URL, resolve its variants and hand each
//! selected variant to a [`CueMonitor`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{MonitorConfig, VariantSelection};
use crate::decoder::{PayloadDecoder, Scte35Decoder};
use crate::error::MonitorError;
use crate::events::{MonitorEvent, MonitorOutcome};
use crate::fetcher::{HttpFetcher, ManifestFetcher};
use crate::manifest::{VariantDescriptor, is_media_manifest, parse_master_manifest};
use crate::monitor::CueMonitor;

/// Accept only `http`/`https` URLs whose path ends in `.m3u8`.
pub fn validate_master_url(input: &str) -> Result<Url, MonitorError> {
    let url = Url::parse(input).map_err(|e| MonitorError::invalid_url(input, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(MonitorError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }
    }
    if !url.path().ends_with(".m3u8") {
        return Err(MonitorError::invalid_url(
            input,
            "path must end with .m3u8",
        ));
    }
    Ok(url)
}

/// A variant together with its absolute URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub descriptor: VariantDescriptor,
    pub url: Url,
}

fn select(mut variants: Vec<ResolvedVariant>, policy: VariantSelection) -> Vec<ResolvedVariant> {
    match policy {
        VariantSelection::All => variants,
        VariantSelection::First => {
            variants.truncate(1);
            variants
        }
        VariantSelection::HighestBandwidth => variants
            .into_iter()
            .rev()
            .max_by_key(|v| v.descriptor.bandwidth)
            .into_iter()
            .collect(),
        VariantSelection::LowestBandwidth => variants
            .into_iter()
            .min_by_key(|v| v.descriptor.bandwidth)
            .into_iter()
            .collect(),
    }
}

/// One monitoring run against a master playlist.
pub struct Session {
    fetcher: Arc<dyn ManifestFetcher>,
    monitor: CueMonitor,
    config: Arc<MonitorConfig>,
}

impl Session {
    /// Session over HTTP with the SCTE-35 decoder.
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_parts(fetcher, Arc::new(Scte35Decoder), config))
    }

    pub fn with_parts(
        fetcher: Arc<dyn ManifestFetcher>,
        decoder: Arc<dyn PayloadDecoder>,
        config: MonitorConfig,
    ) -> Self {
        let config = Arc::new(config);
        let monitor = CueMonitor::new(fetcher.clone(), decoder, config.clone());
        Self {
            fetcher,
            monitor,
            config,
        }
    }

    /// Fetch the master playlist and resolve variant paths against it.
    ///
    /// A media playlist given directly is monitored as its own single variant.
    pub async fn resolve_variants(
        &self,
        master_url: &Url,
    ) -> Result<Vec<ResolvedVariant>, MonitorError> {
        let master = self.fetcher.fetch(master_url).await?;
        let variants = parse_master_manifest(&master);

        if variants.is_empty() {
            if is_media_manifest(&master) {
                info!(url = %master_url, "URL is a media playlist, monitoring it directly");
                return Ok(vec![ResolvedVariant {
                    descriptor: VariantDescriptor {
                        path: master_url.to_string(),
                        bandwidth: 0,
                        average_bandwidth: 0,
                        resolution: String::new(),
                        frame_rate: 0.0,
                        codecs: String::new(),
                    },
                    url: master_url.clone(),
                }]);
            }
            return Err(MonitorError::NoVariants {
                url: master_url.to_string(),
            });
        }

        variants
            .into_iter()
            .map(|descriptor| {
                let url = master_url.join(&descriptor.path).map_err(|e| {
                    MonitorError::playlist(format!(
                        "cannot resolve variant path `{}`: {e}",
                        descriptor.path
                    ))
                })?;
                debug!(%url, bandwidth = descriptor.bandwidth, "resolved variant");
                Ok(ResolvedVariant { descriptor, url })
            })
            .collect()
    }

    /// Monitor the selected variants one after another.
    ///
    /// A found cue or a fetch failure ends only the current variant's monitor;
    /// cancellation ends the whole session. Returns the last variant's result.
    pub async fn run(
        &self,
        master_url: &Url,
        events: &mpsc::Sender<MonitorEvent>,
        token: &CancellationToken,
    ) -> Result<MonitorOutcome, MonitorError> {
        let variants = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(url = %master_url, "Cancellation token received during bootstrap.");
                let outcome = MonitorOutcome::Cancelled;
                events
                    .send(MonitorEvent::Stopped { outcome })
                    .await
                    .map_err(|_| MonitorError::ChannelClosed)?;
                return Ok(outcome);
            }
            resolved = self.resolve_variants(master_url) => resolved?,
        };

        let selected = select(variants, self.config.variant_selection);
        let mut result = Ok(MonitorOutcome::CycleLimitReached);
        for variant in selected {
            events
                .send(MonitorEvent::VariantSelected {
                    variant: variant.descriptor.clone(),
                    url: variant.url.clone(),
                })
                .await
                .map_err(|_| MonitorError::ChannelClosed)?;

            result = self.monitor.run(&variant.url, events, token).await;
            match &result {
                Ok(MonitorOutcome::Cancelled) | Err(MonitorError::ChannelClosed) => break,
                Ok(MonitorOutcome::Found) => debug!(url = %variant.url, "variant finished"),
                Ok(MonitorOutcome::CycleLimitReached) => {
                    warn!(url = %variant.url, "variant cycle budget exhausted");
                }
                Err(e) => warn!(url = %variant.url, error = %e, "variant monitoring failed"),
            }
        }
        result
    }
}
