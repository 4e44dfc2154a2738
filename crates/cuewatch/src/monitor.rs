//! Fetch-parse-report-sleep polling of a single media playlist.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

use crate::config::MonitorConfig;
use crate::decoder::PayloadDecoder;
use crate::error::MonitorError;
use crate::events::{MonitorEvent, MonitorOutcome};
use crate::fetcher::ManifestFetcher;
use crate::manifest::{extract_cues, target_duration};

/// Polls one media playlist until a cue is found, the cycle budget runs out,
/// the token is cancelled, or a fetch fails.
#[derive(Clone)]
pub struct CueMonitor {
    fetcher: Arc<dyn ManifestFetcher>,
    decoder: Arc<dyn PayloadDecoder>,
    config: Arc<MonitorConfig>,
}

impl CueMonitor {
    pub fn new(
        fetcher: Arc<dyn ManifestFetcher>,
        decoder: Arc<dyn PayloadDecoder>,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            config,
        }
    }

    async fn emit(
        events: &mpsc::Sender<MonitorEvent>,
        event: MonitorEvent,
    ) -> Result<(), MonitorError> {
        events
            .send(event)
            .await
            .map_err(|_| MonitorError::ChannelClosed)
    }

    async fn finish(
        events: &mpsc::Sender<MonitorEvent>,
        outcome: MonitorOutcome,
    ) -> Result<MonitorOutcome, MonitorError> {
        Self::emit(events, MonitorEvent::Stopped { outcome }).await?;
        Ok(outcome)
    }

    pub async fn run(
        &self,
        url: &Url,
        events: &mpsc::Sender<MonitorEvent>,
        token: &CancellationToken,
    ) -> Result<MonitorOutcome, MonitorError> {
        let decoder = self.config.decode.then_some(self.decoder.as_ref());
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;
            Self::emit(
                events,
                MonitorEvent::CycleStarted {
                    cycle,
                    url: url.clone(),
                },
            )
            .await?;

            let manifest = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(%url, "Cancellation token received during fetch.");
                    return Self::finish(events, MonitorOutcome::Cancelled).await;
                }
                result = self.fetcher.fetch(url) => match result {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        error!(%url, error = %e, "Failed to fetch media playlist");
                        // receiver may already be gone
                        let _ = events
                            .send(MonitorEvent::FetchFailed {
                                url: url.clone(),
                                message: e.to_string(),
                            })
                            .await;
                        return Err(e);
                    }
                },
            };

            let delay = self.config.poll_interval(target_duration(&manifest));
            let cues = extract_cues(&manifest, &self.config.filter, decoder);
            let at = Local::now();

            if cues.is_empty() {
                debug!(%url, cycle, "no ad break in manifest");
                Self::emit(events, MonitorEvent::NoAdBreak { at }).await?;
            } else {
                info!(%url, cycle, cues = cues.len(), "ad break found");
                Self::emit(events, MonitorEvent::AdBreakFound { at, cues }).await?;
                if self.config.exit_if_found {
                    return Self::finish(events, MonitorOutcome::Found).await;
                }
            }

            if self.config.max_cycles.is_some_and(|max| cycle >= max) {
                info!(%url, cycle, "cycle limit reached");
                return Self::finish(events, MonitorOutcome::CycleLimitReached).await;
            }

            Self::emit(events, MonitorEvent::Waiting { delay }).await?;
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(%url, "Cancellation token received during monitoring.");
                    return Self::finish(events, MonitorOutcome::Cancelled).await;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
