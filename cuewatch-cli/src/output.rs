use cuewatch_engine::{MonitorEvent, MonitorOutcome};

use crate::{cli::OutputFormat, error::Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct OutputManager {
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Text to print for `event`, if any.
    pub fn render(&self, event: &MonitorEvent) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Pretty => Ok(Self::format_pretty(event)),
            OutputFormat::Json => Ok(Some(serde_json::to_string(event)?)),
        }
    }

    fn format_pretty(event: &MonitorEvent) -> Option<String> {
        let line = match event {
            MonitorEvent::VariantSelected { variant, url } => {
                format!("Monitoring variant {variant}\nURL: {url}")
            }
            MonitorEvent::CycleStarted { .. } => return None,
            MonitorEvent::NoAdBreak { at } => {
                format!("{} - No ad break found", at.format(TIMESTAMP_FORMAT))
            }
            MonitorEvent::AdBreakFound { at, cues } => {
                let mut output = format!("{} - Ad break found!", at.format(TIMESTAMP_FORMAT));
                for cue in cues {
                    output.push_str(&format!("\n\t{cue}"));
                }
                output
            }
            MonitorEvent::Waiting { delay } => format!("Waiting {}ms", delay.as_millis()),
            MonitorEvent::FetchFailed { url, message } => {
                format!("Failed to fetch {url}: {message}")
            }
            MonitorEvent::Stopped { outcome } => match outcome {
                MonitorOutcome::Found => "Exiting..".to_string(),
                MonitorOutcome::Cancelled => "Cancelled. Exiting..".to_string(),
                MonitorOutcome::CycleLimitReached => "Cycle limit reached. Exiting..".to_string(),
            },
        };
        Some(line)
    }
}
