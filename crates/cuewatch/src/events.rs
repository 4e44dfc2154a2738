use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::time::Duration;
use url::Url;

use crate::cue::Cue;
use crate::manifest::VariantDescriptor;

fn as_millis<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(delay.as_millis() as u64)
}

/// How a polling session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorOutcome {
    /// A cue was found and the session was configured to stop on it
    Found,
    Cancelled,
    CycleLimitReached,
}

/// Progress reported by a monitoring session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    VariantSelected {
        variant: VariantDescriptor,
        url: Url,
    },
    CycleStarted {
        cycle: u64,
        url: Url,
    },
    NoAdBreak {
        at: DateTime<Local>,
    },
    AdBreakFound {
        at: DateTime<Local>,
        cues: Vec<Cue>,
    },
    Waiting {
        #[serde(rename = "delay_ms", serialize_with = "as_millis")]
        delay: Duration,
    },
    FetchFailed {
        url: Url,
        message: String,
    },
    Stopped {
        outcome: MonitorOutcome,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_serializes_milliseconds() {
        let event = MonitorEvent::Waiting {
            delay: Duration::from_secs(4),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "waiting");
        assert_eq!(json["delay_ms"], 4000);
    }

    #[test]
    fn stopped_outcome_is_snake_case() {
        let event = MonitorEvent::Stopped {
            outcome: MonitorOutcome::CycleLimitReached,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "cycle_limit_reached");
    }
}
