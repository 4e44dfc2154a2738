//! Ad-break cue model and the per-line tag parsers.

mod attributes;
mod parser;

pub use attributes::{AttrValue, Attribute, split_attributes};
pub use parser::CueParser;

use serde::Serialize;
use std::fmt;

/// Duration stored on a cue until the tag supplies one.
pub const UNSET_DURATION: f64 = -1.0;

/// Tag dialects a cue can be expressed in. `All` only selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CueKind {
    #[cfg_attr(feature = "clap", value(name = "EXT-X-CUE"))]
    Cue,
    #[cfg_attr(feature = "clap", value(name = "EXT-X-DATERANGE"))]
    DateRange,
    #[cfg_attr(feature = "clap", value(name = "EXT-OATCLS-SCTE35"))]
    Oatcls,
    #[cfg_attr(feature = "clap", value(skip))]
    Custom,
    #[cfg_attr(feature = "clap", value(name = "ALL"))]
    All,
}

impl CueKind {
    /// Substring identifying a line of this dialect.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            CueKind::Cue => Some("EXT-X-CUE"),
            CueKind::DateRange => Some("EXT-X-DATERANGE"),
            CueKind::Oatcls => Some("EXT-OATCLS-SCTE35"),
            CueKind::Custom | CueKind::All => None,
        }
    }
}

/// Which cues a monitor looks for: a dialect selector or a free keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueFilter {
    Dialect(CueKind),
    Keyword(String),
}

impl Default for CueFilter {
    fn default() -> Self {
        CueFilter::Dialect(CueKind::Cue)
    }
}

impl CueFilter {
    pub fn accepts(&self, kind: CueKind) -> bool {
        match self {
            CueFilter::Dialect(selected) => *selected == CueKind::All || *selected == kind,
            CueFilter::Keyword(_) => false,
        }
    }

    pub fn keyword(&self) -> Option<&str> {
        match self {
            CueFilter::Keyword(keyword) => Some(keyword),
            CueFilter::Dialect(_) => None,
        }
    }
}

/// `#EXT-X-CUE`, `#EXT-X-CUE-OUT` and `#EXT-X-CUE-OUT-CONT` cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueOut {
    pub id: Option<AttrValue>,
    pub duration: AttrValue,
    pub binary_data: Option<String>,
    pub decoded: Option<String>,
}

/// `#EXT-X-DATERANGE` cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRangeCue {
    pub id: Option<AttrValue>,
    pub duration: AttrValue,
    pub planned_duration: Option<AttrValue>,
    pub start_date: Option<String>,
    pub binary_data: Option<String>,
    pub decoded: Option<String>,
}

/// `#EXT-OATCLS-SCTE35` cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OatclsCue {
    pub id: Option<AttrValue>,
    pub duration: AttrValue,
    pub binary_data: Option<String>,
    pub decoded: Option<String>,
}

/// A line matched by a user keyword, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomCue {
    pub line: String,
}

/// A detected ad-break cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Cue {
    Cue(CueOut),
    DateRange(DateRangeCue),
    Oatcls(OatclsCue),
    Custom(CustomCue),
}

impl Cue {
    pub fn kind(&self) -> CueKind {
        match self {
            Cue::Cue(_) => CueKind::Cue,
            Cue::DateRange(_) => CueKind::DateRange,
            Cue::Oatcls(_) => CueKind::Oatcls,
            Cue::Custom(_) => CueKind::Custom,
        }
    }

    pub fn id(&self) -> Option<&AttrValue> {
        match self {
            Cue::Cue(c) => c.id.as_ref(),
            Cue::DateRange(c) => c.id.as_ref(),
            Cue::Oatcls(c) => c.id.as_ref(),
            Cue::Custom(_) => None,
        }
    }

    pub fn duration(&self) -> Option<&AttrValue> {
        match self {
            Cue::Cue(c) => Some(&c.duration),
            Cue::DateRange(c) => Some(&c.duration),
            Cue::Oatcls(c) => Some(&c.duration),
            Cue::Custom(_) => None,
        }
    }

    pub fn binary_data(&self) -> Option<&str> {
        match self {
            Cue::Cue(c) => c.binary_data.as_deref(),
            Cue::DateRange(c) => c.binary_data.as_deref(),
            Cue::Oatcls(c) => c.binary_data.as_deref(),
            Cue::Custom(_) => None,
        }
    }

    pub fn decoded(&self) -> Option<&str> {
        match self {
            Cue::Cue(c) => c.decoded.as_deref(),
            Cue::DateRange(c) => c.decoded.as_deref(),
            Cue::Oatcls(c) => c.decoded.as_deref(),
            Cue::Custom(_) => None,
        }
    }
}

/// Renders an optional field, `None` when absent.
struct OrNone<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("None"),
        }
    }
}

fn write_payload(
    f: &mut fmt::Formatter<'_>,
    separator: &str,
    binary_data: &Option<String>,
    decoded: &Option<String>,
) -> fmt::Result {
    if let Some(data) = binary_data {
        write!(f, "{separator}BINARYDATA={data}")?;
        if let Some(decoded) = decoded {
            write!(f, "\n{decoded}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Cue(c) => {
                write!(f, "ID={}, DURATION={}", OrNone(&c.id), c.duration)?;
                write_payload(f, ",", &c.binary_data, &c.decoded)
            }
            Cue::DateRange(c) => {
                write!(
                    f,
                    "ID={}, DURATION={}, PLANNED_DURATION={}, START_DATE={}",
                    OrNone(&c.id),
                    c.duration,
                    OrNone(&c.planned_duration),
                    OrNone(&c.start_date)
                )?;
                write_payload(f, ", ", &c.binary_data, &c.decoded)
            }
            Cue::Oatcls(c) => {
                write!(f, "ID={}", OrNone(&c.id))?;
                write_payload(f, ", ", &c.binary_data, &c.decoded)
            }
            Cue::Custom(c) => f.write_str(&c.line),
        }
    }
}
