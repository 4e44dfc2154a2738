use regex::Regex;
use std::sync::LazyLock;
use tracing::{trace, warn};

use super::attributes::{AttrValue, split_attributes};
use super::{Cue, CueOut, CustomCue, DateRangeCue, OatclsCue, UNSET_DURATION};
use crate::decoder::{PayloadDecoder, decode_or_placeholder};

static CUE_OUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-X-CUE(?:-OUT)?(?:-CONT)?:\s*(.*)").unwrap());
static DATERANGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-X-DATERANGE:\s*(.*)").unwrap());
static OATCLS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#EXT-OATCLS-SCTE35:(.*)").unwrap());

fn attribute_list<'l>(tag: &Regex, line: &'l str) -> Option<&'l str> {
    tag.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts cues from single manifest lines.
///
/// With a decoder attached, a cue carrying binary data gets its payload
/// decoded once the whole attribute list has been read.
#[derive(Clone, Copy, Default)]
pub struct CueParser<'d> {
    decoder: Option<&'d dyn PayloadDecoder>,
}

impl<'d> CueParser<'d> {
    pub fn new() -> Self {
        Self { decoder: None }
    }

    pub fn with_decoder(decoder: &'d dyn PayloadDecoder) -> Self {
        Self {
            decoder: Some(decoder),
        }
    }

    fn decode(&self, binary_data: &Option<String>) -> Option<String> {
        let decoder = self.decoder?;
        binary_data
            .as_deref()
            .map(|payload| decode_or_placeholder(decoder, payload))
    }

    /// `#EXT-X-CUE[-OUT][-CONT]:<attrs>`. A bare token is the duration.
    pub fn parse_cue_out(&self, line: &str) -> Option<Cue> {
        let rest = attribute_list(&CUE_OUT_TAG, line)?;
        let mut cue = CueOut {
            id: None,
            duration: AttrValue::Number(UNSET_DURATION),
            binary_data: None,
            decoded: None,
        };

        for attr in split_attributes(rest) {
            match attr.key.as_deref().unwrap_or("DURATION") {
                "BREAKID" | "ID" => cue.id = Some(attr.value),
                "DURATION" => cue.duration = attr.value,
                "SCTE35" => cue.binary_data = Some(attr.raw),
                other => trace!(key = other, "ignoring CUE attribute"),
            }
        }

        cue.decoded = self.decode(&cue.binary_data);
        Some(Cue::Cue(cue))
    }

    /// `#EXT-X-DATERANGE:<attrs>`. Tokens without `=` are skipped.
    pub fn parse_date_range(&self, line: &str) -> Option<Cue> {
        let rest = attribute_list(&DATERANGE_TAG, line)?;
        let mut cue = DateRangeCue {
            id: None,
            duration: AttrValue::Number(UNSET_DURATION),
            planned_duration: None,
            start_date: None,
            binary_data: None,
            decoded: None,
        };

        for attr in split_attributes(rest) {
            let Some(key) = attr.key.as_deref() else {
                warn!(token = %attr.raw, "skipping DATERANGE attribute without '='");
                continue;
            };
            match key {
                "BREAKID" | "ID" => cue.id = Some(attr.value),
                "DURATION" => cue.duration = attr.value,
                "PLANNED-DURATION" => cue.planned_duration = Some(attr.value),
                "SCTE35-OUT" => cue.binary_data = Some(attr.raw),
                "START-DATE" => cue.start_date = Some(attr.raw),
                other => trace!(key = other, "ignoring DATERANGE attribute"),
            }
        }

        cue.decoded = self.decode(&cue.binary_data);
        Some(Cue::DateRange(cue))
    }

    /// `#EXT-OATCLS-SCTE35:<attrs>`. A bare token is the binary payload.
    pub fn parse_oatcls(&self, line: &str) -> Option<Cue> {
        let rest = attribute_list(&OATCLS_TAG, line)?;
        let mut cue = OatclsCue {
            id: None,
            duration: AttrValue::Number(UNSET_DURATION),
            binary_data: None,
            decoded: None,
        };

        for attr in split_attributes(rest) {
            match attr.key.as_deref().unwrap_or("BINARYDATA") {
                "BREAKID" | "ID" => cue.id = Some(attr.value),
                "BINARYDATA" => cue.binary_data = Some(attr.raw),
                other => trace!(key = other, "ignoring OATCLS attribute"),
            }
        }

        cue.decoded = self.decode(&cue.binary_data);
        Some(Cue::Oatcls(cue))
    }

    /// Any line containing `keyword`, kept verbatim.
    pub fn parse_custom(line: &str, keyword: &str) -> Option<Cue> {
        line.contains(keyword).then(|| {
            Cue::Custom(CustomCue {
                line: line.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::CueKind;
    use crate::decoder::{DECODE_FAILURE, DecodeError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDecoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingDecoder {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PayloadDecoder for CountingDecoder {
        fn decode(&self, payload: &str) -> Result<String, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DecodeError::new("stub failure"))
            } else {
                Ok(format!("decoded:{payload}"))
            }
        }
    }

    fn cue_out(cue: Cue) -> CueOut {
        match cue {
            Cue::Cue(c) => c,
            other => panic!("expected CUE cue, got {other:?}"),
        }
    }

    #[test]
    fn cue_out_with_keys() {
        let cue = cue_out(
            CueParser::new()
                .parse_cue_out("#EXT-X-CUE-OUT:DURATION=10,BREAKID=5")
                .unwrap(),
        );
        assert_eq!(cue.duration, AttrValue::Number(10.0));
        assert_eq!(cue.id, Some(AttrValue::Number(5.0)));
        assert_eq!(cue.binary_data, None);
        assert_eq!(cue.decoded, None);
    }

    #[test]
    fn cue_out_bare_token_is_duration() {
        let cue = cue_out(CueParser::new().parse_cue_out("#EXT-X-CUE-OUT:10").unwrap());
        assert_eq!(cue.duration, AttrValue::Number(10.0));
        assert_eq!(cue.id, None);
    }

    #[test]
    fn cue_out_cont_and_fractional_duration() {
        let cue = cue_out(
            CueParser::new()
                .parse_cue_out("#EXT-X-CUE-OUT-CONT:ElapsedTime=5,Duration=30.5,SCTE35=/DAlAA==")
                .unwrap(),
        );
        assert_eq!(cue.duration, AttrValue::Text("30.5".into()));
        assert_eq!(cue.binary_data.as_deref(), Some("/DAlAA=="));
    }

    #[test]
    fn cue_out_without_attributes_keeps_unset_duration() {
        assert_eq!(CueParser::new().parse_cue_out("#EXT-X-CUE-IN"), None);
        let cue = cue_out(CueParser::new().parse_cue_out("#EXT-X-CUE-OUT:").unwrap());
        assert_eq!(cue.duration, AttrValue::Number(UNSET_DURATION));
    }

    #[test]
    fn non_matching_lines() {
        let parser = CueParser::new();
        assert!(parser.parse_cue_out("#EXTINF:6.0,").is_none());
        assert!(parser.parse_date_range("#EXT-X-CUE-OUT:10").is_none());
        assert!(parser.parse_oatcls("segment1.ts").is_none());
    }

    #[test]
    fn date_range_fields() {
        let cue = CueParser::new()
            .parse_date_range(
                "#EXT-X-DATERANGE:ID=\"splice-6FFFFFF0\",START-DATE=\"2014-03-05T11:15:00Z\",PLANNED-DURATION=59.993,SCTE35-OUT=0xFC002F0000000000FF0",
            )
            .unwrap();
        assert_eq!(cue.kind(), CueKind::DateRange);
        match cue {
            Cue::DateRange(c) => {
                assert_eq!(c.id, Some(AttrValue::Text("splice-6FFFFFF0".into())));
                assert_eq!(c.start_date.as_deref(), Some("2014-03-05T11:15:00Z"));
                assert_eq!(c.planned_duration, Some(AttrValue::Text("59.993".into())));
                assert_eq!(c.duration, AttrValue::Number(UNSET_DURATION));
                assert_eq!(c.binary_data.as_deref(), Some("0xFC002F0000000000FF0"));
            }
            other => panic!("expected DATERANGE cue, got {other:?}"),
        }
    }

    #[test]
    fn date_range_skips_malformed_token() {
        let cue = CueParser::new()
            .parse_date_range("#EXT-X-DATERANGE:ID=7,garbage,DURATION=15")
            .unwrap();
        assert_eq!(cue.id(), Some(&AttrValue::Number(7.0)));
        assert_eq!(cue.duration(), Some(&AttrValue::Number(15.0)));
    }

    #[test]
    fn oatcls_bare_payload() {
        let cue = CueParser::new()
            .parse_oatcls("#EXT-OATCLS-SCTE35:/DA0AAAAAAAA///wBQb+AAAAAAAeAhxDVUVJAAAAAn//AAApPWwDDAAAAAAAAAAAAAA=")
            .unwrap();
        assert_eq!(
            cue.binary_data(),
            Some("/DA0AAAAAAAA///wBQb+AAAAAAAeAhxDVUVJAAAAAn//AAApPWwDDAAAAAAAAAAAAAA=")
        );
        assert_eq!(cue.id(), None);
    }

    #[test]
    fn custom_keyword() {
        let line = "#EXT-X-SPLICEPOINT-SCTE35:/DA0";
        let cue = CueParser::parse_custom(line, "SPLICEPOINT").unwrap();
        assert_eq!(cue.to_string(), line);
        assert!(CueParser::parse_custom(line, "DATERANGE").is_none());
    }

    #[test]
    fn decode_runs_once_per_line() {
        let decoder = CountingDecoder::new(false);
        let parser = CueParser::with_decoder(&decoder);
        let cue = parser
            .parse_date_range("#EXT-X-DATERANGE:ID=1,SCTE35-OUT=0xFC,START-DATE=2024,DURATION=30")
            .unwrap();
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cue.decoded(), Some("decoded:0xFC"));
    }

    #[test]
    fn decode_failure_uses_placeholder() {
        let decoder = CountingDecoder::new(true);
        let parser = CueParser::with_decoder(&decoder);
        let cue = parser
            .parse_cue_out("#EXT-X-CUE-OUT:DURATION=30,SCTE35=/DAlAAAAAAAAAP/wFAUAAAABf+/+")
            .unwrap();
        assert_eq!(cue.decoded(), Some(DECODE_FAILURE));
    }

    #[test]
    fn no_payload_means_no_decode() {
        let decoder = CountingDecoder::new(false);
        let cue = CueParser::with_decoder(&decoder)
            .parse_oatcls("#EXT-OATCLS-SCTE35:BREAKID=3")
            .unwrap();
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(cue.decoded(), None);
    }
}
