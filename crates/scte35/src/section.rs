use serde::{Serialize, Serializer};

use crate::crc32::section_crc_matches;
use crate::descriptor::SpliceDescriptor;
use crate::{Result, Scte35Error};

pub const TABLE_ID: u8 = 0xFC;

/// Bytes from table_id through splice_command_type.
const HEADER_LEN: usize = 14;

/// splice_command_length meaning "not declared, runs to the CRC".
const UNDECLARED_COMMAND_LENGTH: usize = 0xFFF;

const TICKS_PER_SECOND: f64 = 90_000.0;

/// Big-endian reader over a byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or_else(|| Scte35Error::Malformed(format!("{what} truncated")))?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Five bytes whose low 33 bits hold a 90kHz value; returns (top byte, value).
    fn pts(&mut self, what: &str) -> Result<(u8, u64)> {
        let b = self.take(5, what)?;
        let value = b[1..]
            .iter()
            .fold(u64::from(b[0] & 0x01), |acc, &byte| (acc << 8) | u64::from(byte));
        Ok((b[0], value))
    }

    fn skip(&mut self, n: usize, what: &str) -> Result<()> {
        self.take(n, what).map(|_| ())
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

fn ticks_to_secs(ticks: u64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND
}

/// splice_time(): a PTS when time_specified_flag is set.
fn read_splice_time(cursor: &mut Cursor<'_>) -> Result<Option<u64>> {
    let flags = cursor.data.get(cursor.pos).copied().unwrap_or(0);
    if flags & 0x80 != 0 {
        Ok(Some(cursor.pts("splice_time")?.1))
    } else {
        cursor.skip(1, "splice_time")?;
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceCommandType {
    SpliceNull,
    SpliceSchedule,
    SpliceInsert,
    TimeSignal,
    BandwidthReservation,
    PrivateCommand,
    Unknown(u8),
}

impl SpliceCommandType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::SpliceNull,
            0x04 => Self::SpliceSchedule,
            0x05 => Self::SpliceInsert,
            0x06 => Self::TimeSignal,
            0x07 => Self::BandwidthReservation,
            0xFF => Self::PrivateCommand,
            other => Self::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SpliceNull => "splice_null",
            Self::SpliceSchedule => "splice_schedule",
            Self::SpliceInsert => "splice_insert",
            Self::TimeSignal => "time_signal",
            Self::BandwidthReservation => "bandwidth_reservation",
            Self::PrivateCommand => "private_command",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl Serialize for SpliceCommandType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Parsed splice command. Commands without a dedicated parser keep their
/// bytes as hex.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SpliceCommand {
    SpliceNull,
    SpliceInsert(SpliceInsert),
    TimeSignal(TimeSignal),
    Other { data: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SpliceInsert {
    pub splice_event_id: u32,
    pub splice_event_cancel_indicator: bool,
    pub out_of_network_indicator: bool,
    pub program_splice_flag: bool,
    pub splice_immediate_flag: bool,
    /// 90kHz ticks
    pub splice_time: Option<u64>,
    pub break_duration: Option<BreakDuration>,
    pub unique_program_id: u16,
    pub avail_num: u8,
    pub avails_expected: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreakDuration {
    pub auto_return: bool,
    /// 90kHz ticks
    pub duration: u64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSignal {
    pub splice_time: Option<u64>,
    pub splice_time_secs: Option<f64>,
}

impl SpliceInsert {
    fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let mut insert = SpliceInsert {
            splice_event_id: cursor.u32("splice_event_id")?,
            splice_event_cancel_indicator: cursor.u8("splice_event_cancel_indicator")? & 0x80 != 0,
            ..SpliceInsert::default()
        };
        if insert.splice_event_cancel_indicator {
            return Ok(insert);
        }

        let flags = cursor.u8("splice_insert flags")?;
        insert.out_of_network_indicator = flags & 0x80 != 0;
        insert.program_splice_flag = flags & 0x40 != 0;
        let has_duration = flags & 0x20 != 0;
        insert.splice_immediate_flag = flags & 0x10 != 0;

        match (insert.program_splice_flag, insert.splice_immediate_flag) {
            (true, false) => insert.splice_time = read_splice_time(cursor)?,
            (true, true) => {}
            (false, immediate) => {
                let components = cursor.u8("component_count")? as usize;
                // component_tag, plus splice_time when not immediate
                let per_component = if immediate { 1 } else { 6 };
                cursor.skip(components * per_component, "splice_insert components")?;
            }
        }

        if has_duration {
            let (flags, duration) = cursor.pts("break_duration")?;
            insert.break_duration = Some(BreakDuration {
                auto_return: flags & 0x80 != 0,
                duration,
                duration_secs: ticks_to_secs(duration),
            });
        }

        if cursor.remaining() >= 4 {
            insert.unique_program_id = cursor.u16("unique_program_id")?;
            insert.avail_num = cursor.u8("avail_num")?;
            insert.avails_expected = cursor.u8("avails_expected")?;
        }
        Ok(insert)
    }
}

/// A decoded `splice_info_section`.
#[derive(Debug, Clone, Serialize)]
pub struct SpliceInfoSection {
    pub table_id: u8,
    pub section_length: u16,
    pub protocol_version: u8,
    pub encrypted_packet: bool,
    pub pts_adjustment: u64,
    pub cw_index: u8,
    pub tier: u16,
    pub splice_command_length: u16,
    pub splice_command_type: SpliceCommandType,
    pub splice_command: SpliceCommand,
    pub descriptors: Vec<SpliceDescriptor>,
    /// CRC mismatches are reported here rather than rejected.
    pub crc_valid: bool,
}

impl SpliceInfoSection {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Scte35Error::InsufficientData {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != TABLE_ID {
            return Err(Scte35Error::InvalidTableId {
                expected: TABLE_ID,
                actual: bytes[0],
            });
        }

        let section_length = u16::from_be_bytes([bytes[1], bytes[2]]) & 0x0FFF;
        let total = 3 + usize::from(section_length);
        let section = bytes.get(..total).ok_or(Scte35Error::InsufficientData {
            expected: total,
            actual: bytes.len(),
        })?;

        let mut cursor = Cursor::new(section);
        cursor.skip(3, "section header")?;
        let protocol_version = cursor.u8("protocol_version")?;
        let (pts_flags, pts_adjustment) = cursor.pts("pts_adjustment")?;
        let encrypted_packet = pts_flags & 0x80 != 0;
        let cw_index = cursor.u8("cw_index")?;
        let tier_and_length = cursor.take(3, "tier")?;
        let tier = (u16::from(tier_and_length[0]) << 4) | u16::from(tier_and_length[1] >> 4);
        let splice_command_length =
            (u16::from(tier_and_length[1] & 0x0F) << 8) | u16::from(tier_and_length[2]);
        let splice_command_type = SpliceCommandType::from_byte(cursor.u8("splice_command_type")?);

        let crc_start = section.len().saturating_sub(4).max(HEADER_LEN);
        let declared = usize::from(splice_command_length) != UNDECLARED_COMMAND_LENGTH;
        let command_end = if declared {
            HEADER_LEN + usize::from(splice_command_length)
        } else {
            crc_start
        };
        if command_end > crc_start {
            return Err(Scte35Error::Malformed(format!(
                "splice command length {splice_command_length} overruns section"
            )));
        }
        let command_bytes = &section[HEADER_LEN..command_end];

        let splice_command = Self::read_command(splice_command_type, command_bytes);

        // Encrypted sections cannot be read past the command, and an
        // undeclared command length hides where the loop starts.
        let descriptors = match section.get(command_end..command_end + 2) {
            Some(len) if declared && !encrypted_packet => {
                let loop_start = command_end + 2;
                let loop_len = usize::from(u16::from_be_bytes([len[0], len[1]]))
                    .min(crc_start.saturating_sub(loop_start));
                SpliceDescriptor::parse_loop(&section[loop_start..loop_start + loop_len])
            }
            _ => Vec::new(),
        };

        Ok(SpliceInfoSection {
            table_id: TABLE_ID,
            section_length,
            protocol_version,
            encrypted_packet,
            pts_adjustment,
            cw_index,
            tier,
            splice_command_length,
            splice_command_type,
            splice_command,
            descriptors,
            crc_valid: section_crc_matches(section),
        })
    }

    fn read_command(kind: SpliceCommandType, bytes: &[u8]) -> SpliceCommand {
        let mut cursor = Cursor::new(bytes);
        let parsed = match kind {
            SpliceCommandType::SpliceNull => Ok(SpliceCommand::SpliceNull),
            SpliceCommandType::SpliceInsert => {
                SpliceInsert::read(&mut cursor).map(SpliceCommand::SpliceInsert)
            }
            SpliceCommandType::TimeSignal => read_splice_time(&mut cursor).map(|splice_time| {
                SpliceCommand::TimeSignal(TimeSignal {
                    splice_time,
                    splice_time_secs: splice_time.map(ticks_to_secs),
                })
            }),
            _ => Err(Scte35Error::Malformed(format!("no parser for {}", kind.name()))),
        };
        parsed.unwrap_or_else(|e| {
            tracing::debug!(error = %e, command = kind.name(), "keeping splice command raw");
            SpliceCommand::Other {
                data: hex::encode(bytes),
            }
        })
    }

    /// Pretty JSON rendering of the section.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Scte35Error::Malformed(e.to_string()))
    }
}
