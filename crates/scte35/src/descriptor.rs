use serde::Serialize;

/// splice_descriptor_tag of a segmentation_descriptor
pub const SEGMENTATION_DESCRIPTOR_TAG: u8 = 0x02;

/// A single entry of the splice descriptor loop.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "descriptor", rename_all = "snake_case")]
pub enum SpliceDescriptor {
    Segmentation(SegmentationDescriptor),
    Other {
        tag: u8,
        identifier: String,
        data: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentationDescriptor {
    pub identifier: String,
    pub segmentation_event_id: u32,
    pub segmentation_event_cancel_indicator: bool,
    pub program_segmentation_flag: bool,
    pub delivery_not_restricted_flag: bool,
    /// Duration in 90kHz ticks (40-bit)
    pub segmentation_duration: Option<u64>,
    pub segmentation_duration_secs: Option<f64>,
    pub segmentation_upid_type: u8,
    pub segmentation_upid: String,
    pub segmentation_type_id: u8,
    pub segmentation_type_name: &'static str,
    pub segment_num: u8,
    pub segments_expected: u8,
}

fn identifier_text(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| b.is_ascii_graphic()) {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        hex::encode(bytes)
    }
}

/// Human name of a segmentation_type_id.
pub fn segmentation_type_name(type_id: u8) -> &'static str {
    match type_id {
        0x00 => "Not Indicated",
        0x01 => "Content Identification",
        0x10 => "Program Start",
        0x11 => "Program End",
        0x12 => "Program Early Termination",
        0x13 => "Program Breakaway",
        0x14 => "Program Resumption",
        0x17 => "Program Overlap Start",
        0x20 => "Chapter Start",
        0x21 => "Chapter End",
        0x22 => "Break Start",
        0x23 => "Break End",
        0x30 => "Provider Advertisement Start",
        0x31 => "Provider Advertisement End",
        0x32 => "Distributor Advertisement Start",
        0x33 => "Distributor Advertisement End",
        0x34 => "Provider Placement Opportunity Start",
        0x35 => "Provider Placement Opportunity End",
        0x36 => "Distributor Placement Opportunity Start",
        0x37 => "Distributor Placement Opportunity End",
        0x40 => "Unscheduled Event Start",
        0x41 => "Unscheduled Event End",
        0x50 => "Network Start",
        0x51 => "Network End",
        _ => "Unknown",
    }
}

impl SpliceDescriptor {
    /// Parse the descriptor loop. Entries that run past the end of the loop
    /// stop parsing; what was read so far is kept.
    pub fn parse_loop(mut data: &[u8]) -> Vec<SpliceDescriptor> {
        let mut descriptors = Vec::new();
        while data.len() >= 2 {
            let tag = data[0];
            let length = data[1] as usize;
            if data.len() < 2 + length || length < 4 {
                tracing::debug!(tag, length, "truncated splice descriptor, stopping");
                break;
            }
            let body = &data[2..2 + length];
            let identifier = identifier_text(&body[..4]);
            let descriptor = match tag {
                SEGMENTATION_DESCRIPTOR_TAG => {
                    match SegmentationDescriptor::parse(identifier.clone(), &body[4..]) {
                        Some(seg) => SpliceDescriptor::Segmentation(seg),
                        None => SpliceDescriptor::Other {
                            tag,
                            identifier,
                            data: hex::encode(&body[4..]),
                        },
                    }
                }
                _ => SpliceDescriptor::Other {
                    tag,
                    identifier,
                    data: hex::encode(&body[4..]),
                },
            };
            descriptors.push(descriptor);
            data = &data[2 + length..];
        }
        descriptors
    }
}

impl SegmentationDescriptor {
    /// Parse the bytes following the 4-byte identifier.
    fn parse(identifier: String, data: &[u8]) -> Option<Self> {
        if data.len() < 5 {
            return None;
        }
        let segmentation_event_id = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let cancel = (data[4] & 0x80) != 0;

        let mut descriptor = SegmentationDescriptor {
            identifier,
            segmentation_event_id,
            segmentation_event_cancel_indicator: cancel,
            program_segmentation_flag: false,
            delivery_not_restricted_flag: false,
            segmentation_duration: None,
            segmentation_duration_secs: None,
            segmentation_upid_type: 0,
            segmentation_upid: String::new(),
            segmentation_type_id: 0,
            segmentation_type_name: segmentation_type_name(0),
            segment_num: 0,
            segments_expected: 0,
        };
        if cancel {
            return Some(descriptor);
        }

        let flags = *data.get(5)?;
        descriptor.program_segmentation_flag = (flags & 0x80) != 0;
        let duration_flag = (flags & 0x40) != 0;
        descriptor.delivery_not_restricted_flag = (flags & 0x20) != 0;

        let mut offset = 6;
        if !descriptor.program_segmentation_flag {
            let component_count = *data.get(offset)? as usize;
            offset += 1 + component_count * 6;
        }

        if duration_flag {
            let d = data.get(offset..offset + 5)?;
            let ticks = ((d[0] as u64) << 32)
                | ((d[1] as u64) << 24)
                | ((d[2] as u64) << 16)
                | ((d[3] as u64) << 8)
                | (d[4] as u64);
            descriptor.segmentation_duration = Some(ticks);
            descriptor.segmentation_duration_secs = Some(ticks as f64 / 90_000.0);
            offset += 5;
        }

        descriptor.segmentation_upid_type = *data.get(offset)?;
        let upid_length = *data.get(offset + 1)? as usize;
        offset += 2;
        descriptor.segmentation_upid = hex::encode(data.get(offset..offset + upid_length)?);
        offset += upid_length;

        let tail = data.get(offset..offset + 3)?;
        descriptor.segmentation_type_id = tail[0];
        descriptor.segmentation_type_name = segmentation_type_name(tail[0]);
        descriptor.segment_num = tail[1];
        descriptor.segments_expected = tail[2];

        Some(descriptor)
    }
}
