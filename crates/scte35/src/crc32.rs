//! MPEG-2 CRC-32 used by PSI sections, SCTE-35 included.
//!
//! Polynomial 0x04C11DB7, initial value 0xFFFFFFFF, MSB first, no final XOR.

const POLYNOMIAL: u32 = 0x04C1_1DB7;

/// Compute the MPEG-2 CRC-32 of `data`.
pub fn mpeg2_crc32(data: &[u8]) -> u32 {
    data.iter().fold(0xFFFF_FFFF, |crc, &byte| {
        let mut crc = crc ^ ((byte as u32) << 24);
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
        }
        crc
    })
}

/// A section whose last four bytes hold its CRC-32 checksums to zero.
pub fn section_crc_matches(section: &[u8]) -> bool {
    section.len() >= 4 && mpeg2_crc32(section) == 0
}
