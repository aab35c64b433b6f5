//! GIP packets sent to the pad.

#![deny(static_mut_refs)]

use crate::ids::report_ids;

/// Power-on: the pad only streams input after receiving it.
pub const POWER_ON_PACKET: [u8; 5] = [report_ids::POWER, 0x20, 0x00, 0x01, 0x00];

pub const RUMBLE_PACKET_LEN: usize = 13;

/// Rumble packet: `09 00 00 09 00 0F 00 00 <strong> <weak> FF 00 00`.
pub fn build_rumble_packet(strong: u8, weak: u8) -> [u8; RUMBLE_PACKET_LEN] {
    [
        report_ids::RUMBLE,
        0x00,
        0x00,
        0x09,
        0x00,
        0x0F,
        0x00,
        0x00,
        strong,
        weak,
        0xFF,
        0x00,
        0x00,
    ]
}

/// Acknowledges a guide packet that requested it.
pub fn build_guide_ack(sequence: u8) -> [u8; 13] {
    [
        report_ids::ACK,
        0x20,
        sequence,
        0x09,
        0x00,
        report_ids::GUIDE,
        0x20,
        0x02,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rumble_layout() {
        assert_eq!(
            build_rumble_packet(0xAA, 0x55),
            [0x09, 0x00, 0x00, 0x09, 0x00, 0x0F, 0x00, 0x00, 0xAA, 0x55, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn test_guide_ack_carries_sequence() {
        let ack = build_guide_ack(0x42);
        assert_eq!(ack[0], report_ids::ACK);
        assert_eq!(ack[2], 0x42);
        assert_eq!(ack[5], report_ids::GUIDE);
    }
}
