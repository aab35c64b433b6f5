//! Xbox One GIP input parsing.
//!
//! Input packet 0x20 (at least 18 bytes):
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 4..5 | button word, LE: sync, -, menu, view, A, B, X, Y, up, down, left, right, LB, RB, LS, RS |
//! | 6..9 | left / right trigger, u16 LE, 0..=1023 |
//! | 10..17 | LX, LY, RX, RY, i16 LE, Y positive up |
//!
//! The guide button arrives separately in packet 0x07 (byte 4, bit 0).

#![deny(static_mut_refs)]

use padbridge_controller_types::normalize::{normalize_stick, normalize_trigger, scale_i16};
use padbridge_controller_types::{AnalogAxis, ControllerConfig, RawInputData};

use crate::ids::report_ids;

/// Minimum length of the 0x20 input packet.
pub const INPUT_PACKET_LEN: usize = 18;

/// Minimum length of the 0x07 guide packet.
pub const GUIDE_PACKET_LEN: usize = 5;

/// Raw pin numbers this pad reports.
pub mod pins {
    pub const A: usize = 1;
    pub const B: usize = 2;
    pub const Y: usize = 3;
    pub const X: usize = 4;
    pub const LB: usize = 5;
    pub const RB: usize = 6;
    pub const LT: usize = 7;
    pub const RT: usize = 8;
    pub const VIEW: usize = 9;
    pub const MENU: usize = 10;
    pub const SYNC: usize = 11;
    pub const GUIDE: usize = 12;
    pub const LS: usize = 13;
    pub const RS: usize = 14;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XboxOneInputState {
    pub buttons: u16,
    pub trigger_left: u16,
    pub trigger_right: u16,
    pub left_x: i16,
    pub left_y: i16,
    pub right_x: i16,
    pub right_y: i16,
}

/// Packets the pad sends on its IN endpoint that carry input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XboxOneReport {
    Input(XboxOneInputState),
    /// Guide button state, and the sequence number when the pad asked for
    /// an acknowledgement.
    Guide { pressed: bool, ack_sequence: Option<u8> },
}

/// Parse a GIP packet. Returns `None` for packets that carry no input
/// (announce, status, ...) and for truncated packets.
pub fn parse_input_report(data: &[u8]) -> Option<XboxOneReport> {
    match data.first().copied()? {
        report_ids::INPUT if data.len() >= INPUT_PACKET_LEN => {
            let u16_at = |i: usize| u16::from_le_bytes([data[i], data[i + 1]]);
            let i16_at = |i: usize| i16::from_le_bytes([data[i], data[i + 1]]);
            Some(XboxOneReport::Input(XboxOneInputState {
                buttons: u16_at(4),
                trigger_left: u16_at(6),
                trigger_right: u16_at(8),
                left_x: i16_at(10),
                left_y: i16_at(12),
                right_x: i16_at(14),
                right_y: i16_at(16),
            }))
        }
        report_ids::GUIDE if data.len() >= GUIDE_PACKET_LEN => {
            // 0x30 in the flags byte means the pad expects an ACK
            let ack_sequence = (data[1] == 0x30).then_some(data[2]);
            Some(XboxOneReport::Guide {
                pressed: data[4] & 0x01 != 0,
                ack_sequence,
            })
        }
        _ => None,
    }
}

/// 10-bit trigger reduced to the 8-bit range the deadzone math uses.
#[inline]
fn trigger_u8(raw: u16) -> u8 {
    u8::try_from(raw.min(1023) >> 2).unwrap_or(u8::MAX)
}

impl XboxOneInputState {
    #[inline]
    pub fn button(&self, bit: u8) -> bool {
        self.buttons & (1 << bit) != 0
    }

    /// Canonical raw data with deadzones applied. Stick Y is flipped so
    /// positive means down.
    pub fn to_raw_input(&self, guide: bool, config: &ControllerConfig) -> RawInputData {
        let mut raw = RawInputData::new();

        let (lx, ly) = normalize_stick(
            scale_i16(self.left_x),
            -scale_i16(self.left_y),
            config.deadzone(AnalogAxis::X),
        );
        let (rx, ry) = normalize_stick(
            scale_i16(self.right_x),
            -scale_i16(self.right_y),
            config.deadzone(AnalogAxis::Z),
        );
        raw.set_axis(AnalogAxis::X, lx);
        raw.set_axis(AnalogAxis::Y, ly);
        raw.set_axis(AnalogAxis::Z, rx);
        raw.set_axis(AnalogAxis::Rz, ry);

        let lt = normalize_trigger(trigger_u8(self.trigger_left), config.deadzone(AnalogAxis::Rx));
        let rt = normalize_trigger(trigger_u8(self.trigger_right), config.deadzone(AnalogAxis::Ry));
        raw.set_axis(AnalogAxis::Rx, lt);
        raw.set_axis(AnalogAxis::Ry, rt);

        raw.set_button(pins::SYNC, self.button(0));
        raw.set_button(pins::MENU, self.button(2));
        raw.set_button(pins::VIEW, self.button(3));
        raw.set_button(pins::A, self.button(4));
        raw.set_button(pins::B, self.button(5));
        raw.set_button(pins::X, self.button(6));
        raw.set_button(pins::Y, self.button(7));
        raw.set_dpad(self.button(8), self.button(9), self.button(10), self.button(11));
        raw.set_button(pins::LB, self.button(12));
        raw.set_button(pins::RB, self.button(13));
        raw.set_button(pins::LS, self.button(14));
        raw.set_button(pins::RS, self.button(15));
        raw.set_button(pins::LT, lt > 0.0);
        raw.set_button(pins::RT, rt > 0.0);
        raw.set_button(pins::GUIDE, guide);

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_packet(buttons: u16, lt: u16, rt: u16, sticks: [i16; 4]) -> [u8; INPUT_PACKET_LEN] {
        let mut data = [0u8; INPUT_PACKET_LEN];
        data[0] = report_ids::INPUT;
        data[4..6].copy_from_slice(&buttons.to_le_bytes());
        data[6..8].copy_from_slice(&lt.to_le_bytes());
        data[8..10].copy_from_slice(&rt.to_le_bytes());
        for (i, v) in sticks.iter().enumerate() {
            let at = 10 + i * 2;
            data[at..at + 2].copy_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_buttons() -> Result<(), Box<dyn std::error::Error>> {
        // A + dpad left + RB
        let data = input_packet((1 << 4) | (1 << 10) | (1 << 13), 0, 0, [0; 4]);
        let Some(XboxOneReport::Input(state)) = parse_input_report(&data) else {
            return Err("parse failed".into());
        };
        let raw = state.to_raw_input(false, &ControllerConfig::default());
        assert!(raw.button(pins::A));
        assert!(raw.button(pins::RB));
        assert!(raw.dpad_left());
        assert!(!raw.button(pins::B) && !raw.dpad_right() && !raw.button(pins::GUIDE));
        Ok(())
    }

    #[test]
    fn test_stick_y_is_flipped() -> Result<(), Box<dyn std::error::Error>> {
        let data = input_packet(0, 0, 0, [0, i16::MAX, 0, 0]);
        let Some(XboxOneReport::Input(state)) = parse_input_report(&data) else {
            return Err("parse failed".into());
        };
        let raw = state.to_raw_input(false, &ControllerConfig::default());
        assert!(raw.axis(AnalogAxis::Y) < -0.99, "pushing up must read negative");
        Ok(())
    }

    #[test]
    fn test_triggers_and_digital_pins() -> Result<(), Box<dyn std::error::Error>> {
        let data = input_packet(0, 1023, 0, [0; 4]);
        let Some(XboxOneReport::Input(state)) = parse_input_report(&data) else {
            return Err("parse failed".into());
        };
        let raw = state.to_raw_input(false, &ControllerConfig::default());
        assert!((raw.axis(AnalogAxis::Rx) - 1.0).abs() < 1e-6);
        assert!(raw.button(pins::LT));
        assert!(!raw.button(pins::RT));
        Ok(())
    }

    #[test]
    fn test_guide_packet() {
        let report = parse_input_report(&[0x07, 0x30, 0x05, 0x02, 0x01, 0x5B]);
        assert_eq!(
            report,
            Some(XboxOneReport::Guide {
                pressed: true,
                ack_sequence: Some(0x05)
            })
        );
        let report = parse_input_report(&[0x07, 0x20, 0x06, 0x02, 0x00, 0x5B]);
        assert_eq!(
            report,
            Some(XboxOneReport::Guide {
                pressed: false,
                ack_sequence: None
            })
        );
    }

    #[test]
    fn test_non_input_packets_ignored() {
        assert!(parse_input_report(&[0x02, 0x20, 0x01, 0x1C]).is_none());
        assert!(parse_input_report(&[0x20, 0x00, 0x01]).is_none());
        assert!(parse_input_report(&[]).is_none());
    }
}
