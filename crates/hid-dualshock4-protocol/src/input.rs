//! DualShock 4 input report parsing.
//!
//! USB report 0x01, 64 bytes. Bytes 1..4 are LX, LY, RX, RY; byte 5 holds the
//! hat in its low nibble and square, cross, circle, triangle in its high
//! nibble; byte 6 is L1, R1, L2, R2, share, options, L3, R3; byte 7 bit 0 is
//! PS and bit 1 the touchpad click; bytes 8/9 are the analog triggers.

#![deny(static_mut_refs)]

use padbridge_controller_types::normalize::{normalize_stick_u8, normalize_trigger};
use padbridge_controller_types::{AnalogAxis, ControllerConfig, RawInputData};

use crate::ids::{INPUT_REPORT_LEN, report_ids};

/// Raw pin numbers this pad reports. The hat goes to the synthetic d-pad slots.
pub mod pins {
    pub const CROSS: usize = 1;
    pub const CIRCLE: usize = 2;
    pub const TRIANGLE: usize = 3;
    pub const SQUARE: usize = 4;
    pub const L1: usize = 5;
    pub const R1: usize = 6;
    pub const L2: usize = 7;
    pub const R2: usize = 8;
    pub const SHARE: usize = 9;
    pub const OPTIONS: usize = 10;
    pub const TOUCHPAD: usize = 11;
    pub const PS: usize = 12;
    pub const L3: usize = 13;
    pub const R3: usize = 14;
}

/// Parsed DualShock 4 input report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dualshock4InputState {
    pub left_x: u8,
    pub left_y: u8,
    pub right_x: u8,
    pub right_y: u8,
    /// Hat switch, 0 = up clockwise, 8 = neutral.
    pub hat: u8,
    pub square: bool,
    pub cross: bool,
    pub circle: bool,
    pub triangle: bool,
    pub l1: bool,
    pub r1: bool,
    pub l2: bool,
    pub r2: bool,
    pub share: bool,
    pub options: bool,
    pub l3: bool,
    pub r3: bool,
    pub ps: bool,
    pub touchpad: bool,
    pub l2_analog: u8,
    pub r2_analog: u8,
}

#[inline]
fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

/// Parse a DualShock 4 USB input report.
///
/// Returns `None` if `data` is shorter than 64 bytes or is not report 0x01.
pub fn parse_input_report(data: &[u8]) -> Option<Dualshock4InputState> {
    if data.len() < INPUT_REPORT_LEN || data[0] != report_ids::INPUT {
        return None;
    }

    let b5 = data[5];
    let b6 = data[6];
    let b7 = data[7];

    Some(Dualshock4InputState {
        left_x: data[1],
        left_y: data[2],
        right_x: data[3],
        right_y: data[4],
        hat: b5 & 0x0F,
        square: bit(b5, 4),
        cross: bit(b5, 5),
        circle: bit(b5, 6),
        triangle: bit(b5, 7),
        l1: bit(b6, 0),
        r1: bit(b6, 1),
        l2: bit(b6, 2),
        r2: bit(b6, 3),
        share: bit(b6, 4),
        options: bit(b6, 5),
        l3: bit(b6, 6),
        r3: bit(b6, 7),
        ps: bit(b7, 0),
        touchpad: bit(b7, 1),
        l2_analog: data[8],
        r2_analog: data[9],
    })
}

impl Dualshock4InputState {
    /// Canonical raw data with the configured stick and trigger deadzones
    /// applied.
    pub fn to_raw_input(&self, config: &ControllerConfig) -> RawInputData {
        let mut raw = RawInputData::new();

        let (lx, ly) = normalize_stick_u8(self.left_x, self.left_y, config.deadzone(AnalogAxis::X));
        let (rx, ry) = normalize_stick_u8(self.right_x, self.right_y, config.deadzone(AnalogAxis::Z));
        raw.set_axis(AnalogAxis::X, lx);
        raw.set_axis(AnalogAxis::Y, ly);
        raw.set_axis(AnalogAxis::Z, rx);
        raw.set_axis(AnalogAxis::Rz, ry);
        raw.set_axis(
            AnalogAxis::Rx,
            normalize_trigger(self.l2_analog, config.deadzone(AnalogAxis::Rx)),
        );
        raw.set_axis(
            AnalogAxis::Ry,
            normalize_trigger(self.r2_analog, config.deadzone(AnalogAxis::Ry)),
        );

        raw.set_button(pins::CROSS, self.cross);
        raw.set_button(pins::CIRCLE, self.circle);
        raw.set_button(pins::TRIANGLE, self.triangle);
        raw.set_button(pins::SQUARE, self.square);
        raw.set_button(pins::L1, self.l1);
        raw.set_button(pins::R1, self.r1);
        raw.set_button(pins::L2, self.l2);
        raw.set_button(pins::R2, self.r2);
        raw.set_button(pins::SHARE, self.share);
        raw.set_button(pins::OPTIONS, self.options);
        raw.set_button(pins::TOUCHPAD, self.touchpad);
        raw.set_button(pins::PS, self.ps);
        raw.set_button(pins::L3, self.l3);
        raw.set_button(pins::R3, self.r3);
        raw.set_dpad_from_hat(self.hat);

        raw
    }
}
