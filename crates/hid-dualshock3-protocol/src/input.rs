//! DualShock 3 input report parsing.
//!
//! Report layout (USB, report ID 0x01, 49 bytes):
//!
//! | Byte | Content |
//! |------|---------|
//! | 2 | select, L3, R3, start, up, right, down, left (bit 0..7) |
//! | 3 | L2, R2, L1, R1, triangle, circle, cross, square |
//! | 4 | PS (bit 0) |
//! | 6..9 | LX, LY, RX, RY |
//! | 18, 19 | L2 / R2 pressure |

#![deny(static_mut_refs)]

use padbridge_controller_types::normalize::{normalize_stick_u8, normalize_trigger};
use padbridge_controller_types::{AnalogAxis, ControllerConfig, RawInputData};

use crate::ids::{INPUT_REPORT_LEN, report_ids};

/// Raw pin numbers this pad reports. The d-pad goes to the synthetic slots.
pub mod pins {
    pub const CROSS: usize = 1;
    pub const CIRCLE: usize = 2;
    pub const TRIANGLE: usize = 3;
    pub const SQUARE: usize = 4;
    pub const L1: usize = 5;
    pub const R1: usize = 6;
    pub const L2: usize = 7;
    pub const R2: usize = 8;
    pub const SELECT: usize = 9;
    pub const START: usize = 10;
    pub const PS: usize = 12;
    pub const L3: usize = 13;
    pub const R3: usize = 14;
}

/// Parsed DualShock 3 input report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dualshock3InputState {
    pub select: bool,
    pub l3: bool,
    pub r3: bool,
    pub start: bool,
    pub dpad_up: bool,
    pub dpad_right: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub l2: bool,
    pub r2: bool,
    pub l1: bool,
    pub r1: bool,
    pub triangle: bool,
    pub circle: bool,
    pub cross: bool,
    pub square: bool,
    pub ps: bool,
    pub left_x: u8,
    pub left_y: u8,
    pub right_x: u8,
    pub right_y: u8,
    pub l2_pressure: u8,
    pub r2_pressure: u8,
}

#[inline]
fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

/// Parse a DualShock 3 input report.
///
/// Returns `None` if `data` is shorter than 49 bytes or is not report 0x01.
pub fn parse_input_report(data: &[u8]) -> Option<Dualshock3InputState> {
    if data.len() < INPUT_REPORT_LEN || data[0] != report_ids::INPUT {
        return None;
    }

    let b2 = data[2];
    let b3 = data[3];

    Some(Dualshock3InputState {
        select: bit(b2, 0),
        l3: bit(b2, 1),
        r3: bit(b2, 2),
        start: bit(b2, 3),
        dpad_up: bit(b2, 4),
        dpad_right: bit(b2, 5),
        dpad_down: bit(b2, 6),
        dpad_left: bit(b2, 7),
        l2: bit(b3, 0),
        r2: bit(b3, 1),
        l1: bit(b3, 2),
        r1: bit(b3, 3),
        triangle: bit(b3, 4),
        circle: bit(b3, 5),
        cross: bit(b3, 6),
        square: bit(b3, 7),
        ps: bit(data[4], 0),
        left_x: data[6],
        left_y: data[7],
        right_x: data[8],
        right_y: data[9],
        l2_pressure: data[18],
        r2_pressure: data[19],
    })
}

impl Dualshock3InputState {
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
            normalize_trigger(self.l2_pressure, config.deadzone(AnalogAxis::Rx)),
        );
        raw.set_axis(
            AnalogAxis::Ry,
            normalize_trigger(self.r2_pressure, config.deadzone(AnalogAxis::Ry)),
        );

        raw.set_button(pins::CROSS, self.cross);
        raw.set_button(pins::CIRCLE, self.circle);
        raw.set_button(pins::TRIANGLE, self.triangle);
        raw.set_button(pins::SQUARE, self.square);
        raw.set_button(pins::L1, self.l1);
        raw.set_button(pins::R1, self.r1);
        raw.set_button(pins::L2, self.l2);
        raw.set_button(pins::R2, self.r2);
        raw.set_button(pins::SELECT, self.select);
        raw.set_button(pins::START, self.start);
        raw.set_button(pins::PS, self.ps);
        raw.set_button(pins::L3, self.l3);
        raw.set_button(pins::R3, self.r3);
        raw.set_dpad(self.dpad_up, self.dpad_down, self.dpad_left, self.dpad_right);

        raw
    }
}
