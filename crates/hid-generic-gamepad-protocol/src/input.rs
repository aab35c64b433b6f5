//! Generic gamepad report.
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | report id `0x01` |
//! | 1..4 | X, Y, Z, Rz (`0..=255`, centred `0x80`) |
//! | 5 | hat (low nibble, 0 = up, clockwise, >7 neutral), buttons 1..4 (high nibble) |
//! | 6 | buttons 5..12 |
//! | 7 | buttons 13..20 |
//! | 8, 9 | Rx, Ry triggers (optional) |
//! | 10, 11 | Slider, Dial (optional) |

#![deny(static_mut_refs)]

use padbridge_controller_types::normalize::{normalize_stick, normalize_trigger};
use padbridge_controller_types::{AnalogAxis, ControllerConfig, RawInputData};

pub const REPORT_ID: u8 = 0x01;

/// Report id, four axes, hat byte and two button bytes.
pub const MIN_REPORT_LEN: usize = 8;

pub const HID_AXIS_CENTER: u8 = 0x80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericGamepadState {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub rz: u8,
    pub hat: u8,
    /// Bit `n` is button `n + 1`; 20 buttons used.
    pub buttons: u32,
    pub rx: Option<u8>,
    pub ry: Option<u8>,
    pub slider: Option<u8>,
    pub dial: Option<u8>,
}

pub fn parse_input_report(data: &[u8]) -> Option<GenericGamepadState> {
    if data.len() < MIN_REPORT_LEN || data[0] != REPORT_ID {
        return None;
    }
    let buttons =
        u32::from(data[5] >> 4) | (u32::from(data[6]) << 4) | (u32::from(data[7]) << 12);
    Some(GenericGamepadState {
        x: data[1],
        y: data[2],
        z: data[3],
        rz: data[4],
        hat: data[5] & 0x0F,
        buttons,
        rx: data.get(8).copied(),
        ry: data.get(9).copied(),
        slider: data.get(10).copied(),
        dial: data.get(11).copied(),
    })
}

/// Unsigned axis to 127 units around the HID centre.
#[inline]
fn centered(raw: u8) -> f32 {
    f32::from(raw) - f32::from(HID_AXIS_CENTER)
}

impl GenericGamepadState {
    pub const BUTTON_COUNT: usize = 20;

    pub fn to_raw_input(&self, config: &ControllerConfig) -> RawInputData {
        let mut raw = RawInputData::new();

        let (lx, ly) =
            normalize_stick(centered(self.x), centered(self.y), config.deadzone(AnalogAxis::X));
        let (rx, ry) =
            normalize_stick(centered(self.z), centered(self.rz), config.deadzone(AnalogAxis::Z));
        raw.set_axis(AnalogAxis::X, lx);
        raw.set_axis(AnalogAxis::Y, ly);
        raw.set_axis(AnalogAxis::Z, rx);
        raw.set_axis(AnalogAxis::Rz, ry);

        let triggers = [(AnalogAxis::Rx, self.rx), (AnalogAxis::Ry, self.ry)];
        for (axis, value) in triggers {
            if let Some(value) = value {
                raw.set_axis(axis, normalize_trigger(value, config.deadzone(axis)));
            }
        }
        // Slider and dial are absolute controls, centred like sticks
        let absolutes = [(AnalogAxis::Slider, self.slider), (AnalogAxis::Dial, self.dial)];
        for (axis, value) in absolutes {
            if let Some(value) = value {
                let unit = (centered(value) / 127.0).clamp(-1.0, 1.0);
                raw.set_axis(axis, unit);
            }
        }

        for bit in 0..Self::BUTTON_COUNT {
            raw.set_button(bit + 1, self.buttons & (1 << bit) != 0);
        }
        raw.set_dpad_from_hat(self.hat);

        raw
    }
}
