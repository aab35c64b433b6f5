//! Adapter input report parsing.
//!
//! Report 0x21 is followed by four 9-byte port slices:
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | status (extra power, normal, wavebird) |
//! | 1..2 | button word, LE; bit `n` maps to raw pin `n + 1` |
//! | 3..8 | main X/Y, C-stick X/Y, L/R analog |
//!
//! The adapter reports all six axes on the full `0..=255` range; they are
//! mapped to `[-1, 1]` without a deadzone.

#![deny(static_mut_refs)]

use padbridge_controller_types::normalize::u8_to_unit;
use padbridge_controller_types::{AnalogAxis, RawInputData};

use crate::ids::{INPUT_REPORT_LEN, PORT_COUNT, PORT_SLICE_LEN, report_ids, status};

/// Axis order of the six analog bytes of a port slice.
const SLICE_AXES: [AnalogAxis; 6] = [
    AnalogAxis::X,
    AnalogAxis::Y,
    AnalogAxis::Rx,
    AnalogAxis::Ry,
    AnalogAxis::Z,
    AnalogAxis::Rz,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortSlice {
    pub status: u8,
    pub buttons: u16,
    pub axes: [u8; 6],
}

/// One full adapter report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterReport {
    pub ports: [PortSlice; PORT_COUNT],
}

/// Parse a 9-byte port slice.
pub fn parse_port_slice(data: &[u8]) -> Option<PortSlice> {
    if data.len() < PORT_SLICE_LEN {
        return None;
    }
    let mut axes = [0u8; 6];
    axes.copy_from_slice(&data[3..PORT_SLICE_LEN]);
    Some(PortSlice {
        status: data[0],
        buttons: u16::from_le_bytes([data[1], data[2]]),
        axes,
    })
}

/// Parse a full adapter report. Returns `None` for a wrong marker or a
/// short read.
pub fn parse_input_report(data: &[u8]) -> Option<AdapterReport> {
    if data.len() < INPUT_REPORT_LEN || data[0] != report_ids::INPUT {
        return None;
    }
    let mut report = AdapterReport::default();
    for (port, slot) in report.ports.iter_mut().enumerate() {
        let start = 1 + port * PORT_SLICE_LEN;
        *slot = parse_port_slice(&data[start..start + PORT_SLICE_LEN])?;
    }
    Some(report)
}

impl PortSlice {
    /// A controller (wired or wavebird) is plugged into this port.
    pub fn is_connected(&self) -> bool {
        self.status & (status::NORMAL | status::WAVEBIRD) != 0
    }

    /// Rumble needs the adapter's second (power) cable.
    pub fn rumble_supported(&self) -> bool {
        self.status & status::EXTRA_POWER != 0
    }

    /// Raw data for this port, or `None` when nothing is plugged in.
    pub fn to_raw_input(&self) -> Option<RawInputData> {
        if !self.is_connected() {
            return None;
        }
        let mut raw = RawInputData::new();
        for bit in 0..16 {
            raw.set_button(bit + 1, self.buttons & (1 << bit) != 0);
        }
        for (axis, value) in SLICE_AXES.iter().zip(self.axes) {
            raw.set_axis(*axis, u8_to_unit(value));
        }
        Some(raw)
    }
}
