//! Host-to-adapter commands.

#![deny(static_mut_refs)]

use crate::ids::{PORT_COUNT, report_ids};

/// Written once after the interface is opened; the adapter stays silent
/// until it sees this.
pub const INIT_PACKET: [u8; 1] = [report_ids::INIT];

/// Rumble command for all four ports: `11 p0 p1 p2 p3`, one on/off byte
/// per port.
pub fn build_rumble_packet(ports: [bool; PORT_COUNT]) -> [u8; 1 + PORT_COUNT] {
    let mut packet = [0u8; 1 + PORT_COUNT];
    packet[0] = report_ids::RUMBLE;
    for (slot, on) in packet[1..].iter_mut().zip(ports) {
        *slot = u8::from(on);
    }
    packet
}
