//! DualShock 4 output report (report 0x05).
//!
//! The same report initializes the pad, sets the light bar and drives both
//! motors: `05 07 00 00 <weak> <strong> <R> <G> <B> 00 ...`.

#![deny(static_mut_refs)]

use padbridge_controller_types::RgbaColor;

use crate::ids::report_ids;

/// Wire size of the USB output report.
pub const OUTPUT_REPORT_LEN: usize = 32;

/// Enable flags: rumble + light bar + flash.
const OUTPUT_FLAGS: u8 = 0x07;

pub fn build_output_report(weak: u8, strong: u8, led: RgbaColor) -> [u8; OUTPUT_REPORT_LEN] {
    let mut report = [0u8; OUTPUT_REPORT_LEN];
    report[0] = report_ids::OUTPUT;
    report[1] = OUTPUT_FLAGS;
    report[4] = weak;
    report[5] = strong;
    report[6] = led.r;
    report[7] = led.g;
    report[8] = led.b;
    report
}
