//! Sony USB identifiers and DualShock 4 report constants.

#![deny(static_mut_refs)]

/// Sony USB vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

pub mod product_ids {
    /// DualShock 4, first revision (CUH-ZCT1).
    pub const DUALSHOCK4_V1: u16 = 0x05C4;
    /// DualShock 4, second revision (CUH-ZCT2).
    pub const DUALSHOCK4_V2: u16 = 0x09CC;
    /// Sony USB wireless adapter.
    pub const WIRELESS_ADAPTER: u16 = 0x0BA0;
}

pub mod report_ids {
    /// USB input report.
    pub const INPUT: u8 = 0x01;
    /// Rumble + light bar output report.
    pub const OUTPUT: u8 = 0x05;
}

/// Size of the USB input report.
pub const INPUT_REPORT_LEN: usize = 64;
