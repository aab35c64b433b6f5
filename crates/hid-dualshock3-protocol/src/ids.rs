//! Sony USB identifiers and DualShock 3 report constants.

#![deny(static_mut_refs)]

/// Sony USB vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

pub mod product_ids {
    /// DualShock 3 / SIXAXIS.
    pub const DUALSHOCK3: u16 = 0x0268;
}

pub mod report_ids {
    /// Button/axis input report.
    pub const INPUT: u8 = 0x01;
}

/// `wValue` of the SET_REPORT feature requests the pad understands.
pub mod features {
    /// Starts streaming input reports (feature report 0xF4).
    pub const START_DEVICE: u16 = 0x03F4;
    /// Output report 0x01: rumble and player LEDs.
    pub const OUTPUT: u16 = 0x0201;
}

/// Size of the USB input report.
pub const INPUT_REPORT_LEN: usize = 49;
