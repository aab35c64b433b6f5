//! Adapter identifiers, report markers and port status bits.

#![deny(static_mut_refs)]

pub const NINTENDO_VENDOR_ID: u16 = 0x057E;

pub mod product_ids {
    pub const GAMECUBE_ADAPTER: u16 = 0x0337;
}

pub mod report_ids {
    /// Input report carrying all four ports.
    pub const INPUT: u8 = 0x21;
    /// Host command: per-port rumble.
    pub const RUMBLE: u8 = 0x11;
    /// Host command: start polling.
    pub const INIT: u8 = 0x13;
}

/// Port status byte.
pub mod status {
    /// External power plugged in; rumble only works with it.
    pub const EXTRA_POWER: u8 = 0x04;
    pub const NORMAL: u8 = 0x10;
    pub const WAVEBIRD: u8 = 0x20;
}

pub const PORT_COUNT: usize = 4;
pub const PORT_SLICE_LEN: usize = 9;
pub const INPUT_REPORT_LEN: usize = 1 + PORT_COUNT * PORT_SLICE_LEN;
