//! Microsoft USB identifiers and GIP command bytes.

#![deny(static_mut_refs)]

/// Microsoft USB vendor ID.
pub const MICROSOFT_VENDOR_ID: u16 = 0x045E;

pub mod product_ids {
    pub const XBOX_ONE: u16 = 0x02D1;
    pub const XBOX_ONE_2015: u16 = 0x02DD;
    pub const XBOX_ONE_ELITE: u16 = 0x02E3;
    pub const XBOX_ONE_S: u16 = 0x02EA;
    pub const XBOX_ONE_ELITE_2: u16 = 0x0B00;
    pub const XBOX_SERIES: u16 = 0x0B12;
}

/// GIP command bytes (first byte of every packet).
pub mod report_ids {
    /// Acknowledge
    pub const ACK: u8 = 0x01;
    /// Device power / mode
    pub const POWER: u8 = 0x05;
    /// Guide button state
    pub const GUIDE: u8 = 0x07;
    /// Rumble
    pub const RUMBLE: u8 = 0x09;
    /// Buttons, triggers and sticks
    pub const INPUT: u8 = 0x20;
}

pub fn is_xbox_one_product(product_id: u16) -> bool {
    matches!(
        product_id,
        product_ids::XBOX_ONE
            | product_ids::XBOX_ONE_2015
            | product_ids::XBOX_ONE_ELITE
            | product_ids::XBOX_ONE_S
            | product_ids::XBOX_ONE_ELITE_2
            | product_ids::XBOX_SERIES
    )
}
