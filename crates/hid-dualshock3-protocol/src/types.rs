//! DualShock 3 player LEDs.

#![deny(static_mut_refs)]

/// Player indicator LED bits, before the protocol's one-bit shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Dualshock3Led {
    Led1 = 0x01,
    Led2 = 0x02,
    Led3 = 0x04,
    Led4 = 0x08,
}

impl Dualshock3Led {
    /// LED for a zero-based player slot, wrapping after four.
    pub fn for_player(index: usize) -> Self {
        match index % 4 {
            0 => Self::Led1,
            1 => Self::Led2,
            2 => Self::Led3,
            _ => Self::Led4,
        }
    }
}
