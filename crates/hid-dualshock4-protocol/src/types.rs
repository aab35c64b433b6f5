//! DualShock 4 model classification.

#![deny(static_mut_refs)]

use crate::ids::product_ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dualshock4Model {
    V1,
    V2,
    WirelessAdapter,
    Unknown,
}

impl Dualshock4Model {
    pub fn from_product_id(product_id: u16) -> Self {
        match product_id {
            product_ids::DUALSHOCK4_V1 => Self::V1,
            product_ids::DUALSHOCK4_V2 => Self::V2,
            product_ids::WIRELESS_ADAPTER => Self::WirelessAdapter,
            _ => Self::Unknown,
        }
    }
}

pub fn is_dualshock4_product(product_id: u16) -> bool {
    Dualshock4Model::from_product_id(product_id) != Dualshock4Model::Unknown
}
