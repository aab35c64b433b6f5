//! Xbox One controller protocol (GIP over USB): input parsing, power-on,
//! guide-button acknowledgement and rumble packets.
//!
//! This crate is I/O-free and allocation-free.

#![deny(static_mut_refs)]

pub mod ids;
pub mod input;
pub mod output;

pub use ids::{MICROSOFT_VENDOR_ID, is_xbox_one_product, product_ids, report_ids};
pub use input::{XboxOneInputState, XboxOneReport, parse_input_report, pins};
pub use output::{POWER_ON_PACKET, RUMBLE_PACKET_LEN, build_guide_ack, build_rumble_packet};
