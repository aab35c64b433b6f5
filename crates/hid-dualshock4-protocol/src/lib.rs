//! Sony DualShock 4 USB protocol: input parsing and the light bar / rumble
//! output report.
//!
//! This crate is I/O-free and allocation-free.

#![deny(static_mut_refs)]

pub mod ids;
pub mod input;
pub mod output;
pub mod types;

pub use ids::{INPUT_REPORT_LEN, SONY_VENDOR_ID, product_ids, report_ids};
pub use input::{Dualshock4InputState, parse_input_report, pins};
pub use output::{OUTPUT_REPORT_LEN, build_output_report};
pub use types::{Dualshock4Model, is_dualshock4_product};
