//! Sony DualShock 3 (SIXAXIS) USB protocol: bring-up, input parsing and the
//! combined LED/rumble output report.
//!
//! This crate is I/O-free. The controller driver sends the byte arrays built
//! here through HID SET_REPORT control transfers.

#![deny(static_mut_refs)]

pub mod ids;
pub mod input;
pub mod output;
pub mod types;

pub use ids::{INPUT_REPORT_LEN, SONY_VENDOR_ID, features, product_ids, report_ids};
pub use input::{Dualshock3InputState, parse_input_report, pins};
pub use output::{OUTPUT_REPORT_LEN, START_DEVICE_PAYLOAD, build_output_report};
pub use types::Dualshock3Led;
