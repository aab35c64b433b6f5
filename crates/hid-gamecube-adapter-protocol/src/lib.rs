//! Nintendo GameCube controller adapter (Wii U / Switch edition).
//!
//! One USB device multiplexes four controller ports into a single 37-byte
//! report. [`parse_input_report`] splits it into per-port [`PortSlice`]s.

#![deny(static_mut_refs)]

pub mod ids;
pub mod input;
pub mod output;

pub use ids::{
    INPUT_REPORT_LEN, NINTENDO_VENDOR_ID, PORT_COUNT, PORT_SLICE_LEN, product_ids, report_ids,
    status,
};
pub use input::{AdapterReport, PortSlice, parse_input_report, parse_port_slice};
pub use output::{INIT_PACKET, build_rumble_packet};
