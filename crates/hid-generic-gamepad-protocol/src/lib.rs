//! Generic USB HID gamepad with the common "four axes, hat, buttons" report
//! layout shared by most inexpensive pads.
//!
//! No report descriptor is read: offsets are fixed.

#![deny(static_mut_refs)]

pub mod input;

pub use input::{
    GenericGamepadState, HID_AXIS_CENTER, MIN_REPORT_LEN, REPORT_ID, parse_input_report,
};
