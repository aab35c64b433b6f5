//! Controller drivers
//!
//! A [`Controller`] owns one physical USB device together with its
//! [`ControllerConfig`]. It brings the device up, reads and decodes reports
//! into [`RawInputData`], runs the binding engine and drives rumble.
//!
//! Drivers live in [`vendor`], one module per device family, and are picked
//! by [`vendor::create_controller`] from the configured driver name or the
//! device's VID/PID.
//!
//! [`ControllerConfig`]: padbridge_controller_types::ControllerConfig
//! [`RawInputData`]: padbridge_controller_types::RawInputData

#![deny(static_mut_refs)]

pub mod controller;
pub mod pipes;
pub mod vendor;

pub use controller::{Controller, ControllerResult, Decoded, Poll, amplitude_to_u8};
pub use pipes::{MAX_ENDPOINTS, Pipe, Pipes};
pub use vendor::{DriverKind, create_controller, driver_for_device};
