//! Canonical controller model shared by every padbridge crate.
//!
//! Decoders produce [`RawInputData`], the binding engine turns it into
//! [`NormalizedButtonData`] under a [`ControllerConfig`], and the handler
//! publishes the result. The deadzone math in [`normalize`] is shared by all
//! decoders so every device type clips sticks and triggers identically.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod axis;
pub mod button;
pub mod config;
pub mod data;
pub mod device;
pub mod normalize;

pub use axis::AnalogAxis;
pub use button::ControllerButton;
pub use config::{AnalogBinding, ComboConfig, ControllerConfig, RgbaColor, StickConfig};
pub use data::{NormalizedButtonData, NormalizedStick, RawInputData};
pub use device::{ControllerFeature, ControllerType, DeviceType};

/// Raw button slots reserved for physical pins (index 0 unused).
pub const MAX_HID_CONTROLLER_BUTTONS: usize = 32;

/// Synthetic raw slot for d-pad up.
pub const DPAD_UP_BUTTON_ID: usize = MAX_HID_CONTROLLER_BUTTONS;
/// Synthetic raw slot for d-pad down.
pub const DPAD_DOWN_BUTTON_ID: usize = MAX_HID_CONTROLLER_BUTTONS + 1;
/// Synthetic raw slot for d-pad left.
pub const DPAD_LEFT_BUTTON_ID: usize = MAX_HID_CONTROLLER_BUTTONS + 2;
/// Synthetic raw slot for d-pad right.
pub const DPAD_RIGHT_BUTTON_ID: usize = MAX_HID_CONTROLLER_BUTTONS + 3;

/// Size of both the raw and the normalized button arrays.
pub const MAX_CONTROLLER_BUTTONS: usize = 36;

/// Physical pins a single logical button may be bound to.
pub const MAX_PIN_BY_BUTTONS: usize = 2;

/// Chord entries per controller.
pub const MAX_CONTROLLER_COMBO: usize = 16;

/// Published sticks.
pub const MAX_JOYSTICKS: usize = 2;
