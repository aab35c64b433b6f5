//! Binding engine
//!
//! Turns one poll of [`RawInputData`] into the published
//! [`NormalizedButtonData`] under a [`ControllerConfig`]. The engine is a
//! pure function: no state is kept between polls, so the same input and
//! configuration always produce the same output.
//!
//! # Stages
//!
//! Stages run in a fixed order, each one seeing the result of the previous:
//!
//! 1. [`resolve`]: physical pins and analog bindings to logical buttons and
//!    stick axes.
//! 2. [`sticks`]: stick deflection past the activation threshold presses
//!    the matching direction button; unbound stick axes are synthesized from
//!    the direction buttons.
//! 3. [`remap::apply_aliases`]: a button mirrors another one, read from a
//!    snapshot taken after stage 2.
//! 4. [`remap::apply_combos`]: a held pair of sources presses the target and
//!    releases both sources.
//!
//! # Example
//!
//! ```
//! use padbridge_binding::bind;
//! use padbridge_controller_types::{ControllerButton, ControllerConfig, RawInputData};
//!
//! let config = ControllerConfig::default().with_pins(ControllerButton::A, &[2]);
//! let mut raw = RawInputData::new();
//! raw.set_button(2, true);
//!
//! let out = bind(&raw, &config);
//! assert!(out.pressed(ControllerButton::A));
//! ```

#![deny(static_mut_refs)]

pub mod remap;
pub mod resolve;
pub mod sticks;

use padbridge_controller_types::{ControllerConfig, NormalizedButtonData, RawInputData};

/// Analog value a button-bound axis must exceed (after its sign) to press.
pub const ANALOG_BUTTON_THRESHOLD: f32 = 0.5;

/// Map one raw poll to the published layout.
pub fn bind(raw: &RawInputData, config: &ControllerConfig) -> NormalizedButtonData {
    let mut out = NormalizedButtonData::default();
    let bound_axes = resolve::resolve(raw, config, &mut out);
    sticks::apply(config, &bound_axes, &mut out);
    remap::apply_aliases(config, &mut out);
    remap::apply_combos(config, &mut out);
    out
}
