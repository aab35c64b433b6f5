//! Stage 1: pins and analog bindings.

use padbridge_controller_types::{
    AnalogBinding, ControllerButton, ControllerConfig, DPAD_DOWN_BUTTON_ID, DPAD_LEFT_BUTTON_ID,
    DPAD_RIGHT_BUTTON_ID, DPAD_UP_BUTTON_ID, MAX_JOYSTICKS, NormalizedButtonData, RawInputData,
};

use crate::ANALOG_BUTTON_THRESHOLD;

/// Which stick axes (`[x, y]` per stick) came from an analog binding.
pub type BoundAxes = [[bool; 2]; MAX_JOYSTICKS];

/// Raw slot the decoders fill for a d-pad direction.
pub fn dpad_slot(button: ControllerButton) -> Option<usize> {
    match button {
        ControllerButton::DpadUp => Some(DPAD_UP_BUTTON_ID),
        ControllerButton::DpadDown => Some(DPAD_DOWN_BUTTON_ID),
        ControllerButton::DpadLeft => Some(DPAD_LEFT_BUTTON_ID),
        ControllerButton::DpadRight => Some(DPAD_RIGHT_BUTTON_ID),
        _ => None,
    }
}

/// Signed, scaled value of an analog binding, clamped to `[-1, 1]`.
pub fn analog_value(raw: &RawInputData, config: &ControllerConfig, binding: AnalogBinding) -> f32 {
    let factor = f32::from(config.factor(binding.axis)) / 100.0;
    (binding.sign * raw.axis(binding.axis) * factor).clamp(-1.0, 1.0)
}

/// A logical button is pressed when any of its pins is, when its analog
/// binding passes [`ANALOG_BUTTON_THRESHOLD`], or (for d-pad buttons) when
/// the decoder reported the direction.
pub fn button_pressed(raw: &RawInputData, config: &ControllerConfig, button: ControllerButton) -> bool {
    let by_pin = config
        .pins(button)
        .iter()
        .any(|&pin| pin != 0 && raw.button(usize::from(pin)));
    let by_analog = config.buttons_analog[button.index()]
        .is_some_and(|binding| binding.sign * raw.axis(binding.axis) > ANALOG_BUTTON_THRESHOLD);
    let by_dpad = dpad_slot(button).is_some_and(|slot| raw.button(slot));
    by_pin || by_analog || by_dpad
}

/// Fills buttons and bound stick axes; unbound axes stay 0.
pub fn resolve(raw: &RawInputData, config: &ControllerConfig, out: &mut NormalizedButtonData) -> BoundAxes {
    for button in ControllerButton::ALL {
        out.set(button, button_pressed(raw, config, button));
    }

    let mut bound = [[false; 2]; MAX_JOYSTICKS];
    for ((stick_cfg, stick), bound) in config.sticks.iter().zip(out.sticks.iter_mut()).zip(bound.iter_mut()) {
        if let Some(binding) = stick_cfg.x {
            stick.axis_x = analog_value(raw, config, binding);
            bound[0] = true;
        }
        if let Some(binding) = stick_cfg.y {
            stick.axis_y = analog_value(raw, config, binding);
            bound[1] = true;
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use padbridge_controller_types::AnalogAxis;

    #[test]
    fn test_analog_button_threshold_is_strict() {
        let config = ControllerConfig::default()
            .with_button_analog(ControllerButton::ZL, AnalogBinding::positive(AnalogAxis::Rx));
        let mut raw = RawInputData::new();
        raw.set_axis(AnalogAxis::Rx, 0.5);
        assert!(!button_pressed(&raw, &config, ControllerButton::ZL));
        raw.set_axis(AnalogAxis::Rx, 0.51);
        assert!(button_pressed(&raw, &config, ControllerButton::ZL));
    }

    #[test]
    fn test_negative_analog_binding() {
        let config = ControllerConfig::default()
            .with_button_analog(ControllerButton::DpadLeft, AnalogBinding::negative(AnalogAxis::X));
        let mut raw = RawInputData::new();
        raw.set_axis(AnalogAxis::X, -0.9);
        assert!(button_pressed(&raw, &config, ControllerButton::DpadLeft));
        raw.set_axis(AnalogAxis::X, 0.9);
        assert!(!button_pressed(&raw, &config, ControllerButton::DpadLeft));
    }

    #[test]
    fn test_factor_scales_and_clamps() {
        let config = ControllerConfig::default().with_factor(AnalogAxis::X, 200);
        let mut raw = RawInputData::new();
        raw.set_axis(AnalogAxis::X, 0.25);
        let value = analog_value(&raw, &config, AnalogBinding::positive(AnalogAxis::X));
        assert!((value - 0.5).abs() < 1e-6);
        raw.set_axis(AnalogAxis::X, 0.9);
        let value = analog_value(&raw, &config, AnalogBinding::negative(AnalogAxis::X));
        assert!((value + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pin_zero_never_matches() {
        let config = ControllerConfig::default();
        let mut raw = RawInputData::new();
        raw.set_button(0, true);
        assert!(!button_pressed(&raw, &config, ControllerButton::A));
    }
}
