//! Per-poll data flowing from decoders to the binding engine and on to the
//! backend.

use crate::{
    AnalogAxis, ControllerButton, DPAD_DOWN_BUTTON_ID, DPAD_LEFT_BUTTON_ID, DPAD_RIGHT_BUTTON_ID,
    DPAD_UP_BUTTON_ID, MAX_CONTROLLER_BUTTONS, MAX_JOYSTICKS,
};

/// Decoder output.
///
/// `buttons[0]` is unused, `1..=31` are physical pins and `32..=35` hold the
/// d-pad. Stick axes are in `[-1, 1]` with positive Y pointing down; trigger
/// axes are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInputData {
    pub buttons: [bool; MAX_CONTROLLER_BUTTONS],
    pub analog: [f32; AnalogAxis::COUNT],
}

impl Default for RawInputData {
    fn default() -> Self {
        Self {
            buttons: [false; MAX_CONTROLLER_BUTTONS],
            analog: [0.0; AnalogAxis::COUNT],
        }
    }
}

impl RawInputData {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a raw pin; out-of-range pins read as released.
    #[inline]
    pub fn button(&self, pin: usize) -> bool {
        self.buttons.get(pin).copied().unwrap_or(false)
    }

    /// Sets a raw pin; out-of-range pins are ignored.
    #[inline]
    pub fn set_button(&mut self, pin: usize, pressed: bool) {
        if let Some(slot) = self.buttons.get_mut(pin) {
            *slot = pressed;
        }
    }

    #[inline]
    pub fn axis(&self, axis: AnalogAxis) -> f32 {
        self.analog[axis.index()]
    }

    #[inline]
    pub fn set_axis(&mut self, axis: AnalogAxis, value: f32) {
        self.analog[axis.index()] = value;
    }

    pub fn dpad_up(&self) -> bool {
        self.buttons[DPAD_UP_BUTTON_ID]
    }

    pub fn dpad_down(&self) -> bool {
        self.buttons[DPAD_DOWN_BUTTON_ID]
    }

    pub fn dpad_left(&self) -> bool {
        self.buttons[DPAD_LEFT_BUTTON_ID]
    }

    pub fn dpad_right(&self) -> bool {
        self.buttons[DPAD_RIGHT_BUTTON_ID]
    }

    /// Sets all four d-pad slots at once.
    pub fn set_dpad(&mut self, up: bool, down: bool, left: bool, right: bool) {
        self.buttons[DPAD_UP_BUTTON_ID] = up;
        self.buttons[DPAD_DOWN_BUTTON_ID] = down;
        self.buttons[DPAD_LEFT_BUTTON_ID] = left;
        self.buttons[DPAD_RIGHT_BUTTON_ID] = right;
    }

    /// Decodes an 8-way hat (0 = up, clockwise, anything above 7 = neutral).
    pub fn set_dpad_from_hat(&mut self, hat: u8) {
        let (up, right, down, left) = match hat {
            0 => (true, false, false, false),
            1 => (true, true, false, false),
            2 => (false, true, false, false),
            3 => (false, true, true, false),
            4 => (false, false, true, false),
            5 => (false, false, true, true),
            6 => (false, false, false, true),
            7 => (true, false, false, true),
            _ => (false, false, false, false),
        };
        self.set_dpad(up, down, left, right);
    }
}

/// One published stick, both axes in `[-1, 1]`, positive Y down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedStick {
    pub axis_x: f32,
    pub axis_y: f32,
}

impl NormalizedStick {
    pub const fn new(axis_x: f32, axis_y: f32) -> Self {
        Self { axis_x, axis_y }
    }
}

/// Binding engine output; always fully initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedButtonData {
    pub buttons: [bool; MAX_CONTROLLER_BUTTONS],
    pub sticks: [NormalizedStick; MAX_JOYSTICKS],
}

impl Default for NormalizedButtonData {
    fn default() -> Self {
        Self {
            buttons: [false; MAX_CONTROLLER_BUTTONS],
            sticks: [NormalizedStick::default(); MAX_JOYSTICKS],
        }
    }
}

impl NormalizedButtonData {
    #[inline]
    pub fn pressed(&self, button: ControllerButton) -> bool {
        self.buttons[button.index()]
    }

    #[inline]
    pub fn set(&mut self, button: ControllerButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Buttons currently pressed, in index order.
    pub fn pressed_buttons(&self) -> impl Iterator<Item = ControllerButton> + '_ {
        ControllerButton::ALL
            .into_iter()
            .filter(move |b| self.pressed(*b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_pin_is_released() {
        let mut raw = RawInputData::new();
        raw.set_button(99, true);
        assert!(!raw.button(99));
        raw.set_button(31, true);
        assert!(raw.button(31));
    }

    #[test]
    fn test_hat_decoding() {
        let mut raw = RawInputData::new();
        raw.set_dpad_from_hat(1);
        assert!(raw.dpad_up() && raw.dpad_right());
        assert!(!raw.dpad_down() && !raw.dpad_left());

        raw.set_dpad_from_hat(8);
        assert!(!raw.dpad_up() && !raw.dpad_right() && !raw.dpad_down() && !raw.dpad_left());

        raw.set_dpad_from_hat(5);
        assert!(raw.dpad_down() && raw.dpad_left());
    }

    #[test]
    fn test_pressed_buttons() {
        let mut data = NormalizedButtonData::default();
        data.set(ControllerButton::Home, true);
        data.set(ControllerButton::A, true);
        let pressed: Vec<_> = data.pressed_buttons().collect();
        assert_eq!(pressed, vec![ControllerButton::A, ControllerButton::Home]);
    }
}
