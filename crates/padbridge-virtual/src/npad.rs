//! Platform controller model: button bitmask and stick coordinates.
//!
//! The platform sees a first-party pad as a 64-bit button word plus two
//! signed 16-bit-range sticks with y pointing up. [`NpadButtons::from_normalized`]
//! and [`convert_stick`] turn one [`NormalizedButtonData`] into that shape.

use bitflags::bitflags;
use padbridge_controller_types::{ControllerButton, NormalizedButtonData, NormalizedStick};

/// Lowest stick coordinate the platform accepts.
pub const JOYSTICK_MIN: i32 = -32767;
/// Highest stick coordinate the platform accepts.
pub const JOYSTICK_MAX: i32 = 32767;

bitflags! {
    /// Button word published for one virtual pad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NpadButtons: u64 {
        const A = 1 << 0;
        const B = 1 << 1;
        const X = 1 << 2;
        const Y = 1 << 3;
        const STICK_L = 1 << 4;
        const STICK_R = 1 << 5;
        const L = 1 << 6;
        const R = 1 << 7;
        const ZL = 1 << 8;
        const ZR = 1 << 9;
        const PLUS = 1 << 10;
        const MINUS = 1 << 11;
        const LEFT = 1 << 12;
        const UP = 1 << 13;
        const RIGHT = 1 << 14;
        const DOWN = 1 << 15;
        const HOME = 1 << 18;
        const CAPTURE = 1 << 19;
    }
}

/// Logical buttons that have a bit in the platform word. Stick-direction
/// buttons are derived by the platform from the stick position.
const BUTTON_BITS: [(ControllerButton, NpadButtons); 18] = [
    (ControllerButton::X, NpadButtons::X),
    (ControllerButton::A, NpadButtons::A),
    (ControllerButton::B, NpadButtons::B),
    (ControllerButton::Y, NpadButtons::Y),
    (ControllerButton::LStickClick, NpadButtons::STICK_L),
    (ControllerButton::RStickClick, NpadButtons::STICK_R),
    (ControllerButton::L, NpadButtons::L),
    (ControllerButton::R, NpadButtons::R),
    (ControllerButton::ZL, NpadButtons::ZL),
    (ControllerButton::ZR, NpadButtons::ZR),
    (ControllerButton::Minus, NpadButtons::MINUS),
    (ControllerButton::Plus, NpadButtons::PLUS),
    (ControllerButton::DpadUp, NpadButtons::UP),
    (ControllerButton::DpadRight, NpadButtons::RIGHT),
    (ControllerButton::DpadDown, NpadButtons::DOWN),
    (ControllerButton::DpadLeft, NpadButtons::LEFT),
    (ControllerButton::Capture, NpadButtons::CAPTURE),
    (ControllerButton::Home, NpadButtons::HOME),
];

impl NpadButtons {
    pub fn from_normalized(data: &NormalizedButtonData) -> Self {
        BUTTON_BITS
            .iter()
            .filter(|(button, _)| data.pressed(*button))
            .fold(NpadButtons::empty(), |acc, (_, bit)| acc | *bit)
    }

    /// The chord that forces a re-attach of the virtual pad.
    pub fn is_reattach_chord(self) -> bool {
        self.contains(NpadButtons::L | NpadButtons::R)
    }
}

/// One stick in platform coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StickState {
    pub x: i32,
    pub y: i32,
}

impl StickState {
    pub const CENTER: StickState = StickState { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps normalized `[-1, 1]` axes onto `[JOYSTICK_MIN, JOYSTICK_MAX]`.
/// Normalized y grows downwards, the platform's grows upwards.
pub fn convert_axis(x: f32, y: f32) -> StickState {
    StickState {
        x: scale_axis(x),
        y: -scale_axis(y),
    }
}

pub fn convert_stick(stick: &NormalizedStick) -> StickState {
    convert_axis(stick.axis_x, stick.axis_y)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "input is clamped to [-1, 1], result lies in [JOYSTICK_MIN, JOYSTICK_MAX]"
)]
fn scale_axis(value: f32) -> i32 {
    let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    let span = (JOYSTICK_MAX - JOYSTICK_MIN) as f32;
    (((value + 1.0) * span / 2.0) + JOYSTICK_MIN as f32).round() as i32
}
