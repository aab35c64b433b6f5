//! Logical buttons of the published controller.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::ConfigError;

/// A logical button; the discriminant indexes
/// [`crate::NormalizedButtonData::buttons`] and the per-button config tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ControllerButton {
    #[default]
    None = 0,
    X,
    A,
    B,
    Y,
    LStickClick,
    LStickLeft,
    LStickRight,
    LStickUp,
    LStickDown,
    RStickClick,
    RStickLeft,
    RStickRight,
    RStickUp,
    RStickDown,
    L,
    R,
    ZL,
    ZR,
    Minus,
    Plus,
    DpadUp,
    DpadRight,
    DpadDown,
    DpadLeft,
    Capture,
    Home,
}

impl ControllerButton {
    /// Number of logical buttons including [`ControllerButton::None`].
    pub const COUNT: usize = 27;

    /// Every bindable button in index order (without `None`).
    pub const ALL: [ControllerButton; Self::COUNT - 1] = [
        ControllerButton::X,
        ControllerButton::A,
        ControllerButton::B,
        ControllerButton::Y,
        ControllerButton::LStickClick,
        ControllerButton::LStickLeft,
        ControllerButton::LStickRight,
        ControllerButton::LStickUp,
        ControllerButton::LStickDown,
        ControllerButton::RStickClick,
        ControllerButton::RStickLeft,
        ControllerButton::RStickRight,
        ControllerButton::RStickUp,
        ControllerButton::RStickDown,
        ControllerButton::L,
        ControllerButton::R,
        ControllerButton::ZL,
        ControllerButton::ZR,
        ControllerButton::Minus,
        ControllerButton::Plus,
        ControllerButton::DpadUp,
        ControllerButton::DpadRight,
        ControllerButton::DpadDown,
        ControllerButton::DpadLeft,
        ControllerButton::Capture,
        ControllerButton::Home,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key for this button.
    pub const fn name(self) -> &'static str {
        match self {
            ControllerButton::None => "none",
            ControllerButton::X => "x",
            ControllerButton::A => "a",
            ControllerButton::B => "b",
            ControllerButton::Y => "y",
            ControllerButton::LStickClick => "lstick_click",
            ControllerButton::LStickLeft => "lstick_left",
            ControllerButton::LStickRight => "lstick_right",
            ControllerButton::LStickUp => "lstick_up",
            ControllerButton::LStickDown => "lstick_down",
            ControllerButton::RStickClick => "rstick_click",
            ControllerButton::RStickLeft => "rstick_left",
            ControllerButton::RStickRight => "rstick_right",
            ControllerButton::RStickUp => "rstick_up",
            ControllerButton::RStickDown => "rstick_down",
            ControllerButton::L => "l",
            ControllerButton::R => "r",
            ControllerButton::ZL => "zl",
            ControllerButton::ZR => "zr",
            ControllerButton::Minus => "minus",
            ControllerButton::Plus => "plus",
            ControllerButton::DpadUp => "dpad_up",
            ControllerButton::DpadRight => "dpad_right",
            ControllerButton::DpadDown => "dpad_down",
            ControllerButton::DpadLeft => "dpad_left",
            ControllerButton::Capture => "capture",
            ControllerButton::Home => "home",
        }
    }

    /// True for the eight buttons driven by stick deflection.
    pub const fn is_stick_direction(self) -> bool {
        matches!(
            self,
            ControllerButton::LStickLeft
                | ControllerButton::LStickRight
                | ControllerButton::LStickUp
                | ControllerButton::LStickDown
                | ControllerButton::RStickLeft
                | ControllerButton::RStickRight
                | ControllerButton::RStickUp
                | ControllerButton::RStickDown
        )
    }
}

impl fmt::Display for ControllerButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerButton {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ControllerButton::ALL
            .into_iter()
            .find(|button| button.name() == lower)
            .ok_or_else(|| ConfigError::UnknownButton(s.to_string()))
    }
}
