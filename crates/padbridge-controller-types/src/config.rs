//! Per-controller configuration.
//!
//! A [`ControllerConfig`] is fully populated before its controller is built
//! and is never mutated afterwards; each controller owns its own copy.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::ConfigError;

use crate::{
    AnalogAxis, ControllerButton, ControllerType, MAX_CONTROLLER_BUTTONS, MAX_CONTROLLER_COMBO,
    MAX_JOYSTICKS, MAX_PIN_BY_BUTTONS,
};

/// RGBA color; alpha defaults to opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const BLACK: RgbaColor = RgbaColor::new(0, 0, 0, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packed `0xRRGGBBAA` value.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for RgbaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for RgbaColor {
    type Err = ConfigError;

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::InvalidColor {
            value: s.to_string(),
            reason,
        };

        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return Err(invalid(format!(
                "expecting 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }

        let mut bytes = [0u8, 0, 0, 0xFF];
        let digits = hex.as_bytes();
        for (slot, pair) in bytes.iter_mut().zip(digits.chunks(2)) {
            let text = std::str::from_utf8(pair).map_err(|e| invalid(e.to_string()))?;
            *slot = u8::from_str_radix(text, 16).map_err(|e| invalid(e.to_string()))?;
        }

        Ok(RgbaColor::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }
}

/// An analog axis read with a sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogBinding {
    pub axis: AnalogAxis,
    pub sign: f32,
}

impl AnalogBinding {
    pub const fn new(axis: AnalogAxis, sign: f32) -> Self {
        Self { axis, sign }
    }

    pub const fn positive(axis: AnalogAxis) -> Self {
        Self::new(axis, 1.0)
    }

    pub const fn negative(axis: AnalogAxis) -> Self {
        Self::new(axis, -1.0)
    }
}

impl FromStr for AnalogBinding {
    type Err = ConfigError;

    /// Parses `x`, `+x` or `-x` style tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if let Some(name) = token.strip_prefix('-') {
            Ok(AnalogBinding::negative(name.parse()?))
        } else {
            let name = token.strip_prefix('+').unwrap_or(token);
            Ok(AnalogBinding::positive(name.parse()?))
        }
    }
}

impl fmt::Display for AnalogBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign < 0.0 {
            write!(f, "-{}", self.axis)
        } else {
            write!(f, "{}", self.axis)
        }
    }
}

/// Analog bindings of one published stick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickConfig {
    pub x: Option<AnalogBinding>,
    pub y: Option<AnalogBinding>,
}

/// A chord: when both sources are held, `target` is pressed instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboConfig {
    pub target: ControllerButton,
    pub sources: [ControllerButton; 2],
}

impl ComboConfig {
    pub const fn new(target: ControllerButton, first: ControllerButton, second: ControllerButton) -> Self {
        Self {
            target,
            sources: [first, second],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target == ControllerButton::None
    }
}

/// Binding and presentation settings of one physical controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Driver name, lowercase (`dualshock4`, `generic`, ...)
    pub driver: String,
    /// Profile section applied between `[default]` and the vid-pid section
    pub profile: String,
    pub controller_type: ControllerType,
    /// Transport hint, 0 means device default
    pub input_max_packet_size: u16,
    /// Transport hint, 0 means device default
    pub output_max_packet_size: u16,
    pub analog_deadzone_percent: [u8; AnalogAxis::COUNT],
    pub analog_factor_percent: [u8; AnalogAxis::COUNT],
    /// Raw pins per logical button, 0 = unused
    pub buttons_pin: [[u8; MAX_PIN_BY_BUTTONS]; ControllerButton::COUNT],
    pub buttons_analog: [Option<AnalogBinding>; ControllerButton::COUNT],
    pub buttons_alias: [ControllerButton; ControllerButton::COUNT],
    pub sticks: [StickConfig; MAX_JOYSTICKS],
    /// Deflection percent that fires a stick-direction button
    pub stick_activation_threshold: u8,
    pub simulate_combos: [ComboConfig; MAX_CONTROLLER_COMBO],
    pub body_color: RgbaColor,
    pub buttons_color: RgbaColor,
    pub left_grip_color: RgbaColor,
    pub right_grip_color: RgbaColor,
    /// Light bar color for controllers that have one
    pub led_color: RgbaColor,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            driver: String::new(),
            profile: String::new(),
            controller_type: ControllerType::default(),
            input_max_packet_size: 0,
            output_max_packet_size: 0,
            analog_deadzone_percent: [0; AnalogAxis::COUNT],
            analog_factor_percent: [100; AnalogAxis::COUNT],
            buttons_pin: [[0; MAX_PIN_BY_BUTTONS]; ControllerButton::COUNT],
            buttons_analog: [None; ControllerButton::COUNT],
            buttons_alias: [ControllerButton::None; ControllerButton::COUNT],
            sticks: [StickConfig::default(); MAX_JOYSTICKS],
            stick_activation_threshold: 50,
            simulate_combos: [ComboConfig::default(); MAX_CONTROLLER_COMBO],
            body_color: RgbaColor::BLACK,
            buttons_color: RgbaColor::BLACK,
            left_grip_color: RgbaColor::BLACK,
            right_grip_color: RgbaColor::BLACK,
            led_color: RgbaColor::BLACK,
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn deadzone(&self, axis: AnalogAxis) -> u8 {
        self.analog_deadzone_percent[axis.index()]
    }

    #[inline]
    pub fn factor(&self, axis: AnalogAxis) -> u8 {
        self.analog_factor_percent[axis.index()]
    }

    #[inline]
    pub fn pins(&self, button: ControllerButton) -> &[u8; MAX_PIN_BY_BUTTONS] {
        &self.buttons_pin[button.index()]
    }

    /// Replaces the pin list of `button`.
    ///
    /// Pins must be below [`MAX_CONTROLLER_BUTTONS`]; at most
    /// [`MAX_PIN_BY_BUTTONS`] are kept. On error the valid prefix is still
    /// applied so a bad entry only drops itself.
    pub fn set_pins(&mut self, button: ControllerButton, pins: &[u32]) -> Result<(), ConfigError> {
        let slot = &mut self.buttons_pin[button.index()];
        *slot = [0; MAX_PIN_BY_BUTTONS];

        let mut used = 0;
        let mut first_error = None;
        for &pin in pins {
            if used >= MAX_PIN_BY_BUTTONS {
                first_error.get_or_insert(ConfigError::TooManyPins {
                    button: button.name().to_string(),
                    max: MAX_PIN_BY_BUTTONS,
                });
                continue;
            }
            match u8::try_from(pin) {
                Ok(p) if usize::from(p) < MAX_CONTROLLER_BUTTONS => {
                    slot[used] = p;
                    used += 1;
                }
                _ => {
                    first_error.get_or_insert(ConfigError::InvalidPin {
                        pin,
                        max: MAX_CONTROLLER_BUTTONS as u32,
                    });
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Adds or replaces the combo producing `combo.target`.
    pub fn set_combo(&mut self, combo: ComboConfig) -> Result<(), ConfigError> {
        if let Some(existing) = self
            .simulate_combos
            .iter_mut()
            .find(|c| c.target == combo.target)
        {
            *existing = combo;
            return Ok(());
        }

        match self.simulate_combos.iter_mut().find(|c| c.is_empty()) {
            Some(free) => {
                *free = combo;
                Ok(())
            }
            None => Err(ConfigError::TooManyCombos {
                max: MAX_CONTROLLER_COMBO,
            }),
        }
    }

    /// Configured combos in evaluation order.
    pub fn combos(&self) -> impl Iterator<Item = &ComboConfig> {
        self.simulate_combos.iter().filter(|c| !c.is_empty())
    }

    /// True when at least one face button has a physical pin.
    pub fn has_face_buttons(&self) -> bool {
        [
            ControllerButton::A,
            ControllerButton::B,
            ControllerButton::X,
            ControllerButton::Y,
        ]
        .iter()
        .any(|b| self.pins(*b)[0] != 0)
    }

    /// Builder: bind `button` to the given pins, ignoring invalid entries.
    pub fn with_pins(mut self, button: ControllerButton, pins: &[u32]) -> Self {
        let _ignored = self.set_pins(button, pins).is_err();
        self
    }

    pub fn with_button_analog(mut self, button: ControllerButton, binding: AnalogBinding) -> Self {
        self.buttons_analog[button.index()] = Some(binding);
        self
    }

    pub fn with_alias(mut self, button: ControllerButton, alias: ControllerButton) -> Self {
        self.buttons_alias[button.index()] = alias;
        self
    }

    pub fn with_stick(mut self, stick: usize, config: StickConfig) -> Self {
        if let Some(slot) = self.sticks.get_mut(stick) {
            *slot = config;
        }
        self
    }

    /// Builder: add a combo, dropping it when the table is full.
    pub fn with_combo(mut self, target: ControllerButton, first: ControllerButton, second: ControllerButton) -> Self {
        let _ignored = self.set_combo(ComboConfig::new(target, first, second)).is_err();
        self
    }

    pub fn with_deadzone(mut self, axis: AnalogAxis, percent: u8) -> Self {
        self.analog_deadzone_percent[axis.index()] = percent;
        self
    }

    pub fn with_factor(mut self, axis: AnalogAxis, percent: u8) -> Self {
        self.analog_factor_percent[axis.index()] = percent;
        self
    }

    pub fn with_stick_activation_threshold(mut self, percent: u8) -> Self {
        self.stick_activation_threshold = percent;
        self
    }
}
