//! Raw analog axes.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::ConfigError;

/// One of the eight raw analog axes a decoder can fill.
///
/// The discriminant is the index into [`crate::RawInputData::analog`] and the
/// per-axis deadzone/factor tables of [`crate::ControllerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AnalogAxis {
    X = 0,
    Y,
    Z,
    Rz,
    Rx,
    Ry,
    Slider,
    Dial,
}

impl AnalogAxis {
    /// Number of axes.
    pub const COUNT: usize = 8;

    /// Every axis in index order.
    pub const ALL: [AnalogAxis; Self::COUNT] = [
        AnalogAxis::X,
        AnalogAxis::Y,
        AnalogAxis::Z,
        AnalogAxis::Rz,
        AnalogAxis::Rx,
        AnalogAxis::Ry,
        AnalogAxis::Slider,
        AnalogAxis::Dial,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key suffix (`deadzone_<name>`, `factor_<name>`).
    pub const fn name(self) -> &'static str {
        match self {
            AnalogAxis::X => "x",
            AnalogAxis::Y => "y",
            AnalogAxis::Z => "z",
            AnalogAxis::Rz => "rz",
            AnalogAxis::Rx => "rx",
            AnalogAxis::Ry => "ry",
            AnalogAxis::Slider => "slider",
            AnalogAxis::Dial => "dial",
        }
    }
}

impl fmt::Display for AnalogAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalogAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        AnalogAxis::ALL
            .into_iter()
            .find(|axis| axis.name() == lower)
            .ok_or_else(|| ConfigError::UnknownAxis(s.to_string()))
    }
}
