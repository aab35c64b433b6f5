//! Configuration errors.
//!
//! Configuration problems are reported at load time. Most of them degrade a
//! single key; only a file that cannot be parsed at all fails the load.

use crate::common::ErrorSeverity;

/// Configuration parsing and consistency errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unknown logical button name
    #[error("Unknown button: {0}")]
    UnknownButton(String),

    /// Unknown analog axis name
    #[error("Unknown analog axis: {0}")]
    UnknownAxis(String),

    /// Invalid physical pin number
    #[error("Invalid pin {pin} (max {max})")]
    InvalidPin {
        /// Pin found in the binding list
        pin: u32,
        /// Highest accepted pin
        max: u32,
    },

    /// Too many pins for one button
    #[error("Too many pins configured for {button} (max {max})")]
    TooManyPins {
        /// Logical button name
        button: String,
        /// Maximum pins per button
        max: usize,
    },

    /// Combo table full
    #[error("Too many simulated combos (max {max})")]
    TooManyCombos {
        /// Maximum combo entries
        max: usize,
    },

    /// Malformed color string
    #[error("Invalid color value {value}: {reason}")]
    InvalidColor {
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Malformed "vvvv-pppp" identifier
    #[error("Invalid vid-pid identifier: {0}")]
    InvalidVidPid(String),

    /// Value has the wrong type or range for its key
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Configuration key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// No face button is bound; sticks may work but buttons will not
    #[error("No buttons configured for controller {vid:04x}-{pid:04x}")]
    NoButtonsBound {
        /// USB vendor ID
        vid: u16,
        /// USB product ID
        pid: u16,
    },

    /// The file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::NoButtonsBound { .. } => ErrorSeverity::Warning,
            ConfigError::Parse(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
