//! Report decoding errors.
//!
//! A decode mismatch means "no update this cycle"; it is never escalated.

/// A report that does not match the layout its decoder expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Leading marker byte did not match
    #[error("Unexpected report marker: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedMarker {
        /// Expected marker byte
        expected: u8,
        /// Marker byte found in the report
        actual: u8,
    },

    /// Report shorter than the fixed layout
    #[error("Report too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum length of the layout
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// Decoded input index exceeds the number of inputs the device exposes
    #[error("Input index {index} out of range (device exposes {count})")]
    InputIndexOutOfRange {
        /// Decoded input index
        index: u16,
        /// Number of inputs exposed
        count: u16,
    },
}

impl DecodeError {
    /// Create an unexpected marker error.
    pub fn unexpected_marker(expected: u8, actual: u8) -> Self {
        DecodeError::UnexpectedMarker { expected, actual }
    }

    /// Create a too-short error.
    pub fn too_short(expected: usize, actual: usize) -> Self {
        DecodeError::TooShort { expected, actual }
    }
}
