//! Virtual-controller backend errors.

use crate::common::ErrorSeverity;

/// Failures reported while publishing state to the platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The platform no longer recognizes the handle for this input
    #[error("Stale virtual device handle for input {index}")]
    StaleHandle {
        /// Logical input index
        index: u16,
    },

    /// The platform removed the virtual device out of band
    #[error("Virtual device for input {index} was removed by the platform")]
    DeviceRemoved {
        /// Logical input index
        index: u16,
    },

    /// Update requested for an input that is not attached
    #[error("Input {index} is not attached")]
    NotAttached {
        /// Logical input index
        index: u16,
    },

    /// Logical index outside the backend's capacity
    #[error("Input index {index} out of range (max {max})")]
    IndexOutOfRange {
        /// Logical input index
        index: u16,
        /// Number of indices the backend can hold
        max: u16,
    },

    /// Every shared input slot is owned by another virtual controller
    #[error("No free shared input slot for input {index}")]
    NoFreeSlot {
        /// Logical input index
        index: u16,
    },

    /// Any other platform result code
    #[error("Platform call {operation} failed with result {code:#x}")]
    Platform {
        /// Platform operation name
        operation: &'static str,
        /// Raw platform result code
        code: u32,
    },
}

impl BackendError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BackendError::StaleHandle { .. } => ErrorSeverity::Warning,
            BackendError::DeviceRemoved { .. } => ErrorSeverity::Warning,
            BackendError::NotAttached { .. } => ErrorSeverity::Info,
            BackendError::IndexOutOfRange { .. } => ErrorSeverity::Error,
            BackendError::NoFreeSlot { .. } => ErrorSeverity::Error,
            BackendError::Platform { .. } => ErrorSeverity::Error,
        }
    }

    /// The platform dropped the device; recovered by re-attaching, never surfaced.
    pub fn is_publish_race(&self) -> bool {
        matches!(
            self,
            BackendError::StaleHandle { .. } | BackendError::DeviceRemoved { .. }
        )
    }

    /// Create a platform error.
    pub fn platform(operation: &'static str, code: u32) -> Self {
        BackendError::Platform { operation, code }
    }
}
