//! USB transport error types.
//!
//! Transport failures never stop the service: the polling loop treats the
//! affected input as disconnected, backs off and tries again.

use crate::common::ErrorSeverity;

/// Failures reported by a USB device, interface or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// A read returned no data before its deadline
    #[error("Transport read timed out after {timeout_us}us")]
    Timeout {
        /// Timeout that elapsed, in microseconds
        timeout_us: u32,
    },

    /// The device went away
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// A blocking read was interrupted by a cancellation request
    #[error("Transport operation cancelled")]
    Cancelled,

    /// Opening the device or one of its interfaces failed
    #[error("Failed to open {0}")]
    OpenFailed(String),

    /// No endpoint in the requested direction could be found
    #[error("No usable {direction} endpoint on device {device}")]
    InvalidEndpoint {
        /// Device identifier
        device: String,
        /// "IN" or "OUT"
        direction: &'static str,
    },

    /// A control transfer was rejected
    #[error("Control transfer failed (request {request:#04x}, value {value:#06x}): {message}")]
    ControlTransfer {
        /// bRequest of the setup packet
        request: u8,
        /// wValue of the setup packet
        value: u16,
        /// Error message
        message: String,
    },

    /// Generic I/O failure
    #[error("I/O error on device {device}: {message}")]
    Io {
        /// Device identifier
        device: String,
        /// Error message
        message: String,
    },

    /// The device variant does not implement the operation
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),
}

impl TransportError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TransportError::Timeout { .. } => ErrorSeverity::Info,
            TransportError::Cancelled => ErrorSeverity::Info,
            TransportError::Disconnected(_) => ErrorSeverity::Warning,
            TransportError::NotImplemented(_) => ErrorSeverity::Info,
            TransportError::OpenFailed(_) => ErrorSeverity::Critical,
            TransportError::InvalidEndpoint { .. } => ErrorSeverity::Critical,
            TransportError::ControlTransfer { .. } => ErrorSeverity::Error,
            TransportError::Io { .. } => ErrorSeverity::Error,
        }
    }

    /// A timeout is the normal "nothing arrived" outcome of a bounded read.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// Check if the error is fatal for controller bring-up.
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Create a timeout error.
    pub fn timeout(timeout_us: u32) -> Self {
        TransportError::Timeout { timeout_us }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        TransportError::Disconnected(device.into())
    }

    /// Create an I/O error.
    pub fn io(device: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Io {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(device: impl Into<String>, direction: &'static str) -> Self {
        TransportError::InvalidEndpoint {
            device: device.into(),
            direction,
        }
    }
}
