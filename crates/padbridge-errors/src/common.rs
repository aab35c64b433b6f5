//! Common error types and utilities used across all padbridge crates.
//!
//! This module provides the top-level error enum that can wrap all sub-errors,
//! along with the category and severity the polling loop classifies by.

use core::fmt;

use crate::{BackendError, ConfigError, DecodeError, TransportError};

/// Top-level error type that can wrap all padbridge sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum PadbridgeError {
    /// USB transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Report decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Virtual-controller backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl PadbridgeError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PadbridgeError::Transport(_) => ErrorCategory::Transport,
            PadbridgeError::Decode(_) => ErrorCategory::Decode,
            PadbridgeError::Backend(_) => ErrorCategory::Backend,
            PadbridgeError::Config(_) => ErrorCategory::Config,
            PadbridgeError::Io(_) => ErrorCategory::IO,
            PadbridgeError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PadbridgeError::Transport(e) => e.severity(),
            PadbridgeError::Decode(_) => ErrorSeverity::Info,
            PadbridgeError::Backend(e) => e.severity(),
            PadbridgeError::Config(e) => e.severity(),
            PadbridgeError::Io(_) => ErrorSeverity::Error,
            PadbridgeError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if the polling loop can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        PadbridgeError::Other(msg.into())
    }
}

impl From<std::io::Error> for PadbridgeError {
    fn from(e: std::io::Error) -> Self {
        PadbridgeError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// USB transport errors
    Transport = 0,
    /// Report decoding errors
    Decode = 1,
    /// Backend publish errors
    Backend = 2,
    /// Configuration errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Decode => write!(f, "Decode"),
            ErrorCategory::Backend => write!(f, "Backend"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the controller cannot keep running
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
