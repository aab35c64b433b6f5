//! Prelude module for convenient error handling imports.

pub use crate::{
    Result,
    backend::BackendError,
    common::{ErrorCategory, ErrorSeverity, PadbridgeError},
    config::ConfigError,
    decode::DecodeError,
    transport::TransportError,
};
