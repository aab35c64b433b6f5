//! Centralized error types for padbridge
//!
//! Every crate in the workspace reports failures through the enums defined
//! here so the polling loop can classify them without string matching.
//!
//! # Architecture
//!
//! - [`common`]: the top-level [`PadbridgeError`], categories and severities
//! - [`transport`]: USB transport failures (unplug, timeout, cancelled reads)
//! - [`decode`]: report framing mismatches
//! - [`backend`]: virtual-controller publish failures
//! - [`config`]: configuration parsing and consistency problems
//!
//! # Example
//!
//! ```
//! use padbridge_errors::prelude::*;
//!
//! fn check_marker(report: &[u8]) -> Result<()> {
//!     match report.first() {
//!         Some(0x01) => Ok(()),
//!         Some(&actual) => Err(DecodeError::unexpected_marker(0x01, actual).into()),
//!         None => Err(DecodeError::too_short(1, 0).into()),
//!     }
//! }
//!
//! assert!(check_marker(&[0x01]).is_ok());
//! assert!(check_marker(&[0x02]).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod common;
pub mod config;
pub mod decode;
pub mod prelude;
pub mod transport;

pub use backend::BackendError;
pub use common::{ErrorCategory, ErrorSeverity, PadbridgeError};
pub use config::ConfigError;
pub use decode::DecodeError;
pub use transport::TransportError;

/// A specialized `Result` type for padbridge operations.
pub type Result<T> = std::result::Result<T, PadbridgeError>;
