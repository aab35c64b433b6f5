//! Shared test utilities for padbridge.
//!
//! # Modules
//!
//! - [`assertions`] - Float assertions used by the stick and binding tests
//! - [`wait`] - Polling helpers for tests that drive background threads
//! - [`prelude`] - Convenience re-exports
//!
//! ```rust,ignore
//! use padbridge_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::panic)]

pub mod assertions;
pub mod prelude;
pub mod wait;

pub use wait::wait_until;
