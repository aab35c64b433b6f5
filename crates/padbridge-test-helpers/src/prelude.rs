//! Convenience re-exports for common test utilities.

pub use crate::wait::wait_until;
pub use crate::{assert_approx_eq, assert_stick_eq};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
