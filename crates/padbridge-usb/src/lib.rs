//! USB transport abstractions for padbridge controllers
//!
//! Controllers only see the traits in [`transport`]: a device owns a list of
//! interfaces, each interface owns IN/OUT endpoints and accepts control
//! transfers. The [`memory`] module provides an in-memory implementation used
//! by tests and by the replay host.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod cancel;
pub mod device_info;
pub mod memory;
pub mod transport;

pub use cancel::CancelToken;
pub use device_info::*;
pub use transport::*;

pub use padbridge_errors::TransportError;

pub type UsbResult<T> = Result<T, TransportError>;
