//! Virtual gamepad publishing
//!
//! Everything between a decoded controller and the platform's input
//! subsystem:
//!
//! - [`npad`]: the platform button word and stick coordinates
//! - [`backend`]: the [`VirtualBackend`] seam and backend selection
//! - [`device_list`]: one registered virtual device per logical input
//! - [`shared_state`]: samples written into replicated shared input state
//! - [`handler`]: the per-controller polling thread and its lifecycle
//! - [`headless`]: an in-memory platform for hosts without the console
//!   input service

#![deny(static_mut_refs)]

pub mod backend;
pub mod device_list;
pub mod handler;
pub mod headless;
pub mod npad;
pub mod priority;
pub mod shared_state;

pub use backend::{BackendKind, BackendResult, MAX_INPUTS, VirtualBackend};
pub use device_list::{DeviceListBackend, DeviceListPlatform, VirtualDeviceInfo, VirtualPadState};
pub use handler::{HandlerOptions, InputPoller, VirtualGamepadHandler};
pub use headless::{HeadlessDeviceList, HeadlessRegionSource};
pub use npad::{NpadButtons, StickState, convert_axis};
pub use shared_state::{SharedStateBackend, SharedStateManager, SharedStateRegion};
