//! padbridge service daemon
//!
//! - [`config`]: the TOML configuration file and controller layering
//! - [`discovery`]: which USB devices are taken over
//! - [`daemon`]: handler lifecycle and signal-driven shutdown
//! - [`replay`]: captured reports fed through in-memory devices
//! - [`observability`]: tracing subscriber setup

pub mod config;
pub mod daemon;
pub mod discovery;
pub mod observability;
pub mod replay;

pub use config::{ConfigStore, DEFAULT_CONFIG_PATH, GlobalConfig};
pub use daemon::{BackendRuntime, PadbridgeDaemon};
pub use discovery::{DiscoveryFilter, DiscoveryMode, VidPid};
pub use replay::{ReplayCapture, ReplayError, ReplaySession};
