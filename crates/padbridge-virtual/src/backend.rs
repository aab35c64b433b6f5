//! The publishing seam between a handler and the platform.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::{BackendError, ConfigError};

use crate::npad::{NpadButtons, StickState};

/// Logical inputs a single handler can publish.
pub const MAX_INPUTS: u16 = 8;

pub type BackendResult<T> = Result<T, BackendError>;

/// Publishes the normalized state of one physical controller's logical
/// inputs to the platform.
///
/// `attach_controller` and `detach_controller` are idempotent: attaching an
/// attached index registers nothing new, detaching an unattached index does
/// nothing.
pub trait VirtualBackend: Send {
    fn attach_controller(&mut self, index: u16) -> BackendResult<()>;

    fn detach_controller(&mut self, index: u16) -> BackendResult<()>;

    fn update_controller_state(
        &mut self,
        buttons: NpadButtons,
        stick_l: StickState,
        stick_r: StickState,
        index: u16,
    ) -> BackendResult<()>;

    fn is_controller_attached(&self, index: u16) -> bool;

    /// Detaches every attached index, logging failures.
    fn detach_all(&mut self) {
        for index in 0..MAX_INPUTS {
            if self.is_controller_attached(index) {
                if let Err(e) = self.detach_controller(index) {
                    tracing::warn!(index, error = %e, "detach during shutdown failed");
                }
            }
        }
    }
}

pub(crate) fn check_index(index: u16) -> BackendResult<usize> {
    if index < MAX_INPUTS {
        Ok(usize::from(index))
    } else {
        Err(BackendError::IndexOutOfRange {
            index,
            max: MAX_INPUTS,
        })
    }
}

/// Backend strategy chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// One registered virtual device per logical input.
    #[default]
    DeviceList,
    /// Samples written into replicated shared input state.
    SharedState,
}

impl BackendKind {
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::DeviceList => "device_list",
            BackendKind::SharedState => "shared_state",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "device_list" | "hdl" => Ok(BackendKind::DeviceList),
            "shared_state" | "mitm" => Ok(BackendKind::SharedState),
            other => Err(ConfigError::invalid_value(
                "backend",
                format!("unknown backend '{other}'"),
            )),
        }
    }
}
