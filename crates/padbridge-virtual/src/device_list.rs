//! Device-list backend: one registered virtual device per logical input.
//!
//! Each attached index owns a platform handle. Updates are a single
//! `set_state` call; when the platform answers with [`RESULT_STALE_HANDLE`]
//! the device is registered again and the update retried once.

use std::sync::Arc;

use padbridge_controller_types::{ControllerConfig, DeviceType, RgbaColor};
use padbridge_errors::BackendError;
use tracing::{debug, info, warn};

use crate::backend::{BackendResult, MAX_INPUTS, VirtualBackend, check_index};
use crate::npad::{NpadButtons, StickState};

/// Platform result for a handle it no longer knows.
pub const RESULT_STALE_HANDLE: u32 = 0x1c24ca;

/// Battery level reported for every virtual device (full).
pub const BATTERY_FULL: u8 = 4;

pub type PlatformHandle = u64;

/// Raw platform result code.
pub type PlatformCode = u32;

/// What the platform is told about a new virtual device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualDeviceInfo {
    pub device_type: DeviceType,
    pub body_color: RgbaColor,
    pub buttons_color: RgbaColor,
    pub left_grip_color: RgbaColor,
    pub right_grip_color: RgbaColor,
}

impl VirtualDeviceInfo {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            device_type: config.controller_type.device_type(),
            body_color: config.body_color,
            buttons_color: config.buttons_color,
            left_grip_color: config.left_grip_color,
            right_grip_color: config.right_grip_color,
        }
    }
}

/// State pushed with every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualPadState {
    pub buttons: NpadButtons,
    pub stick_l: StickState,
    pub stick_r: StickState,
    pub battery_level: u8,
}

impl Default for VirtualPadState {
    fn default() -> Self {
        Self {
            buttons: NpadButtons::empty(),
            stick_l: StickState::CENTER,
            stick_r: StickState::CENTER,
            battery_level: BATTERY_FULL,
        }
    }
}

/// The platform's virtual-device registry. Shared by every handler, so
/// implementations synchronize internally.
pub trait DeviceListPlatform: Send + Sync {
    fn attach(&self, info: &VirtualDeviceInfo) -> Result<PlatformHandle, PlatformCode>;

    fn detach(&self, handle: PlatformHandle) -> Result<(), PlatformCode>;

    fn set_state(&self, handle: PlatformHandle, state: &VirtualPadState) -> Result<(), PlatformCode>;
}

pub struct DeviceListBackend {
    platform: Arc<dyn DeviceListPlatform>,
    info: VirtualDeviceInfo,
    handles: [Option<PlatformHandle>; MAX_INPUTS as usize],
}

impl DeviceListBackend {
    pub fn new(platform: Arc<dyn DeviceListPlatform>, config: &ControllerConfig) -> Self {
        Self {
            platform,
            info: VirtualDeviceInfo::from_config(config),
            handles: [None; MAX_INPUTS as usize],
        }
    }

    pub fn device_info(&self) -> &VirtualDeviceInfo {
        &self.info
    }

    pub fn handle(&self, index: u16) -> Option<PlatformHandle> {
        self.handles.get(usize::from(index)).copied().flatten()
    }

    fn register(&mut self, slot: usize, index: u16) -> BackendResult<PlatformHandle> {
        let handle = self
            .platform
            .attach(&self.info)
            .map_err(|code| BackendError::platform("attach", code))?;
        self.handles[slot] = Some(handle);

        if let Err(code) = self.platform.set_state(handle, &VirtualPadState::default()) {
            warn!(index, handle, code, "initial state rejected");
        }
        info!(index, handle, device_type = ?self.info.device_type, "virtual device registered");
        Ok(handle)
    }
}

impl VirtualBackend for DeviceListBackend {
    fn attach_controller(&mut self, index: u16) -> BackendResult<()> {
        let slot = check_index(index)?;
        if self.handles[slot].is_some() {
            return Ok(());
        }
        self.register(slot, index).map(|_| ())
    }

    fn detach_controller(&mut self, index: u16) -> BackendResult<()> {
        let slot = check_index(index)?;
        let Some(handle) = self.handles[slot].take() else {
            return Ok(());
        };
        match self.platform.detach(handle) {
            Ok(()) => {
                info!(index, handle, "virtual device removed");
                Ok(())
            }
            Err(RESULT_STALE_HANDLE) => {
                debug!(index, handle, "virtual device already gone");
                Ok(())
            }
            Err(code) => Err(BackendError::platform("detach", code)),
        }
    }

    fn update_controller_state(
        &mut self,
        buttons: NpadButtons,
        stick_l: StickState,
        stick_r: StickState,
        index: u16,
    ) -> BackendResult<()> {
        let slot = check_index(index)?;
        let handle = self.handles[slot].ok_or(BackendError::NotAttached { index })?;
        let state = VirtualPadState {
            buttons,
            stick_l,
            stick_r,
            battery_level: BATTERY_FULL,
        };

        match self.platform.set_state(handle, &state) {
            Ok(()) => return Ok(()),
            Err(RESULT_STALE_HANDLE) => {
                debug!(index, handle, "stale handle, registering again");
            }
            Err(code) => return Err(BackendError::platform("set_state", code)),
        }

        self.handles[slot] = None;
        let handle = self.register(slot, index)?;
        match self.platform.set_state(handle, &state) {
            Ok(()) => Ok(()),
            Err(RESULT_STALE_HANDLE) => {
                self.handles[slot] = None;
                Err(BackendError::DeviceRemoved { index })
            }
            Err(code) => Err(BackendError::platform("set_state", code)),
        }
    }

    fn is_controller_attached(&self, index: u16) -> bool {
        self.handle(index).is_some()
    }
}
