//! Stand-in platform for hosts without the console input service.
//!
//! Virtual devices are kept in memory and every registry change is logged,
//! which is enough to run the daemon against replayed captures and to test
//! the backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::device_list::{
    DeviceListPlatform, PlatformCode, PlatformHandle, RESULT_STALE_HANDLE, VirtualDeviceInfo,
    VirtualPadState,
};
use crate::shared_state::{NpadRegion, RegionSource};

/// In-memory virtual-device registry.
#[derive(Debug, Default)]
pub struct HeadlessDeviceList {
    devices: Mutex<HashMap<PlatformHandle, (VirtualDeviceInfo, VirtualPadState)>>,
    next_handle: AtomicU64,
    registrations: AtomicUsize,
    removals: AtomicUsize,
    reject_states: AtomicBool,
}

impl HeadlessDeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devices currently registered.
    pub fn live_devices(&self) -> usize {
        self.devices.lock().len()
    }

    /// Successful `attach` calls so far.
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::Relaxed)
    }

    /// Successful `detach` calls so far.
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::Relaxed)
    }

    pub fn device(&self, handle: PlatformHandle) -> Option<(VirtualDeviceInfo, VirtualPadState)> {
        self.devices.lock().get(&handle).copied()
    }

    /// Drops every registration behind the backends' backs, the way the
    /// platform does when its input service restarts.
    pub fn forget_all(&self) {
        let mut devices = self.devices.lock();
        info!(count = devices.len(), "headless registry cleared");
        devices.clear();
    }

    /// Makes every `set_state` answer with a stale handle.
    pub fn set_reject_states(&self, reject: bool) {
        self.reject_states.store(reject, Ordering::Relaxed);
    }
}

impl DeviceListPlatform for HeadlessDeviceList {
    fn attach(&self, info: &VirtualDeviceInfo) -> Result<PlatformHandle, PlatformCode> {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;
        self.devices
            .lock()
            .insert(handle, (*info, VirtualPadState::default()));
        self.registrations.fetch_add(1, Ordering::Relaxed);
        info!(handle, device_type = ?info.device_type, "headless: virtual device attached");
        Ok(handle)
    }

    fn detach(&self, handle: PlatformHandle) -> Result<(), PlatformCode> {
        match self.devices.lock().remove(&handle) {
            Some(_) => {
                self.removals.fetch_add(1, Ordering::Relaxed);
                info!(handle, "headless: virtual device detached");
                Ok(())
            }
            None => Err(RESULT_STALE_HANDLE),
        }
    }

    fn set_state(&self, handle: PlatformHandle, state: &VirtualPadState) -> Result<(), PlatformCode> {
        if self.reject_states.load(Ordering::Relaxed) {
            return Err(RESULT_STALE_HANDLE);
        }
        let mut devices = self.devices.lock();
        let Some(entry) = devices.get_mut(&handle) else {
            return Err(RESULT_STALE_HANDLE);
        };
        if entry.1.buttons != state.buttons {
            debug!(handle, buttons = ?state.buttons, "headless: buttons changed");
        }
        entry.1 = *state;
        Ok(())
    }
}

/// Authoritative input region with no physical pads on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessRegionSource;

impl RegionSource for HeadlessRegionSource {
    fn read_authoritative(&self, region: &mut NpadRegion) {
        *region = NpadRegion::default();
    }
}
