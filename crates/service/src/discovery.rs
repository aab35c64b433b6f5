//! Which attached USB devices the daemon takes over.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::ConfigError;
use padbridge_usb::{UsbDeviceInfo, UsbHost, UsbResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Device selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Every HID device plus every Xbox One interface
    #[default]
    HidAndXbox,
    /// Listed VID/PIDs plus every Xbox One interface
    VidpidAndXbox,
    /// Listed VID/PIDs only
    Vidpid,
}

impl DiscoveryMode {
    pub const fn name(self) -> &'static str {
        match self {
            DiscoveryMode::HidAndXbox => "hid_and_xbox",
            DiscoveryMode::VidpidAndXbox => "vidpid_and_xbox",
            DiscoveryMode::Vidpid => "vidpid",
        }
    }

    /// True when the mode consults the VID/PID list.
    pub const fn uses_vidpid_list(self) -> bool {
        !matches!(self, DiscoveryMode::HidAndXbox)
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `"vvvv-pppp"` device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VidPid {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl VidPid {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    pub fn of(info: &UsbDeviceInfo) -> Self {
        Self::new(info.vendor_id, info.product_id)
    }

    pub fn matches(&self, info: &UsbDeviceInfo) -> bool {
        info.matches(self.vendor_id, self.product_id)
    }
}

impl fmt::Display for VidPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}-{:04x}", self.vendor_id, self.product_id)
    }
}

impl FromStr for VidPid {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVidPid(s.to_string());
        let (vid, pid) = s.trim().split_once('-').ok_or_else(invalid)?;
        if vid.len() != 4 || pid.len() != 4 {
            return Err(invalid());
        }
        let vendor_id = u16::from_str_radix(vid, 16).map_err(|_e| invalid())?;
        let product_id = u16::from_str_radix(pid, 16).map_err(|_e| invalid())?;
        Ok(Self::new(vendor_id, product_id))
    }
}

/// Applies a [`DiscoveryMode`] to enumerated devices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoveryFilter {
    mode: DiscoveryMode,
    allowed: Vec<VidPid>,
}

impl DiscoveryFilter {
    pub fn new(mode: DiscoveryMode, allowed: Vec<VidPid>) -> Self {
        Self { mode, allowed }
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    pub fn accepts(&self, info: &UsbDeviceInfo) -> bool {
        let listed = || self.allowed.iter().any(|id| id.matches(info));
        match self.mode {
            DiscoveryMode::HidAndXbox => info.has_hid_interface() || info.has_xbox_one_interface(),
            DiscoveryMode::VidpidAndXbox => listed() || info.has_xbox_one_interface(),
            DiscoveryMode::Vidpid => listed(),
        }
    }

    /// Enumerates `host` and keeps the accepted devices.
    pub fn discover(&self, host: &dyn UsbHost) -> UsbResult<Vec<UsbDeviceInfo>> {
        let devices = host.list_devices()?;
        let total = devices.len();
        let accepted: Vec<_> = devices
            .into_iter()
            .filter(|info| {
                let accepted = self.accepts(info);
                if !accepted {
                    debug!(device = %info.vid_pid(), mode = %self.mode, "device skipped by discovery filter");
                }
                accepted
            })
            .collect();
        debug!(total, accepted = accepted.len(), "usb discovery finished");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padbridge_usb::{InterfaceDescriptor, USB_CLASS_VENDOR_SPEC};
    use padbridge_usb::memory::MemoryHost;

    fn hid_pad() -> UsbDeviceInfo {
        UsbDeviceInfo::new(0x0079, 0x0006, "usb-1").with_interface(InterfaceDescriptor::hid(0))
    }

    fn xbox_pad() -> UsbDeviceInfo {
        UsbDeviceInfo::new(0x045e, 0x02ea, "usb-2").with_interface(InterfaceDescriptor::xbox_one(0))
    }

    fn vendor_only() -> UsbDeviceInfo {
        let mut interface = InterfaceDescriptor::hid(0);
        interface.class = USB_CLASS_VENDOR_SPEC;
        UsbDeviceInfo::new(0x1234, 0x5678, "usb-3").with_interface(interface)
    }

    #[test]
    fn test_vidpid_parse() -> Result<(), Box<dyn std::error::Error>> {
        let id: VidPid = "054c-09CC".parse()?;
        assert_eq!(id, VidPid::new(0x054c, 0x09cc));
        assert_eq!(id.to_string(), "054c-09cc");
        assert!("054c09cc".parse::<VidPid>().is_err());
        assert!("54c-9cc".parse::<VidPid>().is_err());
        assert!("zzzz-0001".parse::<VidPid>().is_err());
        Ok(())
    }

    #[test]
    fn test_hid_and_xbox_ignores_the_list() {
        let filter = DiscoveryFilter::new(DiscoveryMode::HidAndXbox, vec![]);
        assert!(filter.accepts(&hid_pad()));
        assert!(filter.accepts(&xbox_pad()));
        assert!(!filter.accepts(&vendor_only()));
    }

    #[test]
    fn test_vidpid_and_xbox() {
        let filter = DiscoveryFilter::new(DiscoveryMode::VidpidAndXbox, vec![VidPid::new(0x1234, 0x5678)]);
        assert!(!filter.accepts(&hid_pad()));
        assert!(filter.accepts(&xbox_pad()));
        assert!(filter.accepts(&vendor_only()));
    }

    #[test]
    fn test_vidpid_only() {
        let filter = DiscoveryFilter::new(DiscoveryMode::Vidpid, vec![VidPid::new(0x0079, 0x0006)]);
        assert!(filter.accepts(&hid_pad()));
        assert!(!filter.accepts(&xbox_pad()));
        assert!(!filter.accepts(&vendor_only()));
    }

    #[test]
    fn test_discover_filters_host_devices() -> Result<(), Box<dyn std::error::Error>> {
        let host = MemoryHost::new();
        let _hid = host.add_device(hid_pad());
        let _vendor = host.add_device(vendor_only());
        let found = DiscoveryFilter::default().discover(&host)?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "usb-1");
        Ok(())
    }

    #[test]
    fn test_mode_serde_names() -> Result<(), Box<dyn std::error::Error>> {
        let mode: DiscoveryMode = serde_json::from_str("\"vidpid_and_xbox\"")?;
        assert_eq!(mode, DiscoveryMode::VidpidAndXbox);
        assert_eq!(DiscoveryMode::Vidpid.to_string(), "vidpid");
        Ok(())
    }
}
