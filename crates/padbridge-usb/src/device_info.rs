//! Descriptor-level information about USB devices

use serde::{Deserialize, Serialize};

/// USB interface class for HID.
pub const USB_CLASS_HID: u8 = 0x03;
/// Vendor-specific interface class.
pub const USB_CLASS_VENDOR_SPEC: u8 = 0xFF;
/// Xbox One GIP interface subclass/protocol.
pub const XBOX_ONE_SUBCLASS: u8 = 0x47;
pub const XBOX_ONE_PROTOCOL: u8 = 0xD0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub number: u8,
    pub class: u8,
    #[serde(default)]
    pub subclass: u8,
    #[serde(default)]
    pub protocol: u8,
    #[serde(default = "default_packet_size")]
    pub in_max_packet_size: u16,
    #[serde(default = "default_packet_size")]
    pub out_max_packet_size: u16,
}

fn default_packet_size() -> u16 {
    64
}

impl InterfaceDescriptor {
    pub fn hid(number: u8) -> Self {
        Self {
            number,
            class: USB_CLASS_HID,
            subclass: 0,
            protocol: 0,
            in_max_packet_size: default_packet_size(),
            out_max_packet_size: default_packet_size(),
        }
    }

    pub fn xbox_one(number: u8) -> Self {
        Self {
            number,
            class: USB_CLASS_VENDOR_SPEC,
            subclass: XBOX_ONE_SUBCLASS,
            protocol: XBOX_ONE_PROTOCOL,
            in_max_packet_size: default_packet_size(),
            out_max_packet_size: default_packet_size(),
        }
    }

    pub fn is_hid(&self) -> bool {
        self.class == USB_CLASS_HID
    }

    pub fn is_xbox_one(&self) -> bool {
        self.class == USB_CLASS_VENDOR_SPEC
            && self.subclass == XBOX_ONE_SUBCLASS
            && self.protocol == XBOX_ONE_PROTOCOL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDescriptor>,
}

impl UsbDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
            serial_number: None,
            manufacturer: None,
            product_name: None,
            interfaces: Vec::new(),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_interface(mut self, interface: InterfaceDescriptor) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// `"vvvv-pppp"` identifier used as the configuration section name.
    pub fn vid_pid(&self) -> String {
        format!("{:04x}-{:04x}", self.vendor_id, self.product_id)
    }

    pub fn has_hid_interface(&self) -> bool {
        self.interfaces.iter().any(InterfaceDescriptor::is_hid)
    }

    pub fn has_xbox_one_interface(&self) -> bool {
        self.interfaces.iter().any(InterfaceDescriptor::is_xbox_one)
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| self.vid_pid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_creation() {
        let info = UsbDeviceInfo::new(0x054c, 0x05c4, "usb-1").with_interface(InterfaceDescriptor::hid(0));
        assert!(info.matches(0x054c, 0x05c4));
        assert!(!info.matches(0x054c, 0x0268));
        assert!(info.has_hid_interface());
        assert!(!info.has_xbox_one_interface());
        assert_eq!(info.vid_pid(), "054c-05c4");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let info = UsbDeviceInfo::new(0x045e, 0x02ea, "usb-2").with_product_name("Pad");
        assert_eq!(info.display_name(), "Pad");

        let info = UsbDeviceInfo::new(0x045e, 0x02ea, "usb-2").with_manufacturer("Vendor");
        assert_eq!(info.display_name(), "Vendor");

        let info = UsbDeviceInfo::new(0x045e, 0x02ea, "usb-2");
        assert_eq!(info.display_name(), "045e-02ea");
    }

    #[test]
    fn test_xbox_interface_detection() {
        let info = UsbDeviceInfo::new(0x045e, 0x02ea, "usb-3").with_interface(InterfaceDescriptor::xbox_one(0));
        assert!(info.has_xbox_one_interface());
        assert!(!info.has_hid_interface());
    }
}
