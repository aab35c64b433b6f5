//! USB transport traits

use serde::{Deserialize, Serialize};

use crate::{CancelToken, InterfaceDescriptor, UsbDeviceInfo, UsbResult};

/// bmRequestType: host-to-device, class, interface.
pub const REQUEST_TYPE_CLASS_INTERFACE_OUT: u8 = 0x21;
/// HID SET_REPORT.
pub const HID_SET_REPORT: u8 = 0x09;

/// A control transfer setup packet plus its data stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTransfer {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub data: Vec<u8>,
}

impl ControlTransfer {
    /// HID SET_REPORT on interface `index`.
    pub fn set_report(value: u16, index: u16, data: &[u8]) -> Self {
        Self {
            request_type: REQUEST_TYPE_CLASS_INTERFACE_OUT,
            request: HID_SET_REPORT,
            value,
            index,
            data: data.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointDirection {
    In,
    Out,
}

impl EndpointDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            EndpointDirection::In => "IN",
            EndpointDirection::Out => "OUT",
        }
    }
}

pub trait UsbEndpoint: Send {
    fn direction(&self) -> EndpointDirection;

    /// Blocks until a packet arrives, the timeout elapses or the device's
    /// [`CancelToken`] fires. Returns the number of bytes copied into `buf`.
    fn read(&mut self, buf: &mut [u8], timeout_us: u32) -> UsbResult<usize>;

    fn write(&mut self, data: &[u8]) -> UsbResult<usize>;

    fn max_packet_size(&self) -> u16;
}

pub trait UsbInterface: Send {
    fn descriptor(&self) -> &InterfaceDescriptor;

    /// Opens the endpoints. A packet size of 0 keeps the descriptor value.
    fn open(&mut self, in_max_packet_size: u16, out_max_packet_size: u16) -> UsbResult<()>;

    fn close(&mut self);

    fn in_endpoint(&mut self, index: usize) -> Option<&mut dyn UsbEndpoint>;

    fn out_endpoint(&mut self, index: usize) -> Option<&mut dyn UsbEndpoint>;

    fn control_transfer(&mut self, transfer: &ControlTransfer) -> UsbResult<usize>;
}

pub trait UsbDevice: Send {
    fn info(&self) -> &UsbDeviceInfo;

    fn open(&mut self) -> UsbResult<()>;

    fn close(&mut self);

    fn reset(&mut self);

    fn interfaces(&mut self) -> &mut [Box<dyn UsbInterface>];

    /// Token that interrupts blocking reads on this device.
    fn cancel_token(&self) -> CancelToken;
}

/// Enumerates and opens devices.
pub trait UsbHost: Send + Sync {
    fn list_devices(&self) -> UsbResult<Vec<UsbDeviceInfo>>;

    fn open_device(&self, info: &UsbDeviceInfo) -> UsbResult<Box<dyn UsbDevice>>;
}
