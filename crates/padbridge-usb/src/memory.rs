//! In-memory USB transport.
//!
//! [`MemoryDevice`] implements [`UsbDevice`] on top of crossbeam channels; the
//! paired [`MemoryDeviceHandle`] plays the device side: it queues input
//! reports, records everything the host wrote and can simulate unplugging.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use parking_lot::Mutex;
use tracing::trace;

use crate::{
    CancelToken, ControlTransfer, EndpointDirection, InterfaceDescriptor, TransportError,
    UsbDevice, UsbDeviceInfo, UsbEndpoint, UsbHost, UsbInterface, UsbResult,
};

#[derive(Debug, Default)]
struct Shared {
    opened: AtomicBool,
    fail_open: AtomicBool,
    unplugged: AtomicBool,
    resets: AtomicUsize,
    control_failure: Mutex<Option<String>>,
    control_log: Mutex<Vec<ControlTransfer>>,
    writes: Mutex<Vec<(u8, Vec<u8>)>>,
    senders: Mutex<Vec<Sender<Vec<u8>>>>,
}

struct MemoryEndpoint {
    device: String,
    interface: u8,
    direction: EndpointDirection,
    max_packet_size: u16,
    reports: Option<Receiver<Vec<u8>>>,
    shared: Arc<Shared>,
    cancel: CancelToken,
}

impl MemoryEndpoint {
    fn check_usable(&self) -> UsbResult<()> {
        if self.shared.unplugged.load(Ordering::Acquire) {
            return Err(TransportError::disconnected(self.device.clone()));
        }
        if !self.shared.opened.load(Ordering::Acquire) {
            return Err(TransportError::io(self.device.clone(), "device not open"));
        }
        Ok(())
    }
}

impl UsbEndpoint for MemoryEndpoint {
    fn direction(&self) -> EndpointDirection {
        self.direction
    }

    fn read(&mut self, buf: &mut [u8], timeout_us: u32) -> UsbResult<usize> {
        let Some(reports) = self.reports.as_ref() else {
            return Err(TransportError::invalid_endpoint(self.device.clone(), "IN"));
        };
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        self.check_usable()?;

        let timeout = Duration::from_micros(u64::from(timeout_us));
        let packet = select! {
            recv(reports) -> msg => msg.map_err(|e| {
                TransportError::disconnected(format!("{}: {e}", self.device))
            })?,
            recv(self.cancel.signal()) -> _ => return Err(TransportError::Cancelled),
            default(timeout) => return Err(TransportError::timeout(timeout_us)),
        };

        let len = packet.len().min(buf.len());
        buf[..len].copy_from_slice(&packet[..len]);
        trace!(device = %self.device, interface = self.interface, len, "memory read");
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> UsbResult<usize> {
        if self.direction != EndpointDirection::Out {
            return Err(TransportError::invalid_endpoint(self.device.clone(), "OUT"));
        }
        self.check_usable()?;
        self.shared.writes.lock().push((self.interface, data.to_vec()));
        Ok(data.len())
    }

    fn max_packet_size(&self) -> u16 {
        self.max_packet_size
    }
}

struct MemoryInterface {
    descriptor: InterfaceDescriptor,
    input: MemoryEndpoint,
    output: MemoryEndpoint,
    shared: Arc<Shared>,
}

impl UsbInterface for MemoryInterface {
    fn descriptor(&self) -> &InterfaceDescriptor {
        &self.descriptor
    }

    fn open(&mut self, in_max_packet_size: u16, out_max_packet_size: u16) -> UsbResult<()> {
        if in_max_packet_size != 0 {
            self.input.max_packet_size = in_max_packet_size;
        }
        if out_max_packet_size != 0 {
            self.output.max_packet_size = out_max_packet_size;
        }
        Ok(())
    }

    fn close(&mut self) {}

    fn in_endpoint(&mut self, index: usize) -> Option<&mut dyn UsbEndpoint> {
        (index == 0).then_some(&mut self.input as &mut dyn UsbEndpoint)
    }

    fn out_endpoint(&mut self, index: usize) -> Option<&mut dyn UsbEndpoint> {
        (index == 0).then_some(&mut self.output as &mut dyn UsbEndpoint)
    }

    fn control_transfer(&mut self, transfer: &ControlTransfer) -> UsbResult<usize> {
        self.input.check_usable()?;
        if let Some(message) = self.shared.control_failure.lock().clone() {
            return Err(TransportError::ControlTransfer {
                request: transfer.request,
                value: transfer.value,
                message,
            });
        }
        self.shared.control_log.lock().push(transfer.clone());
        Ok(transfer.data.len())
    }
}

/// Host side of an in-memory device.
pub struct MemoryDevice {
    info: UsbDeviceInfo,
    interfaces: Vec<Box<dyn UsbInterface>>,
    shared: Arc<Shared>,
    cancel: CancelToken,
}

impl MemoryDevice {
    /// Builds the device and its device-side handle. A descriptor without
    /// interfaces gets a single HID interface.
    pub fn new(mut info: UsbDeviceInfo) -> (Self, MemoryDeviceHandle) {
        if info.interfaces.is_empty() {
            info.interfaces.push(InterfaceDescriptor::hid(0));
        }

        let shared = Arc::new(Shared::default());
        let cancel = CancelToken::new();
        let mut interfaces: Vec<Box<dyn UsbInterface>> = Vec::with_capacity(info.interfaces.len());
        let mut senders = Vec::with_capacity(info.interfaces.len());

        for descriptor in &info.interfaces {
            let (tx, rx) = channel::unbounded();
            senders.push(tx);
            let endpoint = |direction, max_packet_size, reports| MemoryEndpoint {
                device: info.path.clone(),
                interface: descriptor.number,
                direction,
                max_packet_size,
                reports,
                shared: Arc::clone(&shared),
                cancel: cancel.clone(),
            };
            interfaces.push(Box::new(MemoryInterface {
                descriptor: descriptor.clone(),
                input: endpoint(EndpointDirection::In, descriptor.in_max_packet_size, Some(rx)),
                output: endpoint(EndpointDirection::Out, descriptor.out_max_packet_size, None),
                shared: Arc::clone(&shared),
            }));
        }
        *shared.senders.lock() = senders;

        let handle = MemoryDeviceHandle {
            shared: Arc::clone(&shared),
            cancel: cancel.clone(),
        };
        (
            Self {
                info,
                interfaces,
                shared,
                cancel,
            },
            handle,
        )
    }
}

impl UsbDevice for MemoryDevice {
    fn info(&self) -> &UsbDeviceInfo {
        &self.info
    }

    fn open(&mut self) -> UsbResult<()> {
        if self.shared.fail_open.load(Ordering::Acquire) {
            return Err(TransportError::OpenFailed(self.info.path.clone()));
        }
        self.shared.opened.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) {
        for interface in &mut self.interfaces {
            interface.close();
        }
        self.shared.opened.store(false, Ordering::Release);
    }

    fn reset(&mut self) {
        self.shared.resets.fetch_add(1, Ordering::AcqRel);
    }

    fn interfaces(&mut self) -> &mut [Box<dyn UsbInterface>] {
        &mut self.interfaces
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// Device side of an in-memory device. Cloneable; all clones share state.
#[derive(Clone)]
pub struct MemoryDeviceHandle {
    shared: Arc<Shared>,
    cancel: CancelToken,
}

impl MemoryDeviceHandle {
    /// Queues an input report on `interface`. Returns `false` once unplugged.
    pub fn push_report(&self, interface: usize, report: impl Into<Vec<u8>>) -> bool {
        let senders = self.shared.senders.lock();
        match senders.get(interface) {
            Some(tx) => tx.send(report.into()).is_ok(),
            None => false,
        }
    }

    /// Simulates removal: pending and future reads fail with `Disconnected`.
    pub fn unplug(&self) {
        self.shared.unplugged.store(true, Ordering::Release);
        self.shared.senders.lock().clear();
    }

    pub fn fail_open(&self, fail: bool) {
        self.shared.fail_open.store(fail, Ordering::Release);
    }

    pub fn fail_control_transfers(&self, message: Option<&str>) {
        *self.shared.control_failure.lock() = message.map(str::to_string);
    }

    pub fn is_open(&self) -> bool {
        self.shared.opened.load(Ordering::Acquire)
    }

    pub fn reset_count(&self) -> usize {
        self.shared.resets.load(Ordering::Acquire)
    }

    /// Every packet written to an OUT endpoint, tagged with its interface.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.shared.writes.lock().clone()
    }

    pub fn control_transfers(&self) -> Vec<ControlTransfer> {
        self.shared.control_log.lock().clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// A host whose devices are all in memory. Each device can be opened once.
/// Unplugged devices drop out of the listing.
#[derive(Default)]
pub struct MemoryHost {
    devices: Mutex<VecDeque<MemoryDevice>>,
    listed: Mutex<Vec<(UsbDeviceInfo, Arc<Shared>)>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugs a device in and returns its device-side handle. A device that
    /// reuses the path of an unplugged one replaces it.
    pub fn add_device(&self, info: UsbDeviceInfo) -> MemoryDeviceHandle {
        let (device, handle) = MemoryDevice::new(info);
        let mut listed = self.listed.lock();
        listed.retain(|(_, shared)| !shared.unplugged.load(Ordering::Acquire));
        listed.push((device.info.clone(), Arc::clone(&device.shared)));
        let mut devices = self.devices.lock();
        devices.retain(|d| !d.shared.unplugged.load(Ordering::Acquire));
        devices.push_back(device);
        handle
    }

    /// Devices currently plugged in.
    pub fn device_count(&self) -> usize {
        self.listed
            .lock()
            .iter()
            .filter(|(_, shared)| !shared.unplugged.load(Ordering::Acquire))
            .count()
    }
}

impl UsbHost for MemoryHost {
    fn list_devices(&self) -> UsbResult<Vec<UsbDeviceInfo>> {
        Ok(self
            .listed
            .lock()
            .iter()
            .filter(|(_, shared)| !shared.unplugged.load(Ordering::Acquire))
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn open_device(&self, info: &UsbDeviceInfo) -> UsbResult<Box<dyn UsbDevice>> {
        let mut devices = self.devices.lock();
        let position = devices
            .iter()
            .position(|d| d.info.path == info.path && !d.shared.unplugged.load(Ordering::Acquire))
            .ok_or_else(|| TransportError::OpenFailed(info.path.clone()))?;
        match devices.remove(position) {
            Some(device) => Ok(Box::new(device)),
            None => Err(TransportError::OpenFailed(info.path.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_device() -> Result<(MemoryDevice, MemoryDeviceHandle), TransportError> {
        let (mut device, handle) = MemoryDevice::new(UsbDeviceInfo::new(0x1234, 0x5678, "mem-0"));
        device.open()?;
        Ok((device, handle))
    }

    #[test]
    fn test_read_returns_queued_report() -> Result<(), Box<dyn std::error::Error>> {
        let (mut device, handle) = open_device()?;
        assert!(handle.push_report(0, vec![0xAA, 0xBB, 0xCC]));

        let mut buf = [0u8; 8];
        let endpoint = device.interfaces()[0].in_endpoint(0).ok_or("no IN endpoint")?;
        let len = endpoint.read(&mut buf, 1_000)?;
        assert_eq!(&buf[..len], &[0xAA, 0xBB, 0xCC]);
        Ok(())
    }

    #[test]
    fn test_read_times_out() -> Result<(), Box<dyn std::error::Error>> {
        let (mut device, _handle) = open_device()?;
        let mut buf = [0u8; 8];
        let endpoint = device.interfaces()[0].in_endpoint(0).ok_or("no IN endpoint")?;
        assert_eq!(endpoint.read(&mut buf, 500), Err(TransportError::timeout(500)));
        Ok(())
    }

    #[test]
    fn test_unplug_disconnects() -> Result<(), Box<dyn std::error::Error>> {
        let (mut device, handle) = open_device()?;
        handle.unplug();
        let mut buf = [0u8; 8];
        let endpoint = device.interfaces()[0].in_endpoint(0).ok_or("no IN endpoint")?;
        assert!(matches!(
            endpoint.read(&mut buf, 500),
            Err(TransportError::Disconnected(_))
        ));
        assert!(!handle.push_report(0, vec![1]));
        Ok(())
    }

    #[test]
    fn test_write_and_control_are_recorded() -> Result<(), Box<dyn std::error::Error>> {
        let (mut device, handle) = open_device()?;
        let interface = &mut device.interfaces()[0];
        interface
            .out_endpoint(0)
            .ok_or("no OUT endpoint")?
            .write(&[0x05, 0x07])?;
        interface.control_transfer(&ControlTransfer::set_report(0x03F4, 0, &[0x42, 0x0C, 0, 0]))?;

        assert_eq!(handle.writes(), vec![(0, vec![0x05, 0x07])]);
        let transfers = handle.control_transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].value, 0x03F4);
        Ok(())
    }

    #[test]
    fn test_wrong_direction_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let (mut device, _handle) = open_device()?;
        let interface = &mut device.interfaces()[0];
        let result = interface.in_endpoint(0).ok_or("no IN endpoint")?.write(&[1]);
        assert!(matches!(result, Err(TransportError::InvalidEndpoint { .. })));
        Ok(())
    }

    #[test]
    fn test_fail_open() {
        let (mut device, handle) = MemoryDevice::new(UsbDeviceInfo::new(1, 2, "mem-1"));
        handle.fail_open(true);
        assert!(matches!(device.open(), Err(TransportError::OpenFailed(_))));
        assert!(!handle.is_open());
    }

    #[test]
    fn test_host_opens_each_device_once() -> Result<(), Box<dyn std::error::Error>> {
        let host = MemoryHost::new();
        let _handle = host.add_device(UsbDeviceInfo::new(1, 2, "mem-2"));
        let listed = host.list_devices()?;
        assert_eq!(listed.len(), 1);
        assert!(host.open_device(&listed[0]).is_ok());
        assert!(host.open_device(&listed[0]).is_err());
        Ok(())
    }

    #[test]
    fn test_unplugged_device_leaves_listing_until_replugged() -> Result<(), Box<dyn std::error::Error>> {
        let host = MemoryHost::new();
        let first = host.add_device(UsbDeviceInfo::new(1, 2, "mem-3"));
        first.unplug();
        assert!(host.list_devices()?.is_empty());
        assert_eq!(host.device_count(), 0);

        let second = host.add_device(UsbDeviceInfo::new(1, 2, "mem-3"));
        let listed = host.list_devices()?;
        assert_eq!(listed.len(), 1);
        let mut device = host.open_device(&listed[0])?;
        device.open()?;
        assert!(second.is_open());
        assert!(!first.is_open());
        Ok(())
    }
}
