//! Endpoint discovery and I/O helpers shared by the drivers.
//!
//! Drivers keep [`Pipe`] coordinates instead of endpoint references so the
//! device can stay owned by the controller.

use padbridge_controller_types::ControllerConfig;
use padbridge_usb::{
    ControlTransfer, EndpointDirection, InterfaceDescriptor, TransportError, UsbDevice, UsbResult,
};
use tracing::debug;

/// Endpoint indices probed on each interface.
pub const MAX_ENDPOINTS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipe {
    pub interface: usize,
    pub endpoint: usize,
}

/// First usable IN pipe and, when one exists, first usable OUT pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipes {
    pub input: Pipe,
    pub output: Option<Pipe>,
}

/// Opens `device`, then every interface accepted by `accept` with the
/// configured packet sizes, and picks the first IN and OUT endpoints.
///
/// Fails with `InvalidEndpoint` when no IN endpoint (or, if `require_output`,
/// no OUT endpoint) was found.
pub fn open_pipes(
    device: &mut dyn UsbDevice,
    config: &ControllerConfig,
    accept: impl Fn(&InterfaceDescriptor) -> bool,
    require_output: bool,
) -> UsbResult<Pipes> {
    device.open()?;
    let name = device.info().vid_pid();

    let mut input = None;
    let mut output = None;
    for (index, interface) in device.interfaces().iter_mut().enumerate() {
        if !accept(interface.descriptor()) {
            continue;
        }
        interface.open(config.input_max_packet_size, config.output_max_packet_size)?;
        debug!(
            device = %name,
            interface = index,
            class = interface.descriptor().class,
            protocol = interface.descriptor().protocol,
            "interface opened"
        );

        if input.is_none() {
            input = (0..MAX_ENDPOINTS)
                .find(|&ep| interface.in_endpoint(ep).is_some())
                .map(|endpoint| Pipe { interface: index, endpoint });
        }
        if output.is_none() {
            output = (0..MAX_ENDPOINTS)
                .find(|&ep| interface.out_endpoint(ep).is_some())
                .map(|endpoint| Pipe { interface: index, endpoint });
        }
    }

    let input = input.ok_or_else(|| {
        TransportError::invalid_endpoint(name.clone(), EndpointDirection::In.as_str())
    })?;
    if require_output && output.is_none() {
        return Err(TransportError::invalid_endpoint(
            name,
            EndpointDirection::Out.as_str(),
        ));
    }
    Ok(Pipes { input, output })
}

pub fn read(device: &mut dyn UsbDevice, pipe: Pipe, buf: &mut [u8], timeout_us: u32) -> UsbResult<usize> {
    let name = device.info().vid_pid();
    device
        .interfaces()
        .get_mut(pipe.interface)
        .and_then(|interface| interface.in_endpoint(pipe.endpoint))
        .ok_or_else(|| TransportError::invalid_endpoint(name, EndpointDirection::In.as_str()))?
        .read(buf, timeout_us)
}

pub fn write(device: &mut dyn UsbDevice, pipe: Option<Pipe>, data: &[u8]) -> UsbResult<usize> {
    let name = device.info().vid_pid();
    let Some(pipe) = pipe else {
        return Err(TransportError::invalid_endpoint(name, EndpointDirection::Out.as_str()));
    };
    device
        .interfaces()
        .get_mut(pipe.interface)
        .and_then(|interface| interface.out_endpoint(pipe.endpoint))
        .ok_or_else(|| TransportError::invalid_endpoint(name, EndpointDirection::Out.as_str()))?
        .write(data)
}

pub fn control(device: &mut dyn UsbDevice, interface: usize, transfer: &ControlTransfer) -> UsbResult<usize> {
    let name = device.info().vid_pid();
    device
        .interfaces()
        .get_mut(interface)
        .ok_or_else(|| TransportError::io(name, format!("no interface {interface}")))?
        .control_transfer(transfer)
}
