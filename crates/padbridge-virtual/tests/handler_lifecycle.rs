//! Attach/detach lifecycle of the polling handler, driven through in-memory
//! USB devices and a backend that records every call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use padbridge_controller_types::{
    AnalogAxis, AnalogBinding, ControllerButton, ControllerConfig, ControllerFeature, RawInputData,
    StickConfig,
};
use padbridge_controllers::vendor::{GamecubeAdapterController, GenericHidController};
use padbridge_controllers::{Controller, ControllerResult, Decoded, Poll};
use padbridge_errors::{BackendError, TransportError};
use padbridge_test_helpers::wait_until;
use padbridge_usb::memory::{MemoryDevice, MemoryDeviceHandle};
use padbridge_usb::{CancelToken, InterfaceDescriptor, UsbDeviceInfo};
use padbridge_virtual::npad::{NpadButtons, StickState};
use padbridge_virtual::{
    BackendResult, HandlerOptions, InputPoller, MAX_INPUTS, VirtualBackend, VirtualGamepadHandler,
};
use parking_lot::Mutex;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Attach(u16),
    Detach(u16),
    Update(u16, NpadButtons, StickState),
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    drop_next_update: Arc<AtomicBool>,
    fail_next_detach: Arc<AtomicBool>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn count(&self, wanted: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| wanted(e)).count()
    }

    fn clear(&self) {
        self.events.lock().clear();
    }

    fn backend(&self) -> Box<dyn VirtualBackend> {
        Box::new(RecordingBackend {
            recorder: self.clone(),
            attached: [false; MAX_INPUTS as usize],
        })
    }
}

struct RecordingBackend {
    recorder: Recorder,
    attached: [bool; MAX_INPUTS as usize],
}

impl VirtualBackend for RecordingBackend {
    fn attach_controller(&mut self, index: u16) -> BackendResult<()> {
        self.recorder.events.lock().push(Event::Attach(index));
        self.attached[usize::from(index)] = true;
        Ok(())
    }

    fn detach_controller(&mut self, index: u16) -> BackendResult<()> {
        if self.recorder.fail_next_detach.swap(false, Ordering::SeqCst) {
            return Err(BackendError::platform("detach", 0x1));
        }
        self.recorder.events.lock().push(Event::Detach(index));
        self.attached[usize::from(index)] = false;
        Ok(())
    }

    fn update_controller_state(
        &mut self,
        buttons: NpadButtons,
        stick_l: StickState,
        _stick_r: StickState,
        index: u16,
    ) -> BackendResult<()> {
        if self.recorder.drop_next_update.swap(false, Ordering::SeqCst) {
            return Err(BackendError::DeviceRemoved { index });
        }
        if !self.attached[usize::from(index)] {
            return Err(BackendError::NotAttached { index });
        }
        self.recorder
            .events
            .lock()
            .push(Event::Update(index, buttons, stick_l));
        Ok(())
    }

    fn is_controller_attached(&self, index: u16) -> bool {
        self.attached.get(usize::from(index)).copied().unwrap_or(false)
    }
}

const NEUTRAL: [u8; 8] = [0x01, 0x80, 0x80, 0x80, 0x80, 0x08, 0x00, 0x00];
/// Button 1 held.
const BUTTON_1: [u8; 8] = [0x01, 0x80, 0x80, 0x80, 0x80, 0x18, 0x00, 0x00];
/// Buttons 5 and 6 held.
const BUTTONS_5_6: [u8; 8] = [0x01, 0x80, 0x80, 0x80, 0x80, 0x08, 0x03, 0x00];

/// Controller whose reads always produce the same outcome.
struct ScriptedController {
    info: UsbDeviceInfo,
    config: ControllerConfig,
    cancel: CancelToken,
    connected: bool,
    failure: Option<TransportError>,
}

impl ScriptedController {
    fn new(connected: bool, failure: Option<TransportError>) -> Self {
        Self {
            info: pad_info(),
            config: ControllerConfig::default(),
            cancel: CancelToken::new(),
            connected,
            failure,
        }
    }
}

impl Controller for ScriptedController {
    fn initialize(&mut self) -> ControllerResult<()> {
        Ok(())
    }

    fn exit(&mut self) {}

    fn read_raw(&mut self, _timeout_us: u32) -> Poll<RawInputData> {
        match &self.failure {
            Some(e) => Poll::failed(0, e.clone()),
            None => Poll::input(0, RawInputData::default()),
        }
    }

    fn support(&self, _feature: ControllerFeature) -> bool {
        false
    }

    fn set_rumble(&mut self, _index: u16, _amp_high: f32, _amp_low: f32) -> ControllerResult<()> {
        Ok(())
    }

    fn is_controller_connected(&self, _index: u16) -> bool {
        self.connected
    }

    fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn device_info(&self) -> &UsbDeviceInfo {
        &self.info
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

fn pad_info() -> UsbDeviceInfo {
    UsbDeviceInfo::new(0x0079, 0x0006, "mem-pad").with_interface(InterfaceDescriptor::hid(0))
}

fn pad_config() -> ControllerConfig {
    ControllerConfig::default()
        .with_pins(ControllerButton::A, &[1])
        .with_pins(ControllerButton::L, &[5])
        .with_pins(ControllerButton::R, &[6])
}

fn generic_pad() -> Result<(Box<dyn Controller>, MemoryDeviceHandle), Box<dyn std::error::Error>> {
    let (device, handle) = MemoryDevice::new(pad_info());
    let mut controller = GenericHidController::new(Box::new(device), pad_config());
    controller.initialize()?;
    Ok((Box::new(controller), handle))
}

#[test]
fn read_timeout_is_split_across_interfaces() {
    let recorder = Recorder::default();
    let info = pad_info().with_interface(InterfaceDescriptor::hid(1));
    let (device, _handle) = MemoryDevice::new(info);
    let controller = GenericHidController::new(Box::new(device), pad_config());
    let poller = InputPoller::new(Box::new(controller), recorder.backend(), 10);
    assert_eq!(poller.timeout_us(), 5_000);
}

#[test]
fn first_input_attaches_then_updates() -> TestResult {
    let recorder = Recorder::default();
    let (controller, handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 10);

    assert!(handle.push_report(0, BUTTON_1));
    assert!(handle.push_report(0, NEUTRAL));
    assert!(matches!(poller.poll_once().result, Ok(Decoded::Input(()))));
    assert!(matches!(poller.poll_once().result, Ok(Decoded::Input(()))));

    assert_eq!(
        recorder.events(),
        vec![
            Event::Attach(0),
            Event::Update(0, NpadButtons::A, StickState::CENTER),
            Event::Update(0, NpadButtons::empty(), StickState::CENTER),
        ]
    );
    assert!(poller.is_input_connected(0));
    Ok(())
}

#[test]
fn timeout_publishes_nothing() -> TestResult {
    let recorder = Recorder::default();
    let (controller, _handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 1);

    let poll = poller.poll_once();
    assert!(poll.is_timeout());
    assert!(recorder.events().is_empty());
    Ok(())
}

#[test]
fn unplug_detaches_exactly_once() -> TestResult {
    let recorder = Recorder::default();
    let (controller, handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 1);

    assert!(handle.push_report(0, NEUTRAL));
    assert!(poller.poll_once().result.is_ok());

    handle.unplug();
    for _ in 0..5 {
        assert!(poller.poll_once().result.is_err());
    }
    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(0))), 1);
    assert!(!poller.is_input_connected(0));
    assert!(!poller.backend().is_controller_attached(0));
    Ok(())
}

#[test]
fn shoulder_chord_forces_one_reattach() -> TestResult {
    let recorder = Recorder::default();
    let (controller, handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 10);

    assert!(handle.push_report(0, NEUTRAL));
    assert!(poller.poll_once().result.is_ok());
    recorder.clear();

    for _ in 0..3 {
        assert!(handle.push_report(0, BUTTONS_5_6));
        assert!(poller.poll_once().result.is_ok());
    }

    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(0))), 1);
    assert_eq!(recorder.count(|e| matches!(e, Event::Attach(0))), 1);
    assert_eq!(
        recorder.count(|e| matches!(e, Event::Update(0, b, _) if *b == NpadButtons::L | NpadButtons::R)),
        3
    );
    Ok(())
}

#[test]
fn failed_reattach_detach_is_retried() -> TestResult {
    let recorder = Recorder::default();
    let (controller, handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 10);

    assert!(handle.push_report(0, NEUTRAL));
    assert!(poller.poll_once().result.is_ok());
    recorder.clear();

    recorder.fail_next_detach.store(true, Ordering::SeqCst);
    assert!(handle.push_report(0, BUTTONS_5_6));
    assert!(poller.poll_once().result.is_err());
    assert!(recorder.events().is_empty());

    // Chord still held: no new rising edge, the pending re-attach carries over.
    assert!(handle.push_report(0, BUTTONS_5_6));
    assert!(matches!(poller.poll_once().result, Ok(Decoded::Input(()))));
    assert_eq!(
        recorder.events(),
        vec![
            Event::Detach(0),
            Event::Attach(0),
            Event::Update(0, NpadButtons::L | NpadButtons::R, StickState::CENTER),
        ]
    );
    Ok(())
}

#[test]
fn disconnected_input_publishes_nothing() {
    let recorder = Recorder::default();
    let controller = ScriptedController::new(false, None);
    let mut poller = InputPoller::new(Box::new(controller), recorder.backend(), 10);

    for _ in 0..3 {
        assert!(matches!(poller.poll_once().result, Ok(Decoded::NothingToDo)));
    }
    assert!(!poller.is_input_connected(0));
    assert!(recorder.events().is_empty());
}

#[test]
fn device_removed_is_recovered_silently() -> TestResult {
    let recorder = Recorder::default();
    let (controller, handle) = generic_pad()?;
    let mut poller = InputPoller::new(controller, recorder.backend(), 10);

    assert!(handle.push_report(0, NEUTRAL));
    assert!(poller.poll_once().result.is_ok());

    recorder.drop_next_update.store(true, Ordering::SeqCst);
    assert!(handle.push_report(0, BUTTON_1));
    assert!(matches!(poller.poll_once().result, Ok(Decoded::NothingToDo)));
    assert!(!poller.backend().is_controller_attached(0));

    recorder.clear();
    assert!(handle.push_report(0, BUTTON_1));
    assert!(poller.poll_once().result.is_ok());
    assert_eq!(
        recorder.events(),
        vec![Event::Attach(0), Event::Update(0, NpadButtons::A, StickState::CENTER)]
    );
    Ok(())
}

#[test]
fn full_left_stick_reaches_platform_range() -> TestResult {
    let recorder = Recorder::default();
    let (device, handle) = MemoryDevice::new(pad_info());
    let config = pad_config().with_stick(
        0,
        StickConfig {
            x: Some(AnalogBinding::positive(AnalogAxis::X)),
            y: Some(AnalogBinding::positive(AnalogAxis::Y)),
        },
    );
    let mut controller = GenericHidController::new(Box::new(device), config);
    controller.initialize()?;
    let mut poller = InputPoller::new(Box::new(controller), recorder.backend(), 10);

    // X full left, Y full up
    assert!(handle.push_report(0, [0x01, 0x00, 0x00, 0x80, 0x80, 0x08, 0x00, 0x00]));
    assert!(poller.poll_once().result.is_ok());

    let Some(Event::Update(_, _, stick)) = recorder.events().last().copied() else {
        return Err("no update".into());
    };
    assert!(stick.x < -32000, "x = {}", stick.x);
    assert!(stick.y > 32000, "y = {}", stick.y);
    Ok(())
}

/// Port 0 wired, ports 1..3 empty.
const ADAPTER_PORT0: [u8; 37] = [
    0x21, //
    0x14, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const ADAPTER_EMPTY: [u8; 37] = {
    let mut report = [0u8; 37];
    report[0] = 0x21;
    report
};

#[test]
fn adapter_ports_attach_and_detach_independently() -> TestResult {
    let recorder = Recorder::default();
    let info = UsbDeviceInfo::new(0x057E, 0x0337, "mem-gc").with_interface(InterfaceDescriptor::hid(0));
    let (device, handle) = MemoryDevice::new(info);
    let mut controller = GamecubeAdapterController::new(Box::new(device), ControllerConfig::default());
    controller.initialize()?;
    let mut poller = InputPoller::new(Box::new(controller), recorder.backend(), 10);

    assert!(handle.push_report(0, ADAPTER_PORT0));
    let first = poller.poll_once();
    assert_eq!(first.index, 0);
    assert!(matches!(first.result, Ok(Decoded::Input(()))));
    for port in 1..4 {
        let poll = poller.poll_once();
        assert_eq!(poll.index, port);
        assert!(matches!(poll.result, Ok(Decoded::NothingToDo)));
    }
    assert_eq!(recorder.count(|e| matches!(e, Event::Attach(_))), 1);

    assert!(handle.push_report(0, ADAPTER_EMPTY));
    for _ in 0..4 {
        assert!(matches!(poller.poll_once().result, Ok(Decoded::NothingToDo)));
    }
    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(_))), 1);
    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(0))), 1);
    Ok(())
}

/// Ports 0 and 2 wired.
const ADAPTER_PORTS_0_2: [u8; 37] = [
    0x21, //
    0x14, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x14, 0x00, 0x00, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[test]
fn adapter_unplug_detaches_every_live_port() -> TestResult {
    let recorder = Recorder::default();
    let info = UsbDeviceInfo::new(0x057E, 0x0337, "mem-gc").with_interface(InterfaceDescriptor::hid(0));
    let (device, handle) = MemoryDevice::new(info);
    let mut controller = GamecubeAdapterController::new(Box::new(device), ControllerConfig::default());
    controller.initialize()?;
    let mut poller = InputPoller::new(Box::new(controller), recorder.backend(), 10);

    assert!(handle.push_report(0, ADAPTER_PORTS_0_2));
    for _ in 0..4 {
        assert!(poller.poll_once().result.is_ok());
    }
    assert_eq!(recorder.count(|e| matches!(e, Event::Attach(0))), 1);
    assert_eq!(recorder.count(|e| matches!(e, Event::Attach(2))), 1);

    handle.unplug();
    for _ in 0..8 {
        assert!(poller.poll_once().result.is_err());
    }
    for port in [0, 2] {
        assert_eq!(recorder.count(|e| *e == Event::Detach(port)), 1, "port {port}");
        assert!(!poller.is_input_connected(port));
        assert!(!poller.backend().is_controller_attached(port));
    }
    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(_))), 2);
    Ok(())
}

#[test]
fn unrecoverable_failure_stops_the_input_thread() -> TestResult {
    let recorder = Recorder::default();
    let failure = TransportError::OpenFailed("mem-pad".to_string());
    let controller = ScriptedController::new(true, Some(failure));
    let mut handler =
        VirtualGamepadHandler::new(Box::new(controller), recorder.backend(), HandlerOptions::default());

    handler.initialize()?;
    assert!(wait_until(Duration::from_secs(2), || !handler.is_running()));
    assert!(recorder.events().is_empty());

    handler.exit();
    assert!(!handler.is_running());
    Ok(())
}

#[test]
fn recoverable_failure_keeps_polling() -> TestResult {
    let recorder = Recorder::default();
    let controller = ScriptedController::new(true, Some(TransportError::disconnected("mem-pad")));
    let mut handler =
        VirtualGamepadHandler::new(Box::new(controller), recorder.backend(), HandlerOptions::default());

    handler.initialize()?;
    std::thread::sleep(Duration::from_millis(20));
    assert!(handler.is_running());
    handler.exit();
    assert!(!handler.is_running());
    Ok(())
}

#[test]
fn handler_thread_publishes_and_exits() -> TestResult {
    let recorder = Recorder::default();
    let (device, handle) = MemoryDevice::new(pad_info());
    let controller = GenericHidController::new(Box::new(device), pad_config());
    let mut handler = VirtualGamepadHandler::new(
        Box::new(controller),
        recorder.backend(),
        HandlerOptions {
            polling_timeout_ms: 5,
            thread_niceness: 0,
        },
    );

    handler.initialize()?;
    assert!(handler.is_running());
    assert!(handle.push_report(0, BUTTON_1));
    assert!(wait_until(Duration::from_secs(2), || {
        recorder.count(|e| matches!(e, Event::Update(0, b, _) if *b == NpadButtons::A)) > 0
    }));

    handler.exit();
    assert!(!handler.is_running());
    assert!(!handle.is_open());
    assert_eq!(recorder.events().last(), Some(&Event::Detach(0)));

    handler.exit();
    assert_eq!(recorder.count(|e| matches!(e, Event::Detach(0))), 1);
    Ok(())
}

#[test]
fn dropping_running_handler_stops_it() -> TestResult {
    let recorder = Recorder::default();
    let (device, handle) = MemoryDevice::new(pad_info());
    let controller = GenericHidController::new(Box::new(device), pad_config());
    let mut handler =
        VirtualGamepadHandler::new(Box::new(controller), recorder.backend(), HandlerOptions::default());
    handler.initialize()?;
    assert!(handle.push_report(0, NEUTRAL));
    assert!(wait_until(Duration::from_secs(2), || {
        recorder.count(|e| matches!(e, Event::Attach(0))) == 1
    }));

    drop(handler);
    assert!(!handle.is_open());
    Ok(())
}

#[test]
fn failed_bring_up_leaves_handler_idle() {
    let recorder = Recorder::default();
    let (device, handle) = MemoryDevice::new(pad_info());
    handle.fail_open(true);
    let controller = GenericHidController::new(Box::new(device), pad_config());
    let mut handler =
        VirtualGamepadHandler::new(Box::new(controller), recorder.backend(), HandlerOptions::default());

    assert!(handler.initialize().is_err());
    assert!(!handler.is_running());
    assert!(recorder.events().is_empty());
}
