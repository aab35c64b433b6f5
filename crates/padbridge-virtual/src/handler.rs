//! Per-controller polling loop and attach/detach lifecycle.
//!
//! [`InputPoller`] runs one decode → bind → publish step per call and keeps
//! the per-input connection bookkeeping. [`VirtualGamepadHandler`] owns the
//! dedicated thread that drives it.
//!
//! Per logical input the state moves Disconnected → connected but detached
//! → attached, and back to Disconnected when the controller reports the
//! input gone. The backend is detached exactly once per such transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use padbridge_controller_types::NormalizedButtonData;
use padbridge_controllers::{Controller, ControllerResult, Decoded, Poll};
use padbridge_errors::{DecodeError, ErrorCategory, ErrorSeverity, PadbridgeError, TransportError};
use padbridge_usb::CancelToken;
use tracing::{debug, error, info, warn};

use crate::backend::VirtualBackend;
use crate::npad::{NpadButtons, convert_stick};
use crate::priority::apply_thread_niceness;

/// Polls slower than this are logged unless they timed out.
pub const SLOW_POLL_BUDGET: Duration = Duration::from_millis(30);

/// Pause after a failed poll before reading again.
pub const FAILURE_BACKOFF: Duration = Duration::from_micros(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Read budget per poll, split across the device's interfaces.
    pub polling_timeout_ms: u32,
    /// Niceness applied to the polling thread, 0 leaves it unchanged.
    pub thread_niceness: i32,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            polling_timeout_ms: 10,
            thread_niceness: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct InputSlot {
    connected: bool,
    /// Attach again on the next successful read.
    reattach: bool,
    chord_held: bool,
}

/// One controller wired to one backend.
pub struct InputPoller {
    controller: Box<dyn Controller>,
    backend: Box<dyn VirtualBackend>,
    slots: Vec<InputSlot>,
    timeout_us: u32,
}

impl InputPoller {
    pub fn new(
        controller: Box<dyn Controller>,
        backend: Box<dyn VirtualBackend>,
        polling_timeout_ms: u32,
    ) -> Self {
        let interfaces = u32::try_from(controller.interface_count())
            .unwrap_or(u32::MAX)
            .max(1);
        let timeout_us = polling_timeout_ms.saturating_mul(1000) / interfaces;
        let slots = vec![InputSlot::default(); usize::from(controller.input_count())];
        Self {
            controller,
            backend,
            slots,
            timeout_us,
        }
    }

    /// Read timeout handed to the controller on every poll.
    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    pub fn controller_mut(&mut self) -> &mut dyn Controller {
        self.controller.as_mut()
    }

    pub fn backend(&self) -> &dyn VirtualBackend {
        self.backend.as_ref()
    }

    /// Connectivity last recorded for `index`.
    pub fn is_input_connected(&self, index: u16) -> bool {
        self.slots
            .get(usize::from(index))
            .is_some_and(|slot| slot.connected)
    }

    /// One read, bind and publish step. `Decoded::Input` means the state
    /// reached the backend.
    pub fn poll_once(&mut self) -> Poll<()> {
        let poll = self.controller.read_input(self.timeout_us);
        let index = poll.index;
        // A lost device takes every input it multiplexes with it.
        if matches!(
            &poll.result,
            Err(PadbridgeError::Transport(TransportError::Disconnected(_)))
        ) {
            for input in 0..self.controller.input_count() {
                self.track_connection(input);
            }
        } else {
            self.track_connection(index);
        }

        match poll.result {
            Ok(Decoded::Input(data)) => Poll {
                index,
                result: self.publish(index, &data),
            },
            Ok(Decoded::NothingToDo) => Poll::nothing_to_do(index),
            Err(e) => Poll::failed(index, e),
        }
    }

    /// Compares the controller's view of `index` with the recorded one.
    /// Runs whether or not the read succeeded.
    fn track_connection(&mut self, index: u16) {
        let now_connected = self.controller.is_controller_connected(index);
        let Some(slot) = self.slots.get_mut(usize::from(index)) else {
            return;
        };
        if slot.connected == now_connected {
            return;
        }

        slot.connected = now_connected;
        slot.reattach = now_connected;
        if now_connected {
            info!(index, "input connected");
            return;
        }

        info!(index, "input disconnected");
        slot.chord_held = false;
        if let Err(e) = self.backend.detach_controller(index) {
            warn!(index, error = %e, "detach after disconnect failed");
        }
    }

    fn publish(
        &mut self,
        index: u16,
        data: &NormalizedButtonData,
    ) -> ControllerResult<Decoded<()>> {
        let count = self.controller.input_count();
        let Some(slot) = self.slots.get_mut(usize::from(index)) else {
            return Err(DecodeError::InputIndexOutOfRange { index, count }.into());
        };
        if !slot.connected {
            return Ok(Decoded::NothingToDo);
        }

        let buttons = NpadButtons::from_normalized(data);
        let [left, right] = &data.sticks;
        let stick_l = convert_stick(left);
        let stick_r = convert_stick(right);

        let chord = buttons.is_reattach_chord();
        if chord && !slot.chord_held {
            slot.reattach = true;
        }
        slot.chord_held = chord;

        // Cleared only after a successful attach.
        let forced = slot.reattach;
        let attached = self.backend.is_controller_attached(index);
        if forced || !attached {
            if attached {
                self.backend.detach_controller(index)?;
            }
            self.backend.attach_controller(index)?;
            slot.reattach = false;
            info!(index, forced, "virtual controller attached");
        }

        match self
            .backend
            .update_controller_state(buttons, stick_l, stick_r, index)
        {
            Ok(()) => Ok(Decoded::Input(())),
            Err(e) if e.is_publish_race() => {
                debug!(index, error = %e, "platform dropped the virtual controller");
                if let Err(e) = self.backend.detach_controller(index) {
                    debug!(index, error = %e, "bookkeeping detach failed");
                }
                slot.reattach = true;
                Ok(Decoded::NothingToDo)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exits the controller, then detaches every input it published.
    pub fn shutdown(mut self) {
        self.controller.exit();
        self.backend.detach_all();
    }
}

/// Runs an [`InputPoller`] on its own thread.
pub struct VirtualGamepadHandler {
    name: String,
    options: HandlerOptions,
    cancel: CancelToken,
    running: Arc<AtomicBool>,
    idle: Option<InputPoller>,
    thread: Option<JoinHandle<Option<InputPoller>>>,
}

impl VirtualGamepadHandler {
    pub fn new(
        controller: Box<dyn Controller>,
        backend: Box<dyn VirtualBackend>,
        options: HandlerOptions,
    ) -> Self {
        let name = format!("pad-{}", controller.device_info().vid_pid());
        let cancel = controller.cancel_token();
        let poller = InputPoller::new(controller, backend, options.polling_timeout_ms);
        Self {
            name,
            options,
            cancel,
            running: Arc::new(AtomicBool::new(false)),
            idle: Some(poller),
            thread: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Brings the controller up and starts the polling thread. A bring-up
    /// failure leaves the handler idle; only this controller is affected.
    pub fn initialize(&mut self) -> ControllerResult<()> {
        let Some(mut poller) = self.idle.take() else {
            return Err(PadbridgeError::other(format!("{} already started", self.name)));
        };
        if let Err(e) = poller.controller_mut().initialize() {
            error!(handler = %self.name, error = %e, "controller bring-up failed");
            self.idle = Some(poller);
            return Err(e);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let niceness = self.options.thread_niceness;
        let (tx, rx) = crossbeam::channel::bounded(1);
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || match rx.recv() {
                Ok(poller) => poll_thread_main(poller, &running, niceness),
                Err(_) => None,
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.running.store(false, Ordering::Release);
                poller.controller_mut().exit();
                self.idle = Some(poller);
                return Err(PadbridgeError::Io(e));
            }
        };
        if let Err(crossbeam::channel::SendError(poller)) = tx.send(poller) {
            self.running.store(false, Ordering::Release);
            self.idle = Some(poller);
            return Err(PadbridgeError::other("polling thread exited before start"));
        }
        self.thread = Some(thread);

        info!(handler = %self.name, timeout_ms = self.options.polling_timeout_ms, "input thread started");
        Ok(())
    }

    /// Stops the polling thread, exits the controller and detaches every
    /// input. Safe to call more than once.
    pub fn exit(&mut self) {
        self.stop_thread();
        if let Some(poller) = self.idle.take() {
            poller.shutdown();
            info!(handler = %self.name, "handler exited");
        }
    }

    fn stop_thread(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) && self.thread.is_none() {
            return;
        }
        info!(handler = %self.name, "stopping input thread");
        self.cancel.cancel();

        if let Some(thread) = self.thread.take() {
            match thread.join() {
                Ok(Some(poller)) => {
                    info!(handler = %self.name, "input thread stopped cleanly");
                    self.idle = Some(poller);
                }
                Ok(None) => warn!(handler = %self.name, "input thread never received its poller"),
                Err(_) => error!(handler = %self.name, "input thread panicked"),
            }
        }
    }
}

impl Drop for VirtualGamepadHandler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(handler = %self.name, "handler dropped while running - forcing exit");
        }
        self.exit();
    }
}

fn poll_thread_main(
    mut poller: InputPoller,
    running: &AtomicBool,
    niceness: i32,
) -> Option<InputPoller> {
    apply_thread_niceness(niceness);
    // Failure class last logged at warn level.
    let mut reported: Option<(ErrorCategory, ErrorSeverity)> = None;

    while running.load(Ordering::Acquire) {
        let started = Instant::now();
        let poll = poller.poll_once();
        let elapsed = started.elapsed();
        let timed_out = poll.is_timeout();

        if elapsed > SLOW_POLL_BUDGET && !timed_out {
            warn!(
                index = poll.index,
                elapsed_us = elapsed.as_micros(),
                "poll exceeded its time budget"
            );
        }

        match &poll.result {
            Ok(Decoded::Input(())) => {
                reported = None;
                debug!(index = poll.index, elapsed_us = elapsed.as_micros(), "published");
            }
            Ok(Decoded::NothingToDo) => {}
            Err(_) if timed_out => {}
            Err(e) if !e.is_recoverable() => {
                error!(
                    index = poll.index,
                    category = %e.category(),
                    error = %e,
                    "unrecoverable poll failure, stopping input thread"
                );
                running.store(false, Ordering::Release);
                break;
            }
            Err(e) => {
                if running.load(Ordering::Acquire) {
                    let class = (e.category(), e.severity());
                    if class.1 >= ErrorSeverity::Warning && reported != Some(class) {
                        warn!(index = poll.index, category = %class.0, error = %e, "poll failed");
                        reported = Some(class);
                    } else {
                        debug!(index = poll.index, category = %class.0, error = %e, "poll failed");
                    }
                }
                thread::sleep(FAILURE_BACKOFF);
            }
        }
    }
    Some(poller)
}
