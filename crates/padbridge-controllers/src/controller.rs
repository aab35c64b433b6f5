//! The controller capability trait.

use padbridge_binding::bind;
use padbridge_controller_types::{
    ControllerConfig, ControllerFeature, NormalizedButtonData, RawInputData,
};
use padbridge_errors::PadbridgeError;
use padbridge_usb::{CancelToken, UsbDeviceInfo};

pub type ControllerResult<T> = Result<T, PadbridgeError>;

/// Successful read outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded<T> {
    Input(T),
    /// The report says this logical input is not present; outputs are
    /// left untouched.
    NothingToDo,
}

/// Result of one poll. `index` is the logical input the read concerned and
/// is meaningful even when `result` is an error.
#[derive(Debug)]
pub struct Poll<T> {
    pub index: u16,
    pub result: ControllerResult<Decoded<T>>,
}

impl<T> Poll<T> {
    pub fn input(index: u16, value: T) -> Self {
        Self {
            index,
            result: Ok(Decoded::Input(value)),
        }
    }

    pub fn nothing_to_do(index: u16) -> Self {
        Self {
            index,
            result: Ok(Decoded::NothingToDo),
        }
    }

    pub fn failed(index: u16, error: impl Into<PadbridgeError>) -> Self {
        Self {
            index,
            result: Err(error.into()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Poll<U> {
        Poll {
            index: self.index,
            result: self.result.map(|decoded| match decoded {
                Decoded::Input(value) => Decoded::Input(f(value)),
                Decoded::NothingToDo => Decoded::NothingToDo,
            }),
        }
    }

    /// True when the read failed only because nothing arrived in time.
    pub fn is_timeout(&self) -> bool {
        matches!(&self.result, Err(PadbridgeError::Transport(e)) if e.is_timeout())
    }
}

/// One physical controller.
///
/// Implementations keep their own copy of the configuration and their own
/// device handle; nothing is shared between controllers.
pub trait Controller: Send {
    /// Opens the device and its endpoints and sends any bring-up packets.
    /// Failure here aborts this controller only.
    fn initialize(&mut self) -> ControllerResult<()>;

    fn exit(&mut self);

    /// Logical inputs multiplexed on this device.
    fn input_count(&self) -> u16 {
        1
    }

    fn interface_count(&self) -> usize {
        self.device_info().interfaces.len().max(1)
    }

    /// Reads and decodes one report. Blocks for at most `timeout_us`.
    fn read_raw(&mut self, timeout_us: u32) -> Poll<RawInputData>;

    /// [`Controller::read_raw`] followed by the binding engine.
    fn read_input(&mut self, timeout_us: u32) -> Poll<NormalizedButtonData> {
        let poll = self.read_raw(timeout_us);
        let config = self.config();
        poll.map(|raw| bind(&raw, config))
    }

    fn support(&self, feature: ControllerFeature) -> bool;

    /// Amplitudes are in `[0, 1]`.
    fn set_rumble(&mut self, index: u16, amp_high: f32, amp_low: f32) -> ControllerResult<()>;

    fn is_controller_connected(&self, _index: u16) -> bool {
        true
    }

    fn config(&self) -> &ControllerConfig;

    fn device_info(&self) -> &UsbDeviceInfo;

    /// Cancels a blocked [`Controller::read_raw`].
    fn cancel_token(&self) -> CancelToken;
}

/// Rumble amplitude in `[0, 1]` to a motor byte.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [0, 255] before the cast"
)]
pub fn amplitude_to_u8(amplitude: f32) -> u8 {
    if amplitude.is_nan() {
        return 0;
    }
    (amplitude.clamp(0.0, 1.0) * 255.0).round() as u8
}
