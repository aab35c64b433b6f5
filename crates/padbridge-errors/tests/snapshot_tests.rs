//! Snapshot tests for error message formatting.
//!
//! These messages end up in user-facing logs and must stay stable.

use insta::assert_snapshot;
use padbridge_errors::{BackendError, ConfigError, DecodeError, PadbridgeError, TransportError};

#[test]
fn test_timeout_message() {
    assert_snapshot!(TransportError::timeout(2500).to_string(), @"Transport read timed out after 2500us");
}

#[test]
fn test_control_transfer_message() {
    let err = TransportError::ControlTransfer {
        request: 0x09,
        value: 0x03F4,
        message: "stall".into(),
    };
    assert_snapshot!(err.to_string(), @"Control transfer failed (request 0x09, value 0x03f4): stall");
}

#[test]
fn test_unexpected_marker_message() {
    assert_snapshot!(DecodeError::unexpected_marker(0x21, 0x01).to_string(), @"Unexpected report marker: expected 0x21, got 0x01");
}

#[test]
fn test_stale_handle_message() {
    assert_snapshot!(BackendError::StaleHandle { index: 2 }.to_string(), @"Stale virtual device handle for input 2");
}

#[test]
fn test_no_buttons_message() {
    let err = ConfigError::NoButtonsBound { vid: 0x0079, pid: 0x0006 };
    assert_snapshot!(err.to_string(), @"No buttons configured for controller 0079-0006");
}

#[test]
fn test_wrapped_message() {
    let err: PadbridgeError = TransportError::Cancelled.into();
    assert_snapshot!(err.to_string(), @"Transport error: Transport operation cancelled");
}
