//! Polling helpers for tests that observe background threads.

use std::thread;
use std::time::{Duration, Instant};

/// Polls `condition` every millisecond until it holds or `timeout` elapses.
/// Returns whether the condition was met.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
