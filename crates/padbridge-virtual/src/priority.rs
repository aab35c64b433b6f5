//! Polling-thread priority.

use tracing::{debug, warn};

/// Lowest and highest niceness accepted by the scheduler.
pub const NICENESS_RANGE: std::ops::RangeInclusive<i32> = -20..=19;

/// Applies `niceness` to the calling thread. Failure (usually a missing
/// `CAP_SYS_NICE` for negative values) is logged and ignored.
pub fn apply_thread_niceness(niceness: i32) {
    if niceness == 0 {
        return;
    }
    let niceness = niceness.clamp(*NICENESS_RANGE.start(), *NICENESS_RANGE.end());
    match set_niceness(niceness) {
        Ok(()) => debug!(niceness, "polling thread priority applied"),
        Err(e) => warn!(niceness, error = %e, "could not set polling thread priority"),
    }
}

#[cfg(target_os = "linux")]
#[expect(unsafe_code, reason = "setpriority has no std wrapper")]
fn set_niceness(niceness: i32) -> std::io::Result<()> {
    // SAFETY: setpriority only takes integers. `who == 0` with PRIO_PROCESS
    // targets the calling thread on Linux.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, niceness) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_niceness(_niceness: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "thread niceness is only supported on Linux",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_noop() {
        apply_thread_niceness(0);
    }

    #[test]
    fn test_refused_priority_only_logs() {
        // Raising niceness needs no privileges; lowering may be refused.
        let joined = std::thread::spawn(|| {
            apply_thread_niceness(5);
            apply_thread_niceness(-20);
        })
        .join();
        assert!(joined.is_ok());
    }
}
