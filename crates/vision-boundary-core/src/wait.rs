//! Outcome and timeout units of bounded waits.

use std::time::Duration;

use crate::payload::Sentinel;

/// Outcome of a bounded wait.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    TimedOut = 0,
    Signaled = 1,
    /// The SDK's own cancel request woke the waiter.
    Canceled = 2,
}

impl WaitOutcome {
    pub fn is_signaled(self) -> bool {
        self == WaitOutcome::Signaled
    }
}

impl Sentinel for WaitOutcome {
    fn sentinel() -> Self {
        WaitOutcome::TimedOut
    }
}

/// Boundary timeouts are whole milliseconds.
pub fn timeout_from_millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_wait_reads_as_timed_out() {
        assert_eq!(WaitOutcome::sentinel(), WaitOutcome::TimedOut);
        assert_eq!(WaitOutcome::sentinel() as i32, 0);
        assert!(!WaitOutcome::sentinel().is_signaled());
    }

    #[test]
    fn timeouts_are_milliseconds() {
        assert_eq!(timeout_from_millis(250), Duration::from_millis(250));
        assert_eq!(timeout_from_millis(0), Duration::ZERO);
    }
}
