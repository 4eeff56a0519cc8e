use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait AbortController {
    fn should_abort(&self) -> bool;
}

pub struct NoAbortController;

impl AbortController for NoAbortController {
    fn should_abort(&self) -> bool {
        false
    }
}

/// Polled wall-clock budget. A search may overrun it by one node expansion.
pub struct TimeoutAbortController {
    timeout_at: Instant,
}

impl AbortController for TimeoutAbortController {
    fn should_abort(&self) -> bool {
        Instant::now() >= self.timeout_at
    }
}

impl TimeoutAbortController {
    pub fn duration(duration: Duration) -> Self {
        TimeoutAbortController::deadline(Instant::now() + duration)
    }

    pub fn deadline(timeout_at: Instant) -> Self {
        TimeoutAbortController { timeout_at }
    }
}

/// Aborts after a fixed number of polls, so budget exhaustion is reproducible.
pub struct CountdownAbortController {
    remaining: Cell<u64>,
}

impl CountdownAbortController {
    pub fn new(polls: u64) -> Self {
        CountdownAbortController {
            remaining: Cell::new(polls),
        }
    }
}

impl AbortController for CountdownAbortController {
    fn should_abort(&self) -> bool {
        match self.remaining.get() {
            0 => true,
            remaining => {
                self.remaining.set(remaining - 1);
                false
            }
        }
    }
}
