//! Wall-clock source for `createdAt`, `timestamp` and `archivedAt` values.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces epoch-millisecond timestamps.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // A clock before the epoch is reported as 0 rather than failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Deterministic clock that advances by `step_ms` on every read.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Cell<i64>,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            next: Cell::new(start_ms),
            step_ms,
        }
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> i64 {
        let current = self.next.get();
        self.next.set(current.saturating_add(self.step_ms));
        current
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
