use serde::{Deserialize, Serialize};

/// Leading-edge throttle.
///
/// The first event of a burst passes immediately; events arriving within
/// `interval_ms` of the last accepted one are dropped, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimiter {
    interval_ms: f64,
    last_invoked_ms: Option<f64>,
    /// An event was dropped since the last accepted one.
    pending: bool,
    dropped: u64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_invoked_ms: None,
            pending: false,
            dropped: 0,
        }
    }

    /// Returns whether an event at `now_ms` should be processed.
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        match self.last_invoked_ms {
            Some(last) if now_ms >= last && now_ms - last < self.interval_ms => {
                self.pending = true;
                self.dropped += 1;
                false
            }
            _ => {
                self.last_invoked_ms = Some(now_ms);
                self.pending = false;
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_invoked_ms = None;
        self.pending = false;
    }

    #[must_use]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Total events dropped over the limiter's lifetime.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Rejects duplicate or stale dispatches of the same physical gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GestureSequence {
    last: Option<u64>,
}

impl GestureSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts events without an id, and ids newer than the last accepted one.
    pub fn accept(&mut self, sequence: Option<u64>) -> bool {
        let Some(sequence) = sequence else {
            return true;
        };
        if self.last.is_some_and(|last| sequence <= last) {
            return false;
        }
        self.last = Some(sequence);
        true
    }

    #[must_use]
    pub fn last(&self) -> Option<u64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
