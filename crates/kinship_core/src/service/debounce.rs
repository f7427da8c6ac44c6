//! Trailing-edge debouncing for bursty external signals.

use std::time::{Duration, Instant};

/// Coalesces a burst of signals into one value delivered after a quiet
/// period. Only the most recent value of a burst survives.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    last_signal: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_signal: None,
            pending: None,
        }
    }

    pub fn set_quiet_period(&mut self, quiet: Duration) {
        self.quiet = quiet;
    }

    /// Records `value` and restarts the quiet period at `now`.
    pub fn signal_at(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.last_signal = Some(now);
    }

    /// Returns the pending value once the quiet period has elapsed.
    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        let last = self.last_signal?;
        if now.saturating_duration_since(last) < self.quiet {
            return None;
        }
        self.last_signal = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes deliverable.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_signal.map(|last| last + self.quiet)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_signal = None;
    }
}
