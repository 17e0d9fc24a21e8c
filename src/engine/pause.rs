//! Inter-group pause
//!
//! A deferred flag measured on the engine's frame clock. Advancing it only
//! flips the flag; the tick that observes the flag does the queue work.

use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseWindow {
    duration: Duration,
    /// Time waited so far and the length fixed at start; `None` when idle
    running: Option<(Duration, Duration)>,
}

impl PauseWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            running: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Applies to the next pause started
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn start(&mut self) {
        self.running = Some((Duration::ZERO, self.duration));
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Add `delta` to a running pause; true once it has run its length
    pub fn advance(&mut self, delta: Duration) -> bool {
        let Some((elapsed, length)) = self.running.as_mut() else {
            return false;
        };
        *elapsed = elapsed.saturating_add(delta);
        if *elapsed >= *length {
            self.running = None;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.running = None;
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.running.map(|(elapsed, length)| length.saturating_sub(elapsed))
    }
}
