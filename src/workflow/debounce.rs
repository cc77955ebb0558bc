use std::time::{Duration, Instant};

/// Trailing-edge debounce driven by explicit timestamps.
///
/// Every `touch` replaces the pending deadline; `poll` fires once the window
/// has passed without another touch.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_change: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn cancel(&mut self) {
        self.last_change = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|changed| now.saturating_duration_since(changed) >= self.window)
    }

    /// True exactly once per quiet period.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_change = None;
            true
        } else {
            false
        }
    }
}
