use std::time::{Duration, Instant};

/// Repeating tick timer driven by caller-supplied instants.
///
/// The scheduler owns no thread or clock; the frame loop polls it with
/// `Instant::now()` and calls `GameState::step` whenever it fires.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl TickScheduler {
    /// Creates a disarmed scheduler with the given interval in milliseconds.
    #[must_use]
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            next_tick: None,
        }
    }

    /// Starts the timer; the first tick fires one interval after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    /// Stops the timer without forgetting the interval.
    pub fn disarm(&mut self) {
        self.next_tick = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Adopts a new interval, re-arming from `now` only when it changed and
    /// the timer is running.
    pub fn set_interval(&mut self, interval_ms: u64, now: Instant) {
        let interval = Duration::from_millis(interval_ms);
        if interval == self.interval {
            return;
        }

        self.interval = interval;
        if self.is_armed() {
            self.arm(now);
        }
        log::debug!("tick timer re-armed at {interval_ms}ms");
    }

    /// Returns true once per elapsed interval.
    ///
    /// A stalled caller gets a single tick, not a burst of missed ones.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_tick else {
            return false;
        };

        if now < due {
            return false;
        }

        self.next_tick = Some(now + self.interval);
        true
    }

    /// Time left until the next tick, or `None` while disarmed.
    #[must_use]
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }
}
