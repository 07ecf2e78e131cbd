//! Trailing-edge debounce driven by an external clock.
//!
//! The owner feeds values with [`Debouncer::update`] and asks for settled
//! values with [`Debouncer::poll`]. Every update replaces the scheduled
//! emission, so only the last value of a burst is ever emitted. Dropping the
//! debouncer (or calling [`Debouncer::cancel`]) discards the pending emission.

use std::time::{Duration, Instant};

/// A scheduled emission. Superseded handles are dropped, never fired.
#[derive(Debug)]
struct ScheduledEmit<T> {
    due: Instant,
    value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    settled: T,
    pending: Option<ScheduledEmit<T>>,
}

impl<T: Clone> Debouncer<T> {
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self {
            quiet,
            settled: initial,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// The last emitted value.
    pub fn value(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Time left before the pending emission is due, zero when overdue.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|due| due.saturating_duration_since(now))
    }

    /// Replaces any pending emission with `value`, due one quiet period
    /// after `now`.
    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some(ScheduledEmit {
            due: now + self.quiet,
            value,
        });
    }

    /// Emits the pending value once it has been quiet for the full period.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if now < self.deadline()? {
            return None;
        }
        self.take_pending()
    }

    /// Emits the pending value immediately, regardless of its due time.
    pub fn flush(&mut self) -> Option<T> {
        self.take_pending()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Replaces the settled value and drops any pending emission, without
    /// emitting. Used when the watched source changes underneath the owner.
    pub fn reset(&mut self, value: T) {
        self.cancel();
        self.settled = value;
    }

    fn take_pending(&mut self) -> Option<T> {
        let pending = self.pending.take()?;
        self.settled = pending.value.clone();
        Some(pending.value)
    }
}
