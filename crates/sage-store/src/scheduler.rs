//! Single-slot deferred save queue.
//!
//! The scheduler holds at most one pending payload. A debounced save replaces
//! the pending payload and pushes its deadline out to `now + window`; an
//! immediate save cancels whatever is pending. The scheduler never writes
//! anything itself: callers poll [`AutosaveScheduler::take_due`] or await
//! [`AutosaveScheduler::next_deadline`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Tokio's clock; pausable and advanceable in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Pending<P> {
    payload: P,
    deadline: Instant,
}

#[derive(Debug)]
pub struct AutosaveScheduler<P, C = TokioClock> {
    clock: C,
    window: Duration,
    pending: Option<Pending<P>>,
}

impl<P, C: Clock> AutosaveScheduler<P, C> {
    pub const fn new(clock: C, window: Duration) -> Self {
        Self {
            clock,
            window,
            pending: None,
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending payload and re-arm the deadline.
    pub fn schedule_debounced(&mut self, payload: P) {
        let deadline = self.clock.now() + self.window;
        if self.pending.is_some() {
            tracing::trace!("debounced save superseded");
        }
        self.pending = Some(Pending { payload, deadline });
    }

    /// Cancel any pending payload and hand `payload` back for an immediate
    /// write.
    pub fn flush_immediate(&mut self, payload: P) -> P {
        if self.pending.take().is_some() {
            tracing::trace!("pending debounced save cancelled by immediate save");
        }
        payload
    }

    /// The pending payload, once its deadline has passed.
    pub fn take_due(&mut self) -> Option<P> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| p.deadline <= self.clock.now());
        if due {
            self.pending.take().map(|p| p.payload)
        } else {
            None
        }
    }

    /// The pending payload regardless of its deadline.
    pub fn take_pending(&mut self) -> Option<P> {
        self.pending.take().map(|p| p.payload)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WINDOW: Duration = Duration::from_millis(2000);

    #[test]
    fn debounced_payload_waits_for_quiet_window() {
        let clock = ManualClock::new();
        let mut s = AutosaveScheduler::new(clock.clone(), WINDOW);

        s.schedule_debounced(1);
        clock.advance(Duration::from_millis(1999));
        assert_eq!(s.take_due(), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(s.take_due(), Some(1));
        assert!(!s.has_pending());
    }

    #[test]
    fn rescheduling_rearms_and_keeps_last_payload() {
        let clock = ManualClock::new();
        let mut s = AutosaveScheduler::new(clock.clone(), WINDOW);

        for n in 1..=5 {
            s.schedule_debounced(n);
            clock.advance(Duration::from_millis(400));
        }
        assert_eq!(s.take_due(), None);
        clock.advance(Duration::from_millis(1600));
        assert_eq!(s.take_due(), Some(5));
        assert_eq!(s.take_due(), None);
    }

    #[test]
    fn immediate_cancels_pending() {
        let clock = ManualClock::new();
        let mut s = AutosaveScheduler::new(clock.clone(), WINDOW);

        s.schedule_debounced("draft");
        assert_eq!(s.flush_immediate("milestone"), "milestone");
        assert_eq!(s.next_deadline(), None);
        clock.advance(WINDOW);
        assert_eq!(s.take_due(), None);
    }

    #[test]
    fn next_deadline_tracks_last_schedule() {
        let clock = ManualClock::new();
        let start = clock.now();
        let mut s = AutosaveScheduler::new(clock.clone(), WINDOW);
        s.schedule_debounced(());
        clock.advance(Duration::from_millis(500));
        s.schedule_debounced(());
        assert_eq!(
            s.next_deadline(),
            Some(start + Duration::from_millis(500) + WINDOW)
        );
    }
}
