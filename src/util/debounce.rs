use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Trailing-edge debounce.
///
/// Each [`schedule`](Self::schedule) cancels the pending value and re-arms
/// the timer; only the last value survives a burst. The owner drives it by
/// calling [`poll`](Self::poll) from its tick loop.
#[derive(Debug)]
pub struct Debouncer<T, C: Clock = SystemClock> {
    delay: Duration,
    clock: C,
    pending: Option<Pending<T>>,
}

impl<T, C: Clock> Debouncer<T, C> {
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        Debouncer {
            delay,
            clock,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T) {
        self.pending = Some(Pending {
            value,
            deadline: self.clock.now() + self.delay,
        });
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| self.clock.now() >= p.deadline);
        if due {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Take the pending value now, regardless of the timer.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending value fires.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    fn debouncer() -> (Debouncer<&'static str, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (Debouncer::with_clock(DELAY, clock.clone()), clock)
    }

    #[test]
    fn fires_after_quiet_period() {
        let (mut d, clock) = debouncer();
        d.schedule("a");
        assert_eq!(d.poll(), None);
        clock.advance(DELAY);
        assert_eq!(d.poll(), Some("a"));
        assert_eq!(d.poll(), None);
    }

    #[test]
    fn reschedule_keeps_only_last_value() {
        let (mut d, clock) = debouncer();
        d.schedule("a");
        clock.advance(Duration::from_millis(200));
        d.schedule("ab");
        clock.advance(Duration::from_millis(200));
        // 400ms since the first keystroke, but only 200ms since the last
        assert_eq!(d.poll(), None);
        d.schedule("abc");
        clock.advance(DELAY);
        assert_eq!(d.poll(), Some("abc"));
        assert!(!d.is_pending());
    }

    #[test]
    fn flush_and_cancel() {
        let (mut d, _clock) = debouncer();
        d.schedule("x");
        assert_eq!(d.flush(), Some("x"));
        d.schedule("y");
        assert!(d.cancel());
        assert!(!d.cancel());
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn time_remaining_counts_down() {
        let (mut d, clock) = debouncer();
        assert_eq!(d.time_remaining(), None);
        d.schedule("q");
        clock.advance(Duration::from_millis(100));
        assert_eq!(d.time_remaining(), Some(Duration::from_millis(200)));
        clock.advance(Duration::from_secs(1));
        assert_eq!(d.time_remaining(), Some(Duration::ZERO));
    }
}
