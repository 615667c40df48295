// Clock - Single-shot timers that drive the playback scheduler
//
// Only one timer is ever pending. Every schedule() call returns a handle tagged
// with a fresh generation, so a firing that no longer matches the scheduler's
// pending handle is recognised as stale and dropped.

use std::thread;
use std::time::{Duration, Instant};

/// Handle of a scheduled firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    generation: u64,
}

impl TimerHandle {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Timer driving the scheduler
pub trait Timer {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Arm the timer to fire after `delay`, replacing any pending firing
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Disarm the pending firing if it matches `handle`
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    due: Duration,
}

/// Virtual-time timer for tests and offline rendering
///
/// Time only moves when the owner calls [`ManualClock::fire_next`] or
/// [`ManualClock::advance_to`].
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
    next_generation: u64,
    pending: Option<Pending>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline of the pending firing
    pub fn pending_deadline(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }

    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending.map(|p| p.handle)
    }

    /// Jump to the pending deadline and fire it
    pub fn fire_next(&mut self) -> Option<TimerHandle> {
        let pending = self.pending.take()?;
        self.now = self.now.max(pending.due);
        Some(pending.handle)
    }

    /// Move time forward to `time`, firing the pending timer if it falls due on the way.
    /// Time stops at the deadline when a timer fires.
    pub fn advance_to(&mut self, time: Duration) -> Option<TimerHandle> {
        match self.pending {
            Some(pending) if pending.due <= time => self.fire_next(),
            _ => {
                self.now = self.now.max(time);
                None
            }
        }
    }
}

impl Timer for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_generation += 1;
        let handle = TimerHandle {
            generation: self.next_generation,
        };
        self.pending = Some(Pending {
            handle,
            due: self.now + delay,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.pending.is_some_and(|p| p.handle == handle) {
            self.pending = None;
        }
    }
}

/// Wall-clock timer
///
/// A timer scheduled while handling a firing is chained from that firing's
/// deadline instead of from the (possibly late) wake-up time, so sleep jitter
/// never accumulates into tempo drift.
#[derive(Debug)]
pub struct RealtimeClock {
    origin: Instant,
    next_generation: u64,
    pending: Option<Pending>,
    // Deadline of the firing being handled
    anchor: Option<Duration>,
    max_lateness: Duration,
}

impl RealtimeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            next_generation: 0,
            pending: None,
            anchor: None,
            max_lateness: Duration::ZERO,
        }
    }

    /// Wait for the pending firing, sleeping at most `max_wait`
    ///
    /// Returns the handle once its deadline has passed, `None` if the wait
    /// ended first (or nothing is pending) so the caller can service other work.
    pub fn wait_next(&mut self, max_wait: Duration) -> Option<TimerHandle> {
        let Some(pending) = self.pending else {
            thread::sleep(max_wait);
            return None;
        };

        let now = self.now();
        if now < pending.due {
            thread::sleep((pending.due - now).min(max_wait));
        }

        let now = self.now();
        if now < pending.due {
            return None;
        }

        let lateness = now - pending.due;
        if lateness > self.max_lateness {
            self.max_lateness = lateness;
            log::trace!("Timer woke {:.3} ms late", lateness.as_secs_f64() * 1000.0);
        }

        self.pending = None;
        self.anchor = Some(pending.due);
        Some(pending.handle)
    }

    /// Worst wake-up lateness observed so far
    pub fn max_lateness(&self) -> Duration {
        self.max_lateness
    }
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for RealtimeClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let base = self.anchor.take().unwrap_or_else(|| self.now());
        self.next_generation += 1;
        let handle = TimerHandle {
            generation: self.next_generation,
        };
        self.pending = Some(Pending {
            handle,
            due: base + delay,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.anchor = None;
        if self.pending.is_some_and(|p| p.handle == handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_schedule_and_fire() {
        let mut clock = ManualClock::new();
        let handle = clock.schedule(Duration::from_millis(250));

        assert_eq!(clock.pending_deadline(), Some(Duration::from_millis(250)));
        assert_eq!(clock.fire_next(), Some(handle));
        assert_eq!(clock.now(), Duration::from_millis(250));
        assert_eq!(clock.fire_next(), None);
    }

    #[test]
    fn test_manual_generations_are_unique() {
        let mut clock = ManualClock::new();
        let first = clock.schedule(Duration::from_millis(10));
        let second = clock.schedule(Duration::from_millis(10));
        assert_ne!(first, second);
        assert!(second.generation() > first.generation());

        // Only the latest schedule is pending
        assert_eq!(clock.pending_handle(), Some(second));
    }

    #[test]
    fn test_manual_cancel() {
        let mut clock = ManualClock::new();
        let stale = clock.schedule(Duration::from_millis(10));
        let live = clock.schedule(Duration::from_millis(10));

        clock.cancel(stale);
        assert_eq!(clock.pending_handle(), Some(live));

        clock.cancel(live);
        assert_eq!(clock.pending_handle(), None);
        // Idempotent
        clock.cancel(live);
        assert_eq!(clock.pending_handle(), None);
    }

    #[test]
    fn test_manual_advance_to() {
        let mut clock = ManualClock::new();
        let handle = clock.schedule(Duration::from_millis(500));

        assert_eq!(clock.advance_to(Duration::from_millis(200)), None);
        assert_eq!(clock.now(), Duration::from_millis(200));

        assert_eq!(clock.advance_to(Duration::from_millis(900)), Some(handle));
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[test]
    fn test_realtime_fires_after_deadline() {
        let mut clock = RealtimeClock::new();
        let handle = clock.schedule(Duration::from_millis(5));

        let mut fired = None;
        for _ in 0..100 {
            if let Some(h) = clock.wait_next(Duration::from_millis(2)) {
                fired = Some(h);
                break;
            }
        }

        assert_eq!(fired, Some(handle));
        assert!(clock.now() >= Duration::from_millis(5));
    }

    #[test]
    fn test_realtime_chains_from_deadline() {
        let mut clock = RealtimeClock::new();
        clock.schedule(Duration::from_millis(1));
        let first_due = clock.pending.map(|p| p.due).unwrap();

        // Wake up late on purpose
        thread::sleep(Duration::from_millis(20));
        assert!(clock.wait_next(Duration::ZERO).is_some());
        assert!(clock.max_lateness() >= Duration::from_millis(15));

        // Next deadline is anchored on the first deadline, not on "now"
        clock.schedule(Duration::from_millis(1));
        let second_due = clock.pending.map(|p| p.due).unwrap();
        assert_eq!(second_due, first_due + Duration::from_millis(1));
    }

    #[test]
    fn test_realtime_cancel_clears_anchor() {
        let mut clock = RealtimeClock::new();
        let handle = clock.schedule(Duration::ZERO);
        assert_eq!(clock.wait_next(Duration::ZERO), Some(handle));

        clock.cancel(handle);
        thread::sleep(Duration::from_millis(5));
        clock.schedule(Duration::from_millis(1));

        let due = clock.pending.map(|p| p.due).unwrap();
        assert!(due >= Duration::from_millis(5));
    }
}
