//! Clock abstraction and the single one-shot autoflip timer slot.
//!
//! The timer never runs on its own thread. It records a deadline against a
//! [`Clock`] and the owner pumps [`AutoflipTimer::take_due`] from its event
//! loop, so a canceled timer is gone the moment `cancel` returns.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Simulated time that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// What a timer does when it fires: front-facing cards flip, back-facing cards advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    Flip,
    Advance,
}

#[derive(Clone, Copy, Debug)]
struct Armed {
    action: TimerAction,
    armed_at: Duration,
    delay: Duration,
}

impl Armed {
    fn deadline(&self) -> Duration {
        self.armed_at.saturating_add(self.delay)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Paused {
    action: TimerAction,
    remaining: Duration,
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Idle,
    Armed(Armed),
    Paused(Paused),
}

/// At most one pending action at a time; arming replaces whatever was there.
#[derive(Debug)]
pub struct AutoflipTimer {
    slot: Slot,
}

impl Default for AutoflipTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoflipTimer {
    pub fn new() -> Self {
        Self { slot: Slot::Idle }
    }

    pub fn arm(&mut self, action: TimerAction, delay: Duration, now: Duration) {
        self.slot = Slot::Armed(Armed {
            action,
            armed_at: now,
            delay,
        });
    }

    /// Holds `action` without a deadline, as if paused with `remaining` left.
    pub fn hold(&mut self, action: TimerAction, remaining: Duration) {
        self.slot = Slot::Paused(Paused { action, remaining });
    }

    pub fn cancel(&mut self) {
        self.slot = Slot::Idle;
    }

    /// Stops the countdown and returns the time left. `None` if nothing was armed.
    pub fn pause(&mut self, now: Duration) -> Option<Duration> {
        match self.slot {
            Slot::Armed(armed) => {
                let elapsed = now.saturating_sub(armed.armed_at);
                let remaining = armed.delay.saturating_sub(elapsed);
                self.slot = Slot::Paused(Paused {
                    action: armed.action,
                    remaining,
                });
                Some(remaining)
            }
            Slot::Idle | Slot::Paused(_) => None,
        }
    }

    /// Re-arms a paused action for exactly the time it had left.
    /// Returns `false` if nothing was paused.
    pub fn resume(&mut self, now: Duration) -> bool {
        match self.slot {
            Slot::Paused(paused) => {
                self.arm(paused.action, paused.remaining, now);
                true
            }
            Slot::Idle | Slot::Armed(_) => false,
        }
    }

    /// Removes and returns the action if its deadline has passed.
    pub fn take_due(&mut self, now: Duration) -> Option<TimerAction> {
        match self.slot {
            Slot::Armed(armed) if now >= armed.deadline() => {
                self.slot = Slot::Idle;
                Some(armed.action)
            }
            _ => None,
        }
    }

    /// Time until the armed action fires, zero if overdue.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        match self.slot {
            Slot::Armed(armed) => Some(armed.deadline().saturating_sub(now)),
            Slot::Paused(paused) => Some(paused.remaining),
            Slot::Idle => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.slot, Slot::Armed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_fires_only_after_deadline() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Flip, secs(5), secs(10));

        assert_eq!(timer.take_due(secs(14)), None);
        assert_eq!(timer.take_due(secs(15)), Some(TimerAction::Flip));
        // one-shot
        assert_eq!(timer.take_due(secs(20)), None);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Advance, secs(1), secs(0));
        timer.cancel();
        assert_eq!(timer.take_due(secs(100)), None);
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_replaces_pending_action() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Flip, secs(1), secs(0));
        timer.arm(TimerAction::Advance, secs(3), secs(0));

        assert_eq!(timer.take_due(secs(1)), None);
        assert_eq!(timer.take_due(secs(3)), Some(TimerAction::Advance));
    }

    #[test]
    fn test_pause_captures_remaining_and_resume_uses_it() {
        let clock = ManualClock::new();
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Flip, secs(5), clock.now());

        clock.advance(secs(2));
        assert_eq!(timer.pause(clock.now()), Some(secs(3)));
        assert!(!timer.is_armed());

        // time passing while paused does not count
        clock.advance(secs(60));
        assert_eq!(timer.take_due(clock.now()), None);

        assert!(timer.resume(clock.now()));
        clock.advance(Duration::from_millis(2999));
        assert_eq!(timer.take_due(clock.now()), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(timer.take_due(clock.now()), Some(TimerAction::Flip));
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Flip, secs(5), secs(0));

        assert!(timer.pause(secs(1)).is_some());
        assert!(timer.pause(secs(2)).is_none());
        assert_eq!(timer.remaining(secs(2)), Some(secs(4)));

        assert!(timer.resume(secs(2)));
        assert!(!timer.resume(secs(3)));
        assert_eq!(timer.remaining(secs(3)), Some(secs(3)));
    }

    #[test]
    fn test_held_action_fires_after_resume() {
        let mut timer = AutoflipTimer::new();
        timer.hold(TimerAction::Advance, secs(5));
        assert_eq!(timer.take_due(secs(100)), None);

        assert!(timer.resume(secs(100)));
        assert_eq!(timer.take_due(secs(105)), Some(TimerAction::Advance));
    }

    #[test]
    fn test_overdue_pause_leaves_zero() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Advance, secs(1), secs(0));
        assert_eq!(timer.pause(secs(4)), Some(Duration::ZERO));
    }

    #[test]
    fn test_huge_delay_does_not_overflow() {
        let mut timer = AutoflipTimer::new();
        timer.arm(TimerAction::Flip, Duration::MAX, secs(10));
        assert_eq!(timer.take_due(secs(1_000_000)), None);
        assert!(timer.remaining(secs(10)).is_some());
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(secs(3));
        assert_eq!(other.now(), secs(3));
    }
}
