//! Restartable polled countdown used by soil dry-out, tree respawn, and
//! apple growth.
//!
//! All waiting in the simulation is expressed through this type: a
//! duration decremented by delta-time and resolved at the owner's poll
//! site. Expiry is reported exactly once per activation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration_ms: f32,
    remaining_ms: f32,
    active: bool,
}

impl Countdown {
    /// A new, inactive countdown. Call [`activate`](Self::activate) to arm it.
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            remaining_ms: 0.0,
            active: false,
        }
    }

    /// An armed countdown, already running from its full duration.
    pub fn started(duration_ms: f32) -> Self {
        let mut c = Self::new(duration_ms);
        c.activate();
        c
    }

    /// Start (or restart) the countdown from its full duration.
    pub fn activate(&mut self) {
        self.remaining_ms = self.duration_ms;
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.remaining_ms = 0.0;
    }

    /// Advance by `dt_ms`. Returns `true` exactly once, on the tick that
    /// exhausts the remaining time; the countdown then deactivates until
    /// re-armed. Ticking an inactive countdown does nothing.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.deactivate();
            return true;
        }
        false
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Override the remaining time, arming the countdown. Used when a
    /// saved tree is restored mid-respawn.
    pub fn set_remaining(&mut self, ms: f32) {
        self.remaining_ms = ms;
        self.active = ms > 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_once_then_deactivates() {
        let mut c = Countdown::started(100.0);
        assert!(c.active());
        assert!(!c.tick(60.0));
        assert!(c.tick(60.0), "expiry tick reports completion");
        assert!(!c.active());
        assert!(!c.tick(1000.0), "inactive countdown never fires again");
    }

    #[test]
    fn activate_restarts_from_full_duration() {
        let mut c = Countdown::started(100.0);
        c.tick(90.0);
        c.activate();
        assert!(!c.tick(90.0), "restart discards previously elapsed time");
        assert!(c.tick(20.0));
    }

    #[test]
    fn many_small_ticks_equal_one_large_tick() {
        let mut a = Countdown::started(1000.0);
        let mut b = Countdown::started(1000.0);
        let mut fired_a = false;
        for _ in 0..100 {
            fired_a |= a.tick(10.0);
        }
        let fired_b = b.tick(1000.0);
        assert_eq!(fired_a, fired_b);
        assert_eq!(a.active(), b.active());
    }

    #[test]
    fn new_countdown_is_inert() {
        let mut c = Countdown::new(50.0);
        assert!(!c.active());
        assert!(!c.tick(1000.0));
    }
}
