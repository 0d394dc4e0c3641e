//! Timer module - periodic cooldown counter on game time
//!
//! A [`Timer`] is polled rather than driven: callers pass the current game
//! time (seconds) into every method and `on_update` reports whether a period
//! has elapsed since the last tick. At most one tick is reported per poll;
//! elapsed time beyond one period is dropped, not carried over.
//!
//! Pausing freezes progress: the elapsed part of the current period is
//! subtracted from the remaining duration at pause time and the reference
//! time is re-anchored at resume.

/// Periodic timer polled with explicit game time.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    frequency: f64,
    running: bool,
    paused: bool,
    reference_time: f64,
    remaining: f64,
    last_tick_time: Option<f64>,
}

impl Timer {
    /// Create a timer with the given period, anchored at `now`.
    ///
    /// With `start == false` the timer stays idle until [`Timer::start`].
    pub fn new(frequency: f64, start: bool, now: f64) -> Self {
        Self {
            frequency,
            running: start,
            paused: false,
            reference_time: now,
            remaining: frequency,
            last_tick_time: None,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Reassign the period, keeping progress through the current one.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.remaining -= self.frequency - frequency;
        self.frequency = frequency;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_tick_time(&self) -> Option<f64> {
        self.last_tick_time
    }

    /// Arm for a full period starting at `now`.
    pub fn start(&mut self, now: f64) {
        self.reset(now, false);
    }

    pub fn pause(&mut self, now: f64) {
        if self.paused {
            return;
        }
        self.paused = true;
        if self.running {
            self.remaining -= now - self.reference_time;
        }
    }

    pub fn resume(&mut self, now: f64) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.running {
            self.reference_time = now;
        }
    }

    /// Returns 1 and rearms when a period has elapsed, 0 otherwise.
    pub fn on_update(&mut self, now: f64) -> u32 {
        if !self.running || self.paused {
            return 0;
        }
        if now - self.reference_time < self.remaining {
            return 0;
        }
        self.last_tick_time = Some(now);
        self.reset(now, false);
        1
    }

    /// Re-anchor at `now` with a full period; `stop` halts the timer.
    pub fn reset(&mut self, now: f64, stop: bool) {
        self.reference_time = now;
        self.remaining = self.frequency;
        self.running = !stop;
    }
}
