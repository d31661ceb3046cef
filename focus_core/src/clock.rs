//! Countdown engine.
//!
//! The clock only knows seconds; which duration to reset to is decided by
//! the mode controller. Advancing time is an explicit `tick()` call so the
//! clock itself never sleeps or spawns anything.

/// Outcome of a single `tick()`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Clock was paused or already at zero; nothing changed
    Idle,
    /// One second elapsed, time remains
    Counted,
    /// This tick reached zero; the clock has stopped itself
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionClock {
    time_left: u32,
    running: bool,
}

impl SessionClock {
    pub fn new(seconds: u32) -> Self {
        Self {
            time_left: seconds,
            running: false,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin counting down. Returns false when already running or at zero.
    pub fn start(&mut self) -> bool {
        if self.running || self.time_left == 0 {
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self, seconds: u32) {
        self.time_left = seconds;
        self.running = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running || self.time_left == 0 {
            return Tick::Idle;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            self.running = false;
            Tick::Completed
        } else {
            Tick::Counted
        }
    }
}
