//! Mode state machine: work → break → work.
//!
//! ```text
//! Work ──complete──▶ ShortBreak   (count % interval != 0)
//! Work ──complete──▶ LongBreak    (count % interval == 0)
//! ShortBreak | LongBreak ──complete──▶ Work
//! any ──switch_mode(m)──▶ m        (always allowed)
//! ```
//!
//! After a completion the clock is refilled for the next mode and left
//! stopped; the next interval only begins on an explicit `start()`.

use crate::clock::{SessionClock, Tick};
use crate::cycle::CycleAccountant;
use crate::notifier::CompletionNotifier;
use crate::{DurationConfig, Mode};

/// Emitted once per countdown that reaches zero
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionEvent {
    /// Mode of the interval that just finished
    pub finished: Mode,
    /// Mode the controller moved to
    pub next: Mode,
    pub completed_work_intervals: u32,
}

pub struct ModeController {
    config: DurationConfig,
    mode: Mode,
    clock: SessionClock,
    cycles: CycleAccountant,
    notifier: CompletionNotifier,
}

impl ModeController {
    /// Start in work mode with a full, stopped work countdown
    pub fn new(config: DurationConfig, notifier: CompletionNotifier) -> Self {
        Self {
            config,
            mode: Mode::Work,
            clock: SessionClock::new(config.duration_for(Mode::Work)),
            cycles: CycleAccountant::new(),
            notifier,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn config(&self) -> &DurationConfig {
        &self.config
    }

    pub fn completed_work_intervals(&self) -> u32 {
        self.cycles.completed_work_intervals()
    }

    pub fn total_focused_minutes(&self) -> u32 {
        self.cycles.total_focused_minutes(&self.config)
    }

    pub fn notifier(&self) -> &CompletionNotifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut CompletionNotifier {
        &mut self.notifier
    }

    pub fn start(&mut self) -> bool {
        let started = self.clock.start();
        if started {
            tracing::debug!("Started {} with {}s left", self.mode, self.clock.time_left());
        }
        started
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn reset_current_mode(&mut self) {
        self.clock.reset(self.config.duration_for(self.mode));
    }

    pub fn switch_mode(&mut self, target: Mode) {
        self.mode = target;
        self.clock.reset(self.config.duration_for(target));
        tracing::debug!("Switched to {}", target);
    }

    /// Replace the durations and restart the current mode from its new
    /// full length (stopped).
    pub fn apply_config(&mut self, config: DurationConfig) {
        self.config = config;
        self.clock.reset(self.config.duration_for(self.mode));
    }

    /// Advance one second; returns the completion event when this tick
    /// reached zero.
    pub fn tick(&mut self) -> Option<CompletionEvent> {
        match self.clock.tick() {
            Tick::Completed => Some(self.complete()),
            Tick::Counted | Tick::Idle => None,
        }
    }

    fn complete(&mut self) -> CompletionEvent {
        let finished = self.mode;
        let next = match finished {
            Mode::Work => {
                let outcome = self.cycles.record_work_interval_completed(&self.config);
                if outcome.long_break_due {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        };

        self.mode = next;
        self.clock.reset(self.config.duration_for(next));
        self.notifier.notify_completion(finished);

        tracing::info!(
            "Completed {} interval, next is {} ({} work intervals so far)",
            finished,
            next,
            self.cycles.completed_work_intervals()
        );

        CompletionEvent {
            finished,
            next,
            completed_work_intervals: self.cycles.completed_work_intervals(),
        }
    }
}
