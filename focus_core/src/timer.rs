//! The command surface the UI talks to.
//!
//! `FocusTimer` owns every piece of process-wide state: the durations, the
//! mode controller with its clock and cycle count, and the task list. All
//! mutation goes through the methods below, and every mutation of a
//! persisted record is written back before the method returns.

use crate::controller::{CompletionEvent, ModeController};
use crate::notifier::{CompletionNotifier, NotificationToggle, Permission};
use crate::tasks::TaskAccountant;
use crate::wal::{CompletionSink, JsonlSink};
use crate::{CompletionRecord, DurationConfig, Mode, Result, Store, Task};
use chrono::Utc;
use serde::Serialize;

/// Read-only view of the timer for rendering
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub time_left: u32,
    pub is_running: bool,
    pub completed_work_intervals: u32,
    pub total_focused_minutes: u32,
}

pub struct FocusTimer {
    controller: ModeController,
    tasks: TaskAccountant,
    store: Store,
    log: Box<dyn CompletionSink>,
}

impl FocusTimer {
    /// Load the persisted records and build a stopped work countdown
    pub fn open(store: Store, notifier: CompletionNotifier) -> Result<Self> {
        let config = store.load_settings()?;
        let tasks = store.load_tasks()?;
        tracing::info!(
            "Opened timer in {:?}: work {}m, {} tasks",
            store.data_dir(),
            config.work_minutes(),
            tasks.len()
        );

        Ok(Self {
            controller: ModeController::new(config, notifier),
            tasks: TaskAccountant::new(tasks),
            log: Box::new(JsonlSink::new(store.completions_path())),
            store,
        })
    }

    /// Replace where completion records go
    pub fn with_completion_sink(mut self, sink: Box<dyn CompletionSink>) -> Self {
        self.log = sink;
        self
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn time_left(&self) -> u32 {
        self.controller.time_left()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn completed_work_intervals(&self) -> u32 {
        self.controller.completed_work_intervals()
    }

    pub fn total_focused_minutes(&self) -> u32 {
        self.controller.total_focused_minutes()
    }

    pub fn config(&self) -> &DurationConfig {
        self.controller.config()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn notifications_enabled(&self) -> bool {
        self.controller.notifier().notifications_enabled()
    }

    pub fn permission(&self) -> Permission {
        self.controller.notifier().permission()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode(),
            time_left: self.time_left(),
            is_running: self.is_running(),
            completed_work_intervals: self.completed_work_intervals(),
            total_focused_minutes: self.total_focused_minutes(),
        }
    }

    // ── Clock commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> bool {
        self.controller.start()
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn reset_current_mode(&mut self) {
        self.controller.reset_current_mode();
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.controller.switch_mode(mode);
    }

    /// Advance one second. On completion the finished interval is also
    /// appended to the completion log (best-effort).
    pub fn tick(&mut self) -> Option<CompletionEvent> {
        let event = self.controller.tick()?;

        let minutes = self.controller.config().minutes_for(event.finished);
        let record = CompletionRecord::new(event.finished, minutes, Utc::now());
        if let Err(e) = self.log.append(&record) {
            tracing::warn!("Failed to log completion: {}", e);
        }

        Some(event)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Replace the durations, reset the current mode to its new length
    /// (stopped) and persist them.
    pub fn save_config(&mut self, config: DurationConfig) -> Result<()> {
        self.controller.apply_config(config);
        self.store.save_settings(&config)?;
        tracing::info!("Saved durations: {:?}", config);
        Ok(())
    }

    // ── Notifications ────────────────────────────────────────────────

    /// One-time permission negotiation, normally done at startup
    pub fn negotiate_notifications(&mut self, want_enabled: bool) -> Permission {
        self.controller.notifier_mut().negotiate(want_enabled)
    }

    pub fn toggle_notifications(&mut self) -> NotificationToggle {
        self.controller.notifier_mut().toggle()
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a task; blank text is ignored and yields `None`
    pub fn add_task(&mut self, text: &str) -> Result<Option<u64>> {
        let Some(id) = self.tasks.add(text).map(|t| t.id) else {
            return Ok(None);
        };
        self.store.save_tasks(self.tasks.tasks())?;
        Ok(Some(id))
    }

    /// Flip a task's completed flag; false when the id is unknown
    pub fn toggle_task(&mut self, id: u64) -> Result<bool> {
        if !self.tasks.toggle(id) {
            return Ok(false);
        }
        self.store.save_tasks(self.tasks.tasks())?;
        Ok(true)
    }

    /// Remove a task; false when the id is unknown
    pub fn delete_task(&mut self, id: u64) -> Result<bool> {
        if !self.tasks.remove(id) {
            return Ok(false);
        }
        self.store.save_tasks(self.tasks.tasks())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::doubles::{CountingCue, RecordingSink};
    use crate::wal::read_completions;

    fn open(dir: &std::path::Path) -> FocusTimer {
        let notifier = CompletionNotifier::new(
            Box::new(CountingCue::default()),
            Box::new(RecordingSink::granting()),
        );
        FocusTimer::open(Store::new(dir), notifier).unwrap()
    }

    fn finish_interval(timer: &mut FocusTimer) -> CompletionEvent {
        assert!(timer.start());
        loop {
            if let Some(event) = timer.tick() {
                return event;
            }
        }
    }

    #[test]
    fn test_fresh_timer_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let timer = open(temp_dir.path());

        assert_eq!(
            timer.snapshot(),
            TimerSnapshot {
                mode: Mode::Work,
                time_left: 1500,
                is_running: false,
                completed_work_intervals: 0,
                total_focused_minutes: 0,
            }
        );
        assert!(timer.tasks().is_empty());
    }

    #[test]
    fn test_saved_config_survives_restart() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = DurationConfig::new(45, 10, 20, 3).unwrap();

        {
            let mut timer = open(temp_dir.path());
            timer.save_config(config).unwrap();
            assert_eq!(timer.time_left(), 45 * 60);
        }

        let timer = open(temp_dir.path());
        assert_eq!(*timer.config(), config);
        assert_eq!(timer.time_left(), 45 * 60);
    }

    #[test]
    fn test_save_config_while_running_pauses_and_resets() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut timer = open(temp_dir.path());
        timer.switch_mode(Mode::ShortBreak);
        timer.start();
        timer.tick();

        timer
            .save_config(DurationConfig::new(25, 8, 15, 4).unwrap())
            .unwrap();

        assert!(!timer.is_running());
        assert_eq!(timer.mode(), Mode::ShortBreak);
        assert_eq!(timer.time_left(), 8 * 60);
    }

    #[test]
    fn test_task_commands_persist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (keep, gone) = {
            let mut timer = open(temp_dir.path());
            let keep = timer.add_task("Buy milk").unwrap().unwrap();
            let gone = timer.add_task("Call back").unwrap().unwrap();
            assert!(timer.toggle_task(keep).unwrap());
            assert!(timer.delete_task(gone).unwrap());
            (keep, gone)
        };

        let timer = open(temp_dir.path());
        assert_eq!(timer.tasks().len(), 1);
        assert_eq!(timer.tasks()[0].id, keep);
        assert!(timer.tasks()[0].completed);
        assert_ne!(keep, gone);
    }

    #[test]
    fn test_noop_task_commands_do_not_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut timer = open(temp_dir.path());

        assert_eq!(timer.add_task("   ").unwrap(), None);
        assert!(!timer.toggle_task(42).unwrap());
        assert!(!timer.delete_task(42).unwrap());

        assert!(timer.tasks().is_empty());
        assert!(!timer.store().tasks_path().exists());
    }

    #[test]
    fn test_completions_are_logged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut timer = open(temp_dir.path());
        timer
            .save_config(DurationConfig::new(1, 1, 1, 2).unwrap())
            .unwrap();

        let events: Vec<CompletionEvent> = (0..4).map(|_| finish_interval(&mut timer)).collect();

        let nexts: Vec<Mode> = events.iter().map(|e| e.next).collect();
        assert_eq!(
            nexts,
            vec![Mode::ShortBreak, Mode::Work, Mode::LongBreak, Mode::Work]
        );
        assert_eq!(timer.completed_work_intervals(), 2);
        assert_eq!(timer.total_focused_minutes(), 2);

        let logged = read_completions(&timer.store().completions_path()).unwrap();
        let modes: Vec<Mode> = logged.iter().map(|r| r.mode).collect();
        assert_eq!(
            modes,
            vec![Mode::Work, Mode::ShortBreak, Mode::Work, Mode::LongBreak]
        );
    }

    #[test]
    fn test_completion_counts_are_not_persisted() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut timer = open(temp_dir.path());
            timer
                .save_config(DurationConfig::new(1, 1, 1, 4).unwrap())
                .unwrap();
            finish_interval(&mut timer);
            assert_eq!(timer.completed_work_intervals(), 1);
        }

        let timer = open(temp_dir.path());
        assert_eq!(timer.completed_work_intervals(), 0);
        assert_eq!(timer.mode(), Mode::Work);
    }

    #[test]
    fn test_notification_toggle_goes_through_notifier() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut timer = open(temp_dir.path());

        assert_eq!(timer.negotiate_notifications(true), Permission::Granted);
        assert!(timer.notifications_enabled());
        assert_eq!(timer.toggle_notifications(), NotificationToggle::Disabled);
        assert!(!timer.notifications_enabled());
    }
}
