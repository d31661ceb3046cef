//! Drives `FocusTimer::tick` from a background thread.
//!
//! The timer itself never sleeps. A [`Ticker`] owns at most one worker
//! thread which ticks the shared timer every interval while its clock is
//! running. [`TimerService`] wraps the clock commands so the worker is
//! always halted before the clock is mutated and started after.

use crate::controller::CompletionEvent;
use crate::timer::{FocusTimer, TimerSnapshot};
use crate::{DurationConfig, Mode, Result};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Timer shared between the UI thread and the ticker
pub type SharedTimer = Arc<Mutex<FocusTimer>>;

/// What the worker reports after each tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickerEvent {
    Tick(TimerSnapshot),
    Completed(CompletionEvent),
}

type Listener = Arc<dyn Fn(TickerEvent) + Send + Sync>;

struct Worker {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Ticker {
    timer: SharedTimer,
    interval: Duration,
    listener: Listener,
    worker: Option<Worker>,
}

fn lock(timer: &SharedTimer) -> MutexGuard<'_, FocusTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Ticker {
    pub fn new(
        timer: SharedTimer,
        interval: Duration,
        listener: impl Fn(TickerEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            timer,
            interval,
            listener: Arc::new(listener),
            worker: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Spawn the worker unless one is already ticking
    pub fn ensure_running(&mut self) {
        if self.is_active() {
            return;
        }
        // Reap a worker that died.
        self.halt();

        let (stop, stop_rx) = mpsc::channel();
        let timer = Arc::clone(&self.timer);
        let listener = Arc::clone(&self.listener);
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            // Idle while stopped; only halt() ends the worker.
            let event = {
                let mut timer = lock(&timer);
                if !timer.is_running() {
                    continue;
                }
                match timer.tick() {
                    Some(completion) => TickerEvent::Completed(completion),
                    None => TickerEvent::Tick(timer.snapshot()),
                }
            };

            listener(event);
        });

        tracing::debug!("Ticker started ({:?} per tick)", self.interval);
        self.worker = Some(Worker { stop, handle });
    }

    /// Stop the worker and wait for it; no tick lands after this returns.
    ///
    /// Must not be called while holding the timer lock.
    pub fn halt(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                tracing::warn!("Ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Clock commands with the ticker kept in step
pub struct TimerService {
    timer: SharedTimer,
    ticker: Ticker,
}

impl TimerService {
    pub fn new(
        timer: FocusTimer,
        interval: Duration,
        listener: impl Fn(TickerEvent) + Send + Sync + 'static,
    ) -> Self {
        let timer = Arc::new(Mutex::new(timer));
        let ticker = Ticker::new(Arc::clone(&timer), interval, listener);
        Self { timer, ticker }
    }

    pub fn shared(&self) -> SharedTimer {
        Arc::clone(&self.timer)
    }

    /// Run `f` with the timer locked. Do not call service commands from `f`.
    pub fn with_timer<R>(&self, f: impl FnOnce(&mut FocusTimer) -> R) -> R {
        f(&mut lock(&self.timer))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.with_timer(|t| t.snapshot())
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Start counting; repeated calls never add a second tick stream
    pub fn start(&mut self) -> bool {
        let (started, running) = self.with_timer(|t| (t.start(), t.is_running()));
        if running {
            self.ticker.ensure_running();
        }
        started
    }

    pub fn pause(&mut self) {
        self.ticker.halt();
        self.with_timer(|t| t.pause());
    }

    pub fn reset_current_mode(&mut self) {
        self.ticker.halt();
        self.with_timer(|t| t.reset_current_mode());
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.ticker.halt();
        self.with_timer(|t| t.switch_mode(mode));
    }

    pub fn save_config(&mut self, config: DurationConfig) -> Result<()> {
        self.ticker.halt();
        self.with_timer(|t| t.save_config(config))
    }

    pub fn shutdown(&mut self) {
        self.ticker.halt();
    }
}
