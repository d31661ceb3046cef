#![forbid(unsafe_code)]

//! Timer state machine and session accounting for the focus timer.
//!
//! This crate provides:
//! - The countdown clock, mode controller and cycle accounting
//! - Completion side effects (audio cue, desktop notification)
//! - The task list
//! - Persistence (settings and task records, completion log, CSV export)
//! - A background ticker that drives the clock

pub mod types;
pub mod error;
pub mod durations;
pub mod config;
pub mod logging;
pub mod clock;
pub mod cycle;
pub mod controller;
pub mod audio;
pub mod notifier;
pub mod tasks;
pub mod state;
pub mod wal;
pub mod export;
pub mod timer;
pub mod scheduler;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use durations::{DurationConfig, DurationEdit};
pub use config::Config;
pub use audio::{AudioCue, BellCue, CommandCue, FallbackCue, SilentCue};
pub use notifier::{
    CompletionNotifier, DesktopNotifier, Notice, NotificationSink, NotificationToggle,
    NullNotifier, Permission,
};
pub use controller::CompletionEvent;
pub use state::Store;
pub use wal::{read_completions, summarize_day, CompletionSink, DaySummary, JsonlSink};
pub use timer::{FocusTimer, TimerSnapshot};
pub use scheduler::{SharedTimer, Ticker, TickerEvent, TimerService};
