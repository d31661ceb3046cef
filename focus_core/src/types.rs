//! Core domain types for the focus timer.
//!
//! This module defines the fundamental types shared across components:
//! - Timer modes
//! - To-do tasks
//! - Completion log records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Modes
// ============================================================================

/// One of the three timer phases
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    /// Human readable title shown above the countdown
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Work => "Work Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Mode::Work)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "work" | "w" | "focus" => Ok(Mode::Work),
            "short-break" | "shortbreak" | "short" | "break" | "b" => Ok(Mode::ShortBreak),
            "long-break" | "longbreak" | "long" | "l" => Ok(Mode::LongBreak),
            _ => Err(crate::Error::InvalidMode(s.to_string())),
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// A to-do item kept alongside the timer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

// ============================================================================
// Completion log
// ============================================================================

/// One finished interval, as appended to the completion log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub mode: Mode,
    /// Configured length of the interval when it finished
    pub minutes: u32,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(mode: Mode, minutes: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            minutes,
            completed_at,
        }
    }
}

/// Format a second count as `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
