//! Interval lengths and the long-break cadence.
//!
//! A `DurationConfig` is always in range: construction through [`DurationConfig::new`]
//! rejects bad values, and deserialization clamps them so that a hand-edited
//! settings file can never put an invalid value in memory.

use crate::{Error, Mode, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const WORK_MINUTES_RANGE: RangeInclusive<u32> = 1..=60;
pub const SHORT_BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=30;
pub const LONG_BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=60;
pub const LONG_BREAK_INTERVAL_RANGE: RangeInclusive<u32> = 2..=10;

const DEFAULT_WORK_MINUTES: u32 = 25;
const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
const DEFAULT_LONG_BREAK_INTERVAL: u32 = 4;

/// Configured interval lengths (minutes) and long-break cadence
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawDurations")]
pub struct DurationConfig {
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    long_break_interval: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            long_break_interval: DEFAULT_LONG_BREAK_INTERVAL,
        }
    }
}

/// A partial edit; `None` keeps the current value
#[derive(Clone, Copy, Debug, Default)]
pub struct DurationEdit {
    pub work_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub long_break_interval: Option<u32>,
}

impl DurationConfig {
    /// Build a config, rejecting any field outside its range
    pub fn new(
        work_minutes: u32,
        short_break_minutes: u32,
        long_break_minutes: u32,
        long_break_interval: u32,
    ) -> Result<Self> {
        Ok(Self {
            work_minutes: check("work_minutes", work_minutes, WORK_MINUTES_RANGE)?,
            short_break_minutes: check(
                "short_break_minutes",
                short_break_minutes,
                SHORT_BREAK_MINUTES_RANGE,
            )?,
            long_break_minutes: check(
                "long_break_minutes",
                long_break_minutes,
                LONG_BREAK_MINUTES_RANGE,
            )?,
            long_break_interval: check(
                "long_break_interval",
                long_break_interval,
                LONG_BREAK_INTERVAL_RANGE,
            )?,
        })
    }

    /// Apply a partial edit, producing a whole new validated config
    pub fn with_edit(&self, edit: DurationEdit) -> Result<Self> {
        Self::new(
            edit.work_minutes.unwrap_or(self.work_minutes),
            edit.short_break_minutes.unwrap_or(self.short_break_minutes),
            edit.long_break_minutes.unwrap_or(self.long_break_minutes),
            edit.long_break_interval.unwrap_or(self.long_break_interval),
        )
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn short_break_minutes(&self) -> u32 {
        self.short_break_minutes
    }

    pub fn long_break_minutes(&self) -> u32 {
        self.long_break_minutes
    }

    pub fn long_break_interval(&self) -> u32 {
        self.long_break_interval
    }

    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Full length of an interval in seconds
    pub fn duration_for(&self, mode: Mode) -> u32 {
        self.minutes_for(mode) * 60
    }
}

fn check(field: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<u32> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Validation {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn clamp(field: &str, value: u32, range: RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        tracing::warn!(
            "Stored {} = {} is out of range {:?}, using {}",
            field,
            value,
            range,
            clamped
        );
    }
    clamped
}

/// On-disk shape; every field optional so partial files still load
#[derive(Deserialize)]
struct RawDurations {
    #[serde(default = "default_work")]
    work_minutes: u32,
    #[serde(default = "default_short_break")]
    short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    long_break_minutes: u32,
    #[serde(default = "default_interval")]
    long_break_interval: u32,
}

impl From<RawDurations> for DurationConfig {
    fn from(raw: RawDurations) -> Self {
        Self {
            work_minutes: clamp("work_minutes", raw.work_minutes, WORK_MINUTES_RANGE),
            short_break_minutes: clamp(
                "short_break_minutes",
                raw.short_break_minutes,
                SHORT_BREAK_MINUTES_RANGE,
            ),
            long_break_minutes: clamp(
                "long_break_minutes",
                raw.long_break_minutes,
                LONG_BREAK_MINUTES_RANGE,
            ),
            long_break_interval: clamp(
                "long_break_interval",
                raw.long_break_interval,
                LONG_BREAK_INTERVAL_RANGE,
            ),
        }
    }
}

fn default_work() -> u32 {
    DEFAULT_WORK_MINUTES
}

fn default_short_break() -> u32 {
    DEFAULT_SHORT_BREAK_MINUTES
}

fn default_long_break() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}

fn default_interval() -> u32 {
    DEFAULT_LONG_BREAK_INTERVAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DurationConfig::default();
        assert_eq!(config.work_minutes(), 25);
        assert_eq!(config.short_break_minutes(), 5);
        assert_eq!(config.long_break_minutes(), 15);
        assert_eq!(config.long_break_interval(), 4);
        assert_eq!(config.duration_for(Mode::Work), 1500);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(DurationConfig::new(1, 1, 1, 2).is_ok());
        assert!(DurationConfig::new(60, 30, 60, 10).is_ok());
    }

    #[test]
    fn test_out_of_range_fields_are_rejected() {
        assert!(matches!(
            DurationConfig::new(0, 5, 15, 4),
            Err(Error::Validation { field: "work_minutes", .. })
        ));
        assert!(matches!(
            DurationConfig::new(25, 31, 15, 4),
            Err(Error::Validation { field: "short_break_minutes", max: 30, .. })
        ));
        assert!(matches!(
            DurationConfig::new(25, 5, 61, 4),
            Err(Error::Validation { field: "long_break_minutes", .. })
        ));
        assert!(matches!(
            DurationConfig::new(25, 5, 15, 1),
            Err(Error::Validation { field: "long_break_interval", min: 2, .. })
        ));
    }

    #[test]
    fn test_edit_keeps_unset_fields() {
        let config = DurationConfig::default()
            .with_edit(DurationEdit {
                work_minutes: Some(50),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.work_minutes(), 50);
        assert_eq!(config.short_break_minutes(), 5);
        assert_eq!(config.long_break_interval(), 4);
    }

    #[test]
    fn test_invalid_edit_leaves_original_untouched() {
        let config = DurationConfig::default();
        let result = config.with_edit(DurationEdit {
            work_minutes: Some(40),
            long_break_interval: Some(11),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(config, DurationConfig::default());
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_values() {
        let json = r#"{"work_minutes": 90, "short_break_minutes": 0, "long_break_minutes": 15, "long_break_interval": 4}"#;
        let config: DurationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.work_minutes(), 60);
        assert_eq!(config.short_break_minutes(), 1);
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: DurationConfig = serde_json::from_str(r#"{"work_minutes": 30}"#).unwrap();
        assert_eq!(config.work_minutes(), 30);
        assert_eq!(config.long_break_minutes(), 15);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DurationConfig::new(45, 10, 20, 3).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DurationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
