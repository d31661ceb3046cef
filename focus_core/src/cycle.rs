//! Completed-interval accounting.

use crate::DurationConfig;

/// Result of recording one finished work interval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    pub completed: u32,
    pub long_break_due: bool,
}

/// Counts finished work intervals for the lifetime of the process
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleAccountant {
    completed_work_intervals: u32,
}

impl CycleAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_work_intervals(&self) -> u32 {
        self.completed_work_intervals
    }

    /// Count one finished work interval.
    ///
    /// Must be called exactly once per genuine completion; a second call
    /// counts the interval twice.
    pub fn record_work_interval_completed(&mut self, config: &DurationConfig) -> CycleOutcome {
        self.completed_work_intervals += 1;
        let completed = self.completed_work_intervals;
        CycleOutcome {
            completed,
            long_break_due: completed % config.long_break_interval() == 0,
        }
    }

    /// Focused minutes, always derived from the *current* work length.
    ///
    /// Changing the work length later rescales intervals that already
    /// finished at the old length.
    pub fn total_focused_minutes(&self, config: &DurationConfig) -> u32 {
        self.completed_work_intervals * config.work_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_break_every_fourth_interval() {
        let config = DurationConfig::default();
        let mut cycles = CycleAccountant::new();

        let due: Vec<bool> = (0..8)
            .map(|_| cycles.record_work_interval_completed(&config).long_break_due)
            .collect();

        assert_eq!(due, vec![false, false, false, true, false, false, false, true]);
        assert_eq!(cycles.completed_work_intervals(), 8);
    }

    #[test]
    fn test_cadence_follows_config() {
        let config = DurationConfig::new(25, 5, 15, 2).unwrap();
        let mut cycles = CycleAccountant::new();
        assert!(!cycles.record_work_interval_completed(&config).long_break_due);
        let outcome = cycles.record_work_interval_completed(&config);
        assert_eq!(outcome.completed, 2);
        assert!(outcome.long_break_due);
    }

    #[test]
    fn test_focused_minutes_use_current_work_length() {
        let mut cycles = CycleAccountant::new();
        let config = DurationConfig::default();
        cycles.record_work_interval_completed(&config);
        cycles.record_work_interval_completed(&config);
        assert_eq!(cycles.total_focused_minutes(&config), 50);

        let longer = DurationConfig::new(40, 5, 15, 4).unwrap();
        assert_eq!(cycles.total_focused_minutes(&longer), 80);
    }
}
