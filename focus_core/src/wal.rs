//! Append-only completion log.
//!
//! Every finished interval is appended as one JSON line, under an
//! exclusive file lock so concurrent timers never interleave lines.

use crate::{CompletionRecord, Mode, Result};
use chrono::{Local, NaiveDate};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for completion records
pub trait CompletionSink: Send {
    fn append(&mut self, record: &CompletionRecord) -> Result<()>;
}

/// JSONL-based completion sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionSink for JsonlSink {
    fn append(&mut self, record: &CompletionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let written = (&file).write_all(line.as_bytes());
        file.unlock()?;
        written?;

        tracing::debug!("Appended completion {} to {:?}", record.id, self.path);
        Ok(())
    }
}

/// Read every record from a completion log, skipping corrupt lines
pub fn read_completions(path: &Path) -> Result<Vec<CompletionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;
    let records = parse_completions(BufReader::new(&file));
    file.unlock()?;

    let records = records?;
    tracing::debug!("Read {} completions from {:?}", records.len(), path);
    Ok(records)
}

/// Parse JSONL completion records; the caller holds whatever lock it needs
pub(crate) fn parse_completions(reader: impl BufRead) -> Result<Vec<CompletionRecord>> {
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping completion at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(records)
}

/// Totals for one local calendar day
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub work_intervals: u32,
    pub focused_minutes: u32,
    pub breaks: u32,
}

/// Summarize the records whose local completion date is `day`
///
/// Unlike the live counter, minutes here are the lengths the intervals
/// actually had when they finished.
pub fn summarize_day(records: &[CompletionRecord], day: NaiveDate) -> DaySummary {
    records
        .iter()
        .filter(|r| r.completed_at.with_timezone(&Local).date_naive() == day)
        .fold(DaySummary::default(), |mut summary, r| {
            match r.mode {
                Mode::Work => {
                    summary.work_intervals += 1;
                    summary.focused_minutes += r.minutes;
                }
                Mode::ShortBreak | Mode::LongBreak => summary.breaks += 1,
            }
            summary
        })
}
