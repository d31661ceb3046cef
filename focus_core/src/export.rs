//! CSV export of the completion log.
//!
//! The whole export runs under the log's exclusive lock, so a timer
//! appending at the same time waits and then writes into the emptied log.
//! The CSV is synced and the exported lines are copied to a uniquely named
//! archive before the log is truncated, so a crash mid-export loses nothing.

use crate::wal::parse_completions;
use crate::{CompletionRecord, Result};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    mode: String,
    minutes: u32,
    completed_at: String,
}

impl From<&CompletionRecord> for CsvRow {
    fn from(record: &CompletionRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            mode: record.mode.to_string(),
            minutes: record.minutes,
            completed_at: record.completed_at.to_rfc3339(),
        }
    }
}

/// Append the log's records to `csv_path`, archive them and empty the log.
///
/// Returns how many records were exported. A log with no records is left
/// untouched.
pub fn export_csv(log_path: &Path, csv_path: &Path) -> Result<usize> {
    if !log_path.exists() {
        return Ok(0);
    }

    let mut log = OpenOptions::new().read(true).write(true).open(log_path)?;
    log.lock_exclusive()?;
    let exported = export_locked(&mut log, log_path, csv_path);
    log.unlock()?;
    exported
}

fn export_locked(log: &mut File, log_path: &Path, csv_path: &Path) -> Result<usize> {
    let mut raw = Vec::new();
    log.read_to_end(&mut raw)?;
    let records = parse_completions(raw.as_slice())?;

    if records.is_empty() {
        tracing::info!("No completions to export");
        return Ok(0);
    }

    write_csv(csv_path, &records)?;

    let archived = archive_path(log_path);
    let mut archive = File::create(&archived)?;
    archive.write_all(&raw)?;
    archive.sync_all()?;

    // Appenders use O_APPEND, so whatever they write next starts at 0.
    log.set_len(0)?;
    log.sync_all()?;

    tracing::info!(
        "Exported {} completions to {:?}, archived as {:?}",
        records.len(),
        csv_path,
        archived
    );
    Ok(records.len())
}

fn write_csv(csv_path: &Path, records: &[CompletionRecord]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only for a brand new file.
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;
    Ok(())
}

/// Delete archived logs (`*.processed`) in `dir`
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed archived log {:?}", path);
            count += 1;
        }
    }

    Ok(count)
}

/// `completions.jsonl.<timestamp>-<suffix>.processed`, never reused
fn archive_path(log_path: &Path) -> PathBuf {
    let id = Uuid::new_v4().simple().to_string();
    let mut name = log_path.as_os_str().to_owned();
    name.push(format!(
        ".{}-{}.processed",
        Utc::now().format("%Y%m%dT%H%M%S"),
        &id[..8]
    ));
    name.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::{read_completions, CompletionSink, JsonlSink};
    use crate::Mode;
    use std::thread;

    fn archives(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "processed"))
            .collect()
    }

    fn write_log(path: &Path, modes: &[Mode]) {
        let mut sink = JsonlSink::new(path);
        for mode in modes {
            sink.append(&CompletionRecord::new(*mode, 25, Utc::now()))
                .unwrap();
        }
    }

    #[test]
    fn test_export_writes_csv_and_archives_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("completions.jsonl");
        let csv_path = temp_dir.path().join("completions.csv");
        write_log(&log, &[Mode::Work, Mode::ShortBreak, Mode::Work]);

        let count = export_csv(&log, &csv_path).unwrap();

        assert_eq!(count, 3);
        assert_eq!(std::fs::metadata(&log).unwrap().len(), 0);

        let archives = archives(temp_dir.path());
        assert_eq!(archives.len(), 1);
        assert_eq!(read_completions(&archives[0]).unwrap().len(), 3);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("id,mode,minutes,completed_at"));
        assert!(contents.contains(",short-break,"));
    }

    #[test]
    fn test_second_export_appends_without_new_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("completions.jsonl");
        let csv_path = temp_dir.path().join("completions.csv");

        write_log(&log, &[Mode::Work]);
        export_csv(&log, &csv_path).unwrap();
        write_log(&log, &[Mode::LongBreak]);
        export_csv(&log, &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);

        // Each export keeps its own archive.
        assert_eq!(archives(temp_dir.path()).len(), 2);
    }

    #[test]
    fn test_export_during_appends_loses_nothing() {
        const APPENDS: usize = 300;
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("completions.jsonl");
        let csv_path = temp_dir.path().join("completions.csv");

        let writer_log = log.clone();
        let writer = thread::spawn(move || {
            let mut sink = JsonlSink::new(writer_log);
            for _ in 0..APPENDS {
                sink.append(&CompletionRecord::new(Mode::Work, 25, Utc::now()))
                    .unwrap();
            }
        });

        let mut exported = 0;
        while !writer.is_finished() {
            exported += export_csv(&log, &csv_path).unwrap();
        }
        writer.join().unwrap();
        exported += export_csv(&log, &csv_path).unwrap();

        assert_eq!(exported, APPENDS);
        assert!(read_completions(&log).unwrap().is_empty());

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), APPENDS);

        let archived: usize = archives(temp_dir.path())
            .iter()
            .map(|p| read_completions(p).unwrap().len())
            .sum();
        assert_eq!(archived, APPENDS);
    }

    #[test]
    fn test_empty_log_is_left_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("completions.jsonl");
        File::create(&log).unwrap();

        let count = export_csv(&log, &temp_dir.path().join("out.csv")).unwrap();

        assert_eq!(count, 0);
        assert!(log.exists());
    }

    #[test]
    fn test_missing_log_exports_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("out.csv");

        let count = export_csv(&temp_dir.path().join("completions.jsonl"), &csv_path).unwrap();

        assert_eq!(count, 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_removes_only_processed_logs() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("a.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("b.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("completions.jsonl")).unwrap();

        assert_eq!(cleanup_processed(temp_dir.path()).unwrap(), 2);
        assert!(temp_dir.path().join("completions.jsonl").exists());
    }
}
