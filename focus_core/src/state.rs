//! Persisted records with file locking.
//!
//! Two records live in the data directory: `settings.json` (the
//! [`DurationConfig`]) and `tasks.json` (the ordered task list). Each is
//! read once at startup and rewritten in full after every change.

use crate::{DurationConfig, Error, Result, Task};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SETTINGS_FILE: &str = "settings.json";
const TASKS_FILE: &str = "tasks.json";
const COMPLETIONS_FILE: &str = "completions.jsonl";
const COMPLETIONS_CSV_FILE: &str = "completions.csv";

/// Locations of everything persisted under one data directory
#[derive(Clone, Debug)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    pub fn completions_path(&self) -> PathBuf {
        self.data_dir.join(COMPLETIONS_FILE)
    }

    pub fn completions_csv_path(&self) -> PathBuf {
        self.data_dir.join(COMPLETIONS_CSV_FILE)
    }

    /// Saved durations, or the defaults when nothing usable is on disk
    pub fn load_settings(&self) -> Result<DurationConfig> {
        load_record(&self.settings_path())
    }

    pub fn save_settings(&self, config: &DurationConfig) -> Result<()> {
        save_record(&self.settings_path(), config)
    }

    /// Saved tasks in insertion order, or an empty list
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        load_record(&self.tasks_path())
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        save_record(&self.tasks_path(), tasks)
    }
}

/// Load a JSON record with shared locking
///
/// Returns the default value if the file doesn't exist.
/// If the file is unreadable or corrupted, logs a warning and returns the default.
pub fn load_record<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::info!("No record at {:?}, using defaults", path);
        return Ok(T::default());
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Using defaults.", path, e);
            return Ok(T::default());
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Using defaults.", path, e);
        return Ok(T::default());
    }

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;

    if let Err(e) = read {
        tracing::warn!("Failed to read {:?}: {}. Using defaults.", path, e);
        return Ok(T::default());
    }

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded record from {:?}", path);
            Ok(value)
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
            Ok(T::default())
        }
    }
}

/// Save a JSON record atomically
///
/// Writes to a locked temp file in the same directory, syncs it, then
/// renames it over the target, so readers see either the old record or
/// the new one and never a partial write.
pub fn save_record<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let parent = path
        .parent()
        .ok_or_else(|| Error::Other(format!("record path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved record to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Store) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Store::new(temp_dir.path());
        (temp_dir, store)
    }

    #[test]
    fn test_settings_roundtrip() {
        let (_dir, store) = store();
        let config = DurationConfig::new(50, 10, 30, 3).unwrap();

        store.save_settings(&config).unwrap();

        assert_eq!(store.load_settings().unwrap(), config);
    }

    #[test]
    fn test_missing_records_fall_back_to_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_settings().unwrap(), DurationConfig::default());
        assert!(store.load_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_records_fall_back_to_defaults() {
        let (_dir, store) = store();
        std::fs::write(store.settings_path(), "{ invalid json }").unwrap();
        std::fs::write(store.tasks_path(), "[{\"id\": ").unwrap();

        assert_eq!(store.load_settings().unwrap(), DurationConfig::default());
        assert!(store.load_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_tasks_keep_insertion_order() {
        let (_dir, store) = store();
        let tasks = vec![
            Task {
                id: 30,
                text: "third id, first in list".into(),
                completed: false,
            },
            Task {
                id: 10,
                text: "done".into(),
                completed: true,
            },
        ];

        store.save_tasks(&tasks).unwrap();

        assert_eq!(store.load_tasks().unwrap(), tasks);
    }

    #[test]
    fn test_save_creates_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Store::new(temp_dir.path().join("nested").join("data"));

        store.save_tasks(&[]).unwrap();

        assert!(store.tasks_path().exists());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let (dir, store) = store();
        store.save_settings(&DurationConfig::default()).unwrap();
        store.save_settings(&DurationConfig::default()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != SETTINGS_FILE)
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }
}
