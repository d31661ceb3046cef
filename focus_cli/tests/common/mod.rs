//! Shared helpers for the focus CLI tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated config + data directory pair
pub struct TestEnv {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

impl TestEnv {
    /// Fast ticks, no sound, no notifications
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = dir.path().join("data");
        let config_path = dir.path().join("config.toml");

        let config = format!(
            r#"
[data]
data_dir = "{}"

[notifications]
enabled = false

[sound]
enabled = false

[timer]
tick_millis = 1
"#,
            data_dir.display().to_string().replace('\\', "\\\\")
        );
        fs::write(&config_path, config).expect("Failed to write config");

        Self {
            dir,
            config_path,
            data_dir,
        }
    }

    /// The binary with this environment's config and data dir
    pub fn cli(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("focus"));
        cmd.arg("--config")
            .arg(&self.config_path)
            .arg("--data-dir")
            .arg(&self.data_dir);
        cmd
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        read_json(&self.path(name))
    }

    /// Shorten every interval to one minute
    pub fn one_minute_intervals(&self) {
        self.cli()
            .args([
                "settings",
                "set",
                "--work",
                "1",
                "--short-break",
                "1",
                "--long-break",
                "1",
            ])
            .assert()
            .success();
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&contents).expect("Invalid JSON")
}
