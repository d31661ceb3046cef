//! Application configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/focus-timer/config.toml`. This covers the
//! environment the timer runs in (where data lives, how to make noise);
//! interval lengths are a separate persisted record, see [`crate::Store`].

use crate::{AudioCue, BellCue, CommandCue, Error, FallbackCue, Result, SilentCue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "focus-timer";

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub sound: SoundConfig,

    #[serde(default)]
    pub timer: TimerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Turn notifications on at startup when the platform allows them
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: default_app_name(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_player")]
    pub player: String,

    #[serde(default = "default_sound_file")]
    pub file: PathBuf,

    /// Ring the terminal bell when the player can't be used
    #[serde(default = "default_true")]
    pub bell_fallback: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player: default_player(),
            file: default_sound_file(),
            bell_fallback: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between ticks; one tick is one second of countdown
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

impl SoundConfig {
    /// The cue described by this section
    pub fn build_cue(&self) -> Box<dyn AudioCue> {
        if !self.enabled {
            return Box::new(SilentCue);
        }
        let player: Box<dyn AudioCue> = Box::new(CommandCue::new(&self.player, &self.file));
        if !self.bell_fallback {
            return player;
        }
        Box::new(FallbackCue::new(player, Box::new(BellCue)))
    }
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local/share")
    });
    base.join(APP_DIR)
}

fn default_true() -> bool {
    true
}

fn default_app_name() -> String {
    "Focus Timer".into()
}

fn default_player() -> String {
    "paplay".into()
}

fn default_sound_file() -> PathBuf {
    PathBuf::from("/usr/share/sounds/freedesktop/stereo/complete.oga")
}

fn default_tick_millis() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.timer.tick_millis == 0 {
            return Err(Error::Config("timer.tick_millis must be at least 1".into()));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        base.join(APP_DIR).join("config.toml")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
