//! Audio cue players.
//!
//! Playback is fire-and-forget: the player process is detached and its
//! output discarded.

use crate::{Error, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Something that can make a short completion sound
pub trait AudioCue: Send {
    fn play(&mut self) -> Result<()>;
}

/// Plays a sound file with an external player (e.g. `paplay file.oga`)
///
/// Players that have exited are reaped on the next `play`.
pub struct CommandCue {
    player: String,
    file: PathBuf,
    playing: Vec<Child>,
}

impl CommandCue {
    pub fn new(player: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            file: file.into(),
            playing: Vec::new(),
        }
    }

    /// Wait on finished players; returns how many are still running
    pub fn reap(&mut self) -> usize {
        self.playing.retain_mut(|child| match child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) => {
                tracing::warn!("Lost track of sound player: {}", e);
                false
            }
        });
        self.playing.len()
    }
}

impl AudioCue for CommandCue {
    fn play(&mut self) -> Result<()> {
        self.reap();

        if !self.file.exists() {
            return Err(Error::Audio(format!(
                "sound file {:?} does not exist",
                self.file
            )));
        }

        let child = Command::new(&self.player)
            .arg(&self.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Audio(format!("failed to run {}: {}", self.player, e)))?;
        self.playing.push(child);

        tracing::debug!("Playing {:?} with {}", self.file, self.player);
        Ok(())
    }
}

/// Rings the terminal bell
#[derive(Default)]
pub struct BellCue;

impl AudioCue for BellCue {
    fn play(&mut self) -> Result<()> {
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Tries `primary`, and plays `fallback` when it fails
pub struct FallbackCue {
    primary: Box<dyn AudioCue>,
    fallback: Box<dyn AudioCue>,
}

impl FallbackCue {
    pub fn new(primary: Box<dyn AudioCue>, fallback: Box<dyn AudioCue>) -> Self {
        Self { primary, fallback }
    }
}

impl AudioCue for FallbackCue {
    fn play(&mut self) -> Result<()> {
        match self.primary.play() {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!("Primary cue failed ({}), using fallback", e);
                self.fallback.play()
            }
        }
    }
}

/// Muted
#[derive(Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }
}
