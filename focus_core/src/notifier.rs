//! Completion side effects: the audio cue and the desktop notification.
//!
//! Both effects are best-effort. Failures are logged and swallowed here so
//! they can never interrupt a mode transition.

use crate::{AudioCue, Error, Mode, Result};
use serde::{Deserialize, Serialize};

/// De-duplication tag shared by every completion notification
pub const NOTIFICATION_TAG: &str = "focus-timer";

/// Outcome of the one-time notification permission negotiation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

/// A notification ready to hand to the platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub tag: String,
}

impl Notice {
    /// Wording for the interval that just finished
    pub fn for_completed(mode: Mode) -> Self {
        let (title, body) = match mode {
            Mode::Work => ("Pomodoro complete!", "Great work! Time to take a break."),
            Mode::ShortBreak => ("Break over", "Ready to get back to work?"),
            Mode::LongBreak => ("Long break over", "Recharged! Time to get back to work."),
        };
        Self {
            title: title.into(),
            body: body.into(),
            tag: NOTIFICATION_TAG.into(),
        }
    }
}

/// Platform notification capability
pub trait NotificationSink: Send {
    fn request_permission(&mut self) -> Permission;
    fn notify(&mut self, notice: &Notice) -> Result<()>;
}

/// Result of the user flipping the notifications switch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationToggle {
    Enabled,
    Disabled,
    /// Permission was refused at the platform level; nothing changed
    Blocked,
}

/// Dispatches the completion side effects, once per completion event
pub struct CompletionNotifier {
    audio: Box<dyn AudioCue>,
    sink: Box<dyn NotificationSink>,
    permission: Permission,
    enabled: bool,
}

impl CompletionNotifier {
    pub fn new(audio: Box<dyn AudioCue>, sink: Box<dyn NotificationSink>) -> Self {
        Self {
            audio,
            sink,
            permission: Permission::Undetermined,
            enabled: false,
        }
    }

    /// Ask for permission if it has never been asked, and enable
    /// notifications when granted and `want_enabled` is set.
    pub fn negotiate(&mut self, want_enabled: bool) -> Permission {
        if self.permission == Permission::Undetermined {
            self.permission = self.sink.request_permission();
            tracing::info!("Notification permission: {:?}", self.permission);
        }
        self.enabled = want_enabled && self.permission == Permission::Granted;
        self.permission
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn notifications_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the local switch without re-asking the platform unless
    /// permission was never settled.
    pub fn toggle(&mut self) -> NotificationToggle {
        match self.permission {
            Permission::Granted => {
                self.enabled = !self.enabled;
            }
            Permission::Undetermined => {
                self.permission = self.sink.request_permission();
                self.enabled = self.permission == Permission::Granted;
            }
            Permission::Denied => {
                tracing::info!("Notifications are blocked by the platform");
                return NotificationToggle::Blocked;
            }
        }
        if self.enabled {
            NotificationToggle::Enabled
        } else {
            NotificationToggle::Disabled
        }
    }

    /// Play the cue and, if allowed, post the notification for `finished`
    pub fn notify_completion(&mut self, finished: Mode) {
        if let Err(e) = self.audio.play() {
            tracing::warn!("Audio cue failed: {}", e);
        }

        if !self.enabled || self.permission != Permission::Granted {
            return;
        }

        let notice = Notice::for_completed(finished);
        match self.sink.notify(&notice) {
            Ok(()) => tracing::debug!("Posted notification: {}", notice.title),
            Err(e) => tracing::warn!("Notification failed: {}", e),
        }
    }
}

// ============================================================================
// Platform sinks
// ============================================================================

/// Desktop notifications through the platform notification service
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl NotificationSink for DesktopNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    fn request_permission(&mut self) -> Permission {
        match notify_rust::get_server_information() {
            Ok(info) => {
                tracing::debug!("Notification server: {} {}", info.name, info.version);
                Permission::Granted
            }
            Err(e) => {
                tracing::warn!("No notification server available: {}", e);
                Permission::Denied
            }
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn notify(&mut self, notice: &Notice) -> Result<()> {
        let mut notification = notify_rust::Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&notice.title)
            .body(&notice.body);

        // Same tag, same id: the server replaces instead of stacking.
        #[cfg(all(unix, not(target_os = "macos")))]
        notification.id(replace_id(&notice.tag));

        notification
            .show()
            .map_err(|e| Error::Notification(e.to_string()))?;
        Ok(())
    }
}

/// Stable non-zero id derived from a tag (FNV-1a)
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn replace_id(tag: &str) -> u32 {
    let hash = tag
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    hash.max(1)
}

/// A sink for environments without notifications; permission is always denied
#[derive(Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn notify(&mut self, _notice: &Notice) -> Result<()> {
        Err(Error::Notification("notifications are unavailable".into()))
    }
}
