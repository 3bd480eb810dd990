//! Control overlay state machine
//!
//! Tracks whether the controls are shown and whether a settings surface is
//! open, owns the hide timer, and maps clicks and keys to shortcuts.

use crate::{host::Scheduler, types::TimerId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Which third of the video a click landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickZone {
    Left,
    Middle,
    Right,
}

impl ClickZone {
    /// Locate `x` (relative to the left edge) within `width`
    pub fn locate(x: f64, width: f64) -> Self {
        if width <= 0.0 {
            return ClickZone::Middle;
        }
        if x < width / 3.0 {
            ClickZone::Left
        } else if x > width * 2.0 / 3.0 {
            ClickZone::Right
        } else {
            ClickZone::Middle
        }
    }
}

/// Keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleFullscreen,
    TogglePlay,
    ToggleMute,
    SkipForward,
    SkipBackward,
    VolumeUp,
    VolumeDown,
}

impl Shortcut {
    /// Map a `KeyboardEvent.key` value, case-insensitively
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "f" => Some(Shortcut::ToggleFullscreen),
            " " => Some(Shortcut::TogglePlay),
            "m" => Some(Shortcut::ToggleMute),
            "arrowright" => Some(Shortcut::SkipForward),
            "arrowleft" => Some(Shortcut::SkipBackward),
            "arrowup" => Some(Shortcut::VolumeUp),
            "arrowdown" => Some(Shortcut::VolumeDown),
            _ => None,
        }
    }
}

/// What the host should do with the originating key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeyOutcome {
    pub handled: bool,
    pub prevent_default: bool,
}

/// Page of the settings surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsView {
    #[default]
    Main,
    Quality,
    Speed,
}

/// Overlay visibility as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlVisibility {
    pub visible: bool,
    pub hide_pending: bool,
}

/// Visibility × settings-surface state machine
#[derive(Debug)]
pub struct Interaction {
    visible: bool,
    settings_open: bool,
    settings_view: SettingsView,
    pending_hide: Option<TimerId>,
    hide_after: Duration,
}

impl Interaction {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            visible: true,
            settings_open: false,
            settings_view: SettingsView::Main,
            pending_hide: None,
            hide_after,
        }
    }

    pub fn visibility(&self) -> ControlVisibility {
        ControlVisibility {
            visible: self.visible,
            hide_pending: self.pending_hide.is_some(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn settings_view(&self) -> SettingsView {
        self.settings_view
    }

    pub fn pending_hide(&self) -> Option<TimerId> {
        self.pending_hide
    }

    fn rearm<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.cancel(scheduler);
        self.pending_hide = Some(scheduler.schedule(self.hide_after));
    }

    /// Drop the pending hide timer
    pub fn cancel<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.pending_hide.take() {
            scheduler.cancel(id);
        }
    }

    /// Back to the initial state for a new session
    pub fn reset<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.cancel(scheduler);
        self.visible = true;
        self.settings_open = false;
        self.settings_view = SettingsView::Main;
    }

    /// Pointer move, click or recognized key
    pub fn activity<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.visible = true;
        if self.settings_open {
            return;
        }
        self.rearm(scheduler);
    }

    /// Hide timer expired. Returns true if the controls were hidden.
    pub fn on_hide_timer(&mut self, id: TimerId, is_playing: bool) -> bool {
        if self.pending_hide != Some(id) {
            debug!(timer = %id, "Stale hide timer ignored");
            return false;
        }
        self.pending_hide = None;

        if is_playing && !self.settings_open {
            self.visible = false;
            true
        } else {
            false
        }
    }

    /// Pointer left the player: hide now, under the same gate as the timer
    pub fn pointer_leave<S: Scheduler>(&mut self, scheduler: &mut S, is_playing: bool) {
        if is_playing && !self.settings_open {
            self.cancel(scheduler);
            self.visible = false;
        }
    }

    pub fn open_settings<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.settings_open = true;
        self.settings_view = SettingsView::Main;
        self.cancel(scheduler);
        self.visible = true;
    }

    pub fn close_settings<S: Scheduler>(&mut self, scheduler: &mut S, is_playing: bool) {
        self.settings_open = false;
        self.settings_view = SettingsView::Main;
        self.visible = true;
        self.cancel(scheduler);
        if is_playing {
            self.rearm(scheduler);
        }
    }

    /// Navigate inside the open settings surface
    pub fn show_view(&mut self, view: SettingsView) {
        if self.settings_open {
            self.settings_view = view;
        }
    }

    /// Document entered or left fullscreen
    pub fn fullscreen_changed<S: Scheduler>(&mut self, scheduler: &mut S, entered: bool) {
        self.visible = true;
        if entered && !self.settings_open {
            self.rearm(scheduler);
        }
    }

    /// Playback started while the controls are up
    pub fn playback_started<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.visible && !self.settings_open {
            self.rearm(scheduler);
        }
    }
}
