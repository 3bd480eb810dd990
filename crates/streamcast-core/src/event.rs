//! Inputs processed by the playback controller
//!
//! Engine, element, user and timer events all funnel through [`PlayerEvent`]
//! and are handled one at a time, in arrival order.

use crate::{
    interaction::SettingsView,
    types::{PlaybackRate, SessionId, StreamLocator, TimerId},
};
use serde::{Deserialize, Serialize};

/// Events emitted by the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate,
    LoadedMetadata,
    VolumeChange,
    Waiting,
    Playing,
    CanPlay,
    RateChange,
    Error,
}

impl MediaEvent {
    /// DOM event name
    pub fn dom_name(&self) -> &'static str {
        match self {
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::Waiting => "waiting",
            MediaEvent::Playing => "playing",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::RateChange => "ratechange",
            MediaEvent::Error => "error",
        }
    }

    pub const ALL: [MediaEvent; 10] = [
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::TimeUpdate,
        MediaEvent::LoadedMetadata,
        MediaEvent::VolumeChange,
        MediaEvent::Waiting,
        MediaEvent::Playing,
        MediaEvent::CanPlay,
        MediaEvent::RateChange,
        MediaEvent::Error,
    ];
}

/// Error class reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

/// Error payload reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    /// Engine-specific detail code, e.g. `manifestLoadError`
    pub details: String,
    pub fatal: bool,
}

/// Detail codes raised while fetching the initial manifest
pub const MANIFEST_LOAD_DETAILS: [&str; 2] = ["manifestLoadError", "manifestLoadTimeOut"];

impl EngineError {
    pub fn new(kind: EngineErrorKind, details: impl Into<String>, fatal: bool) -> Self {
        Self {
            kind,
            details: details.into(),
            fatal,
        }
    }

    pub fn is_manifest_load(&self) -> bool {
        MANIFEST_LOAD_DETAILS.contains(&self.details.as_str())
    }
}

/// Events emitted by the adaptive engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Manifest parsed; `live` reflects the first level's details
    ManifestParsed { live: bool },
    Error(EngineError),
}

/// Pointer activity on the player surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerInput {
    Move,
    Leave,
    /// `x` relative to the video's left edge
    Click { x: f64, width: f64 },
    DoubleClick { x: f64, width: f64 },
}

/// A keydown on the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// `KeyboardEvent.key`
    pub key: String,
    /// Focus is on an input, textarea or content-editable element
    #[serde(default)]
    pub editable_target: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            editable_target: false,
        }
    }
}

/// Commands from the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Intent {
    TogglePlay,
    Seek(f64),
    SkipForward,
    SkipBackward,
    SetVolume(f64),
    ToggleMute,
    SetRate(PlaybackRate),
    SelectQuality(String),
    ToggleFullscreen,
    OpenSettings,
    CloseSettings,
    ShowSettingsView(SettingsView),
}

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Bind a new locator, replacing any current session
    Load(StreamLocator),
    Media(MediaEvent),
    Engine {
        session: SessionId,
        event: EngineEvent,
    },
    Pointer(PointerInput),
    Key(KeyInput),
    Intent(Intent),
    /// Document fullscreen state changed
    FullscreenChanged(bool),
    HideTimerFired(TimerId),
    Unmount,
}
