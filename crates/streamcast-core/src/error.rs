//! Error types for StreamCast Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
///
/// The first block is the user-facing taxonomy surfaced in
/// [`PlayerSnapshot::error`](crate::PlayerSnapshot). The second block covers
/// failures of best-effort host calls; those are logged and never shown.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Session errors
    #[error("Stream not started")]
    StreamNotStarted,

    #[error("Invalid stream locator: {0}")]
    InvalidLocator(String),

    #[error("Adaptive playback not supported in this environment")]
    UnsupportedPlayback,

    #[error("Fatal network error: {0}")]
    FatalNetwork(String),

    #[error("Fatal media error: {0}")]
    FatalMedia(String),

    #[error("Unrecoverable playback error: {0}")]
    FatalOther(String),

    // Host errors
    #[error("Media element call failed: {0}")]
    Element(String),

    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    #[error("Fullscreen request failed: {0}")]
    Fullscreen(String),

    #[error("Orientation lock failed: {0}")]
    Orientation(String),

    #[error("Engine call failed: {0}")]
    Engine(String),

    #[error("Player runtime stopped")]
    RuntimeStopped,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true if this error ends the playback session and is surfaced
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Error::StreamNotStarted
                | Error::InvalidLocator(_)
                | Error::UnsupportedPlayback
                | Error::FatalNetwork(_)
                | Error::FatalMedia(_)
                | Error::FatalOther(_)
        )
    }

    /// Message shown by the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            Error::StreamNotStarted => "The live class is not started yet.".to_string(),
            Error::InvalidLocator(reason) => reason.clone(),
            Error::UnsupportedPlayback => "HLS is not supported in this browser.".to_string(),
            Error::FatalNetwork(details) => format!("Network error: {}", details),
            Error::FatalMedia(details) => format!("Media error: {}", details),
            Error::FatalOther(_) => "An unrecoverable error occurred.".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns the error code used in logs and by the bindings
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::StreamNotStarted => "STREAM_NOT_STARTED",
            Error::InvalidLocator(_) => "INVALID_LOCATOR",
            Error::UnsupportedPlayback => "UNSUPPORTED_PLAYBACK",
            Error::FatalNetwork(_) => "FATAL_NETWORK",
            Error::FatalMedia(_) => "FATAL_MEDIA",
            Error::FatalOther(_) => "FATAL_OTHER",
            Error::Element(_) => "ELEMENT",
            Error::PlayRejected(_) => "PLAY_REJECTED",
            Error::Fullscreen(_) => "FULLSCREEN",
            Error::Orientation(_) => "ORIENTATION",
            Error::Engine(_) => "ENGINE",
            Error::RuntimeStopped => "RUNTIME_STOPPED",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
