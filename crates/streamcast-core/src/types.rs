//! Core types for StreamCast

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Unique identifier for an engine session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a timer started through a [`Scheduler`](crate::Scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A validated manifest URL.
///
/// The raw text is kept exactly as supplied so signed query parameters
/// survive variant rewrites untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StreamLocator(String);

impl StreamLocator {
    /// Validate an absolute http(s) URL
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|_| Error::InvalidLocator("Invalid HLS stream URL format.".to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(Self(raw.to_string())),
            _ => Err(Error::InvalidLocator("Invalid HLS stream URL format.".to_string())),
        }
    }

    /// Locator built by rewriting an already validated one
    pub(crate) fn derived(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StreamLocator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for StreamLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Playback rates offered in the speed menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackRate {
    ThreeQuarters,
    Normal,
    OneAndHalf,
    Double,
    Triple,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 5] = [
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
        PlaybackRate::Triple,
    ];

    pub fn rate(&self) -> f64 {
        match self {
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
            PlaybackRate::Triple => 3.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaybackRate::ThreeQuarters => "0.75x",
            PlaybackRate::Normal => "Normal",
            PlaybackRate::OneAndHalf => "1.5x",
            PlaybackRate::Double => "2.0x",
            PlaybackRate::Triple => "3.0x",
        }
    }

    /// Exact match against the element's reported rate
    pub fn from_rate(rate: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.rate() == rate)
    }

    /// Label for an arbitrary element rate, "Normal" when off the menu
    pub fn label_for(rate: f64) -> &'static str {
        Self::from_rate(rate).unwrap_or(PlaybackRate::Normal).label()
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        PlaybackRate::Normal
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mirror of the media element's transport state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Element volume in `[0, 1]`
    pub volume: f64,
    pub is_muted: bool,
    /// Seconds, never negative
    pub current_time: f64,
    /// Seconds; `f64::INFINITY` for live streams
    pub duration: f64,
    pub playback_rate: f64,
    pub is_fullscreen: bool,
    pub is_buffering: bool,
}

impl PlaybackState {
    /// Live streams report an unbounded duration
    pub fn is_live(&self) -> bool {
        self.duration == f64::INFINITY
    }

    /// Seeking and skipping are only available on bounded timelines
    pub fn can_seek(&self) -> bool {
        !self.is_live()
    }

    /// Clamp a target position into `[0, duration]`
    pub fn clamp_time(&self, target: f64) -> f64 {
        target.max(0.0).min(self.duration.max(0.0))
    }

    /// Fraction for the progress bar; `None` while live or unknown
    pub fn progress(&self) -> Option<f64> {
        if self.is_live() || self.duration <= 0.0 {
            return None;
        }
        Some((self.current_time / self.duration).clamp(0.0, 1.0))
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            volume: 1.0,
            is_muted: false,
            current_time: 0.0,
            duration: 0.0,
            playback_rate: 1.0,
            is_fullscreen: false,
            is_buffering: false,
        }
    }
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour on
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_preserves_raw_text() {
        let raw = "https://cdn.example.com/live/index_4.m3u8?sig=a%2Fb&exp=1";
        let locator = StreamLocator::parse(raw).unwrap();
        assert_eq!(locator.as_str(), raw);
    }

    #[test]
    fn test_locator_rejects_relative_and_foreign_schemes() {
        assert!(StreamLocator::parse("index_4.m3u8").is_err());
        assert!(StreamLocator::parse("ftp://cdn/index_4.m3u8").is_err());
    }

    #[test]
    fn test_rate_labels() {
        assert_eq!(PlaybackRate::label_for(1.0), "Normal");
        assert_eq!(PlaybackRate::label_for(0.75), "0.75x");
        assert_eq!(PlaybackRate::label_for(1.25), "Normal");
        assert_eq!(PlaybackRate::from_rate(3.0), Some(PlaybackRate::Triple));
    }

    #[test]
    fn test_live_disables_seek() {
        let state = PlaybackState {
            duration: f64::INFINITY,
            ..Default::default()
        };
        assert!(state.is_live());
        assert!(!state.can_seek());
        assert_eq!(state.progress(), None);
    }

    #[test]
    fn test_clamp_time() {
        let state = PlaybackState {
            duration: 60.0,
            ..Default::default()
        };
        assert_eq!(state.clamp_time(63.0), 60.0);
        assert_eq!(state.clamp_time(-2.0), 0.0);
        assert_eq!(state.clamp_time(30.0), 30.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.4), "01:05");
        assert_eq!(format_time(3725.0), "01:02:05");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(-3.0), "00:00");
    }
}
