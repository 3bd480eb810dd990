//! Player configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning handed to the adaptive engine when a session is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Segments kept ahead of the playhead behind the live edge
    pub live_sync_segments: u32,
    /// Drift, in segments, tolerated before jumping back to the live edge
    pub live_max_latency_segments: u32,
    /// Report an unbounded duration for live manifests
    pub live_duration_infinity: bool,
}

impl EngineConfig {
    /// Low-latency live tuning
    pub fn low_latency() -> Self {
        Self {
            live_sync_segments: 3,
            live_max_latency_segments: 5,
            live_duration_infinity: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::low_latency()
    }
}

/// Behaviour of a double click on the middle third of the video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleClickCenter {
    /// Ignore the gesture
    Inert,
    /// Toggle fullscreen
    ToggleFullscreen,
}

impl Default for DoubleClickCenter {
    fn default() -> Self {
        DoubleClickCenter::Inert
    }
}

/// One rung of the quality menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVariant {
    /// Label shown in the menu and used to track the active variant
    pub label: String,
    /// Replacement for `_<N>.m3u8`; `None` marks the supplied (highest) variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_suffix: Option<String>,
}

impl QualityVariant {
    pub fn highest(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file_suffix: None,
        }
    }

    pub fn with_suffix(label: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file_suffix: Some(suffix.into()),
        }
    }
}

/// Default ladder: the supplied stream plus two derived renditions
pub fn default_quality_ladder() -> Vec<QualityVariant> {
    vec![
        QualityVariant::highest("720p"),
        QualityVariant::with_suffix("360p", "_2.m3u8"),
        QualityVariant::with_suffix("240p", "_1.m3u8"),
    ]
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Idle time before the control overlay hides (milliseconds)
    pub hide_controls_after_ms: u64,
    /// Relative skip for arrows and double clicks (seconds)
    pub skip_seconds: f64,
    /// Volume change per arrow key press
    pub volume_step: f64,
    /// Volume restored when unmuting from silence
    pub unmute_volume: f64,
    /// Double click on the middle third
    pub double_click_center: DoubleClickCenter,
    /// Adaptive engine tuning
    pub engine: EngineConfig,
    /// Quality menu, highest first
    pub quality_ladder: Vec<QualityVariant>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::low_latency()
    }
}

impl PlayerConfig {
    /// Configuration for live classes
    pub fn low_latency() -> Self {
        Self {
            hide_controls_after_ms: 3000,
            skip_seconds: 5.0,
            volume_step: 0.1,
            unmute_volume: 0.5,
            double_click_center: DoubleClickCenter::Inert,
            engine: EngineConfig::low_latency(),
            quality_ladder: default_quality_ladder(),
        }
    }

    /// Configuration for recorded content
    pub fn vod() -> Self {
        Self {
            double_click_center: DoubleClickCenter::ToggleFullscreen,
            engine: EngineConfig {
                live_duration_infinity: false,
                ..EngineConfig::low_latency()
            },
            ..Self::low_latency()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Hide delay as a [`Duration`]
    pub fn hide_controls_after(&self) -> Duration {
        Duration::from_millis(self.hide_controls_after_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hide_controls_after_ms == 0 {
            return Err(Error::InvalidConfig(
                "hide_controls_after_ms must be positive".into(),
            ));
        }
        if !(self.skip_seconds > 0.0) {
            return Err(Error::InvalidConfig("skip_seconds must be positive".into()));
        }
        if !(self.volume_step > 0.0 && self.volume_step <= 1.0) {
            return Err(Error::InvalidConfig("volume_step must be in (0, 1]".into()));
        }
        if !(self.unmute_volume > 0.0 && self.unmute_volume <= 1.0) {
            return Err(Error::InvalidConfig("unmute_volume must be in (0, 1]".into()));
        }
        match self.quality_ladder.first() {
            Some(first) if first.file_suffix.is_none() => {}
            _ => {
                return Err(Error::InvalidConfig(
                    "quality_ladder must start with the supplied variant".into(),
                ))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.hide_controls_after(), Duration::from_secs(3));
        assert_eq!(config.skip_seconds, 5.0);
        assert_eq!(config.unmute_volume, 0.5);
        assert_eq!(config.engine.live_sync_segments, 3);
        assert_eq!(config.engine.live_max_latency_segments, 5);
        assert!(config.engine.live_duration_infinity);
        assert_eq!(config.double_click_center, DoubleClickCenter::Inert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PlayerConfig::from_json(r#"{ "double_click_center": "toggle_fullscreen" }"#)
            .unwrap();
        assert_eq!(config.double_click_center, DoubleClickCenter::ToggleFullscreen);
        assert_eq!(config.quality_ladder.len(), 3);
    }

    #[test]
    fn test_json_reloads_to_same_config() {
        let json = PlayerConfig::vod().to_json().unwrap();
        assert!(json.contains("\"double_click_center\": \"toggle_fullscreen\""));
        assert_eq!(PlayerConfig::from_json(&json).unwrap(), PlayerConfig::vod());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(PlayerConfig::from_json(r#"{ "volume_step": 0 }"#).is_err());
        assert!(PlayerConfig::from_json(r#"{ "quality_ladder": [] }"#).is_err());
        assert!(PlayerConfig::from_json("not json").is_err());
    }
}
