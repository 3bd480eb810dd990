//! Seams between the controller and its environment
//!
//! The controller never touches a browser API directly. A host supplies the
//! media element, constructs adaptive engines, and performs fullscreen and
//! orientation calls; a scheduler provides the hide-controls timer.

use crate::{config::EngineConfig, types::*, Result};
use std::time::Duration;

/// Command and read surface of a media element
pub trait MediaElement {
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);

    /// `f64::INFINITY` for live, `NaN` before metadata
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    /// Request playback; rejection (autoplay policy) is reported as an error
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);

    fn set_src(&mut self, src: &str);
    fn clear_src(&mut self);
    fn load(&mut self);

    /// Element can play HLS manifests without an engine
    fn can_play_native_hls(&self) -> bool;
}

/// An adaptive-bitrate engine instance bound to one element of type `E`
pub trait AdaptiveEngine<E: MediaElement> {
    fn load_source(&mut self, locator: &StreamLocator) -> Result<()>;
    fn attach_media(&mut self, element: &mut E) -> Result<()>;
    /// Release buffers, network activity and listeners
    fn destroy(&mut self);
}

/// Environment the controller runs in
pub trait PlayerHost {
    type Element: MediaElement;
    type Engine: AdaptiveEngine<Self::Element>;

    fn element(&self) -> &Self::Element;
    fn element_mut(&mut self) -> &mut Self::Element;

    /// Whether an adaptive engine can run here
    fn engine_supported(&self) -> bool;

    /// Build an engine whose events will be tagged with `session`
    fn create_engine(&mut self, config: &EngineConfig, session: SessionId) -> Result<Self::Engine>;

    /// Whether the document currently has a fullscreen element
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&mut self) -> Result<()>;
    fn exit_fullscreen(&mut self) -> Result<()>;

    fn lock_landscape(&mut self) -> Result<()>;
    fn unlock_orientation(&mut self) -> Result<()>;
}

/// One-shot timers. Expiry is reported back as
/// [`PlayerEvent::HideTimerFired`](crate::PlayerEvent) with the returned id.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}
