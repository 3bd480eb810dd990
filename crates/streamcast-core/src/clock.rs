//! Media clock and transport commands
//!
//! `PlaybackState` follows the element's own events. Commands act on the
//! element and wait for its confirming event; only the playhead and the
//! buffering flag are updated ahead of time so the UI doesn't lag.

use crate::{
    event::MediaEvent,
    host::MediaElement,
    types::{PlaybackRate, PlaybackState},
};
use tracing::{debug, warn};

/// Mirrors element state and issues playback commands
#[derive(Debug, Clone, Default)]
pub struct MediaClock {
    state: PlaybackState,
}

/// Round to the 0.01 grid so repeated steps don't accumulate float noise
fn round_volume(volume: f64) -> f64 {
    ((volume * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

impl MediaClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Start over for a new session, keeping the element's audio settings
    pub fn reset<E: MediaElement>(&mut self, element: &E) {
        self.state = PlaybackState {
            volume: element.volume(),
            is_muted: element.muted(),
            playback_rate: element.playback_rate(),
            is_fullscreen: self.state.is_fullscreen,
            ..Default::default()
        };
    }

    pub fn set_buffering(&mut self, buffering: bool) {
        self.state.is_buffering = buffering;
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.state.is_fullscreen = fullscreen;
    }

    /// Mark the stream as live
    pub fn set_live(&mut self) {
        self.state.duration = f64::INFINITY;
    }

    /// Locally mirror a playhead move the element hasn't reported yet
    pub fn set_position(&mut self, seconds: f64) {
        self.state.current_time = seconds.max(0.0);
    }

    /// Mirror one element event into state
    pub fn apply<E: MediaElement>(&mut self, event: MediaEvent, element: &E) {
        match event {
            MediaEvent::Play => self.state.is_playing = true,
            MediaEvent::Pause => self.state.is_playing = false,
            MediaEvent::TimeUpdate => self.state.current_time = element.current_time().max(0.0),
            MediaEvent::LoadedMetadata => {
                if !self.state.is_live() {
                    let duration = element.duration();
                    self.state.duration = if duration.is_nan() { 0.0 } else { duration };
                }
            }
            MediaEvent::VolumeChange => {
                self.state.volume = element.volume();
                self.state.is_muted = element.muted();
            }
            MediaEvent::Waiting => self.state.is_buffering = true,
            MediaEvent::Playing | MediaEvent::CanPlay => self.state.is_buffering = false,
            MediaEvent::RateChange => self.state.playback_rate = element.playback_rate(),
            MediaEvent::Error => {}
        }
        debug!(event = event.dom_name(), "Media event mirrored");
    }

    /// Play when paused or ended, pause otherwise
    pub fn toggle_play<E: MediaElement>(&self, element: &mut E) {
        if element.paused() || element.ended() {
            if let Err(e) = element.play() {
                warn!(error = %e, "Play request rejected");
            }
        } else {
            element.pause();
        }
    }

    /// Jump to an absolute position. Returns false on live streams.
    pub fn seek<E: MediaElement>(&mut self, element: &mut E, seconds: f64) -> bool {
        if self.state.is_live() {
            debug!("Seek ignored on live stream");
            return false;
        }
        let target = self.state.clamp_time(seconds);
        element.set_current_time(target);
        self.state.current_time = target;
        true
    }

    /// Move the playhead by `delta` seconds. Returns false on live streams.
    pub fn skip<E: MediaElement>(&mut self, element: &mut E, delta: f64) -> bool {
        if self.state.is_live() {
            return false;
        }
        let target = self.state.clamp_time(element.current_time() + delta);
        element.set_current_time(target);
        self.state.current_time = target;
        true
    }

    pub fn set_volume<E: MediaElement>(&self, element: &mut E, volume: f64) {
        element.set_volume(volume.clamp(0.0, 1.0));
    }

    /// Flip mute; unmuting at zero volume restores `unmute_volume`
    pub fn toggle_mute<E: MediaElement>(&self, element: &mut E, unmute_volume: f64) {
        let muted = !element.muted();
        element.set_muted(muted);
        if !muted && element.volume() == 0.0 {
            element.set_volume(unmute_volume);
        }
    }

    /// Raise volume by `step`, unmuting first; from silence lands exactly on `step`
    pub fn volume_up<E: MediaElement>(&self, element: &mut E, step: f64) {
        if element.muted() {
            element.set_muted(false);
        }
        let current = element.volume();
        let mut next = current + step;
        if current == 0.0 && next <= step {
            next = step;
        }
        element.set_volume(round_volume(next.min(1.0)));
    }

    pub fn volume_down<E: MediaElement>(&self, element: &mut E, step: f64) {
        element.set_volume(round_volume((element.volume() - step).max(0.0)));
    }

    pub fn set_rate<E: MediaElement>(&self, element: &mut E, rate: PlaybackRate) {
        element.set_playback_rate(rate.rate());
    }
}
