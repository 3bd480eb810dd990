//! `<video>` element as a [`MediaElement`]

use streamcast_core::{Error, MediaElement, Result};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlMediaElement, HtmlVideoElement};

/// MIME type browsers report for native HLS support
const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// Best-effort text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}

/// Wraps the page's video element
pub struct VideoSurface {
    video: HtmlVideoElement,
}

impl VideoSurface {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    /// The element as hls.js expects it in `attachMedia`
    pub fn media(&self) -> &HtmlMediaElement {
        &self.video
    }
}

impl MediaElement for VideoSurface {
    fn paused(&self) -> bool {
        self.video.paused()
    }

    fn ended(&self) -> bool {
        self.video.ended()
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn volume(&self) -> f64 {
        self.video.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn muted(&self) -> bool {
        self.video.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn playback_rate(&self) -> f64 {
        self.video.playback_rate()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.video.set_playback_rate(rate);
    }

    /// Autoplay rejections arrive later through the returned promise and are
    /// only logged
    fn play(&mut self) -> Result<()> {
        let promise = self
            .video
            .play()
            .map_err(|e| Error::PlayRejected(describe(&e)))?;

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!(error = %describe(&e), "Play request rejected");
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(e) = self.video.pause() {
            warn!(error = %describe(&e), "Pause failed");
        }
    }

    fn set_src(&mut self, src: &str) {
        self.video.set_src(src);
    }

    fn clear_src(&mut self) {
        if self.video.has_attribute("src") {
            let _ = self.video.remove_attribute("src");
            self.video.load();
        }
    }

    fn load(&mut self) {
        self.video.load();
    }

    fn can_play_native_hls(&self) -> bool {
        !self.video.can_play_type(HLS_MIME).is_empty()
    }
}
