//! hls.js binding
//!
//! The page loads hls.js as a global script; nothing here bundles it.

use crate::element::{describe, VideoSurface};
use crate::player::EventSink;
use serde::{Deserialize, Serialize};
use streamcast_core::{
    AdaptiveEngine, EngineConfig, EngineError, EngineErrorKind, EngineEvent, Error, PlayerEvent,
    SessionId, StreamLocator,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

/// `Hls.Events.MANIFEST_PARSED`
const MANIFEST_PARSED: &str = "hlsManifestParsed";
/// `Hls.Events.ERROR`
const ERROR: &str = "hlsError";

#[wasm_bindgen]
extern "C" {
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported() -> Result<bool, JsValue>;

    #[wasm_bindgen(constructor, catch)]
    fn new(config: &JsValue) -> Result<Hls, JsValue>;

    #[wasm_bindgen(method, js_name = loadSource, catch)]
    fn load_source(this: &Hls, src: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = attachMedia, catch)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);
}

/// Constructor options, in hls.js naming
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HlsOptions {
    live_sync_duration_count: u32,
    live_max_latency_duration_count: u32,
    live_duration_infinity: bool,
}

impl From<&EngineConfig> for HlsOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            live_sync_duration_count: config.live_sync_segments,
            live_max_latency_duration_count: config.live_max_latency_segments,
            live_duration_infinity: config.live_duration_infinity,
        }
    }
}

#[derive(Deserialize)]
struct ManifestParsedData {
    #[serde(default)]
    levels: Vec<LevelData>,
}

#[derive(Deserialize)]
struct LevelData {
    #[serde(default)]
    details: Option<LevelDetails>,
}

#[derive(Deserialize)]
struct LevelDetails {
    #[serde(default)]
    live: bool,
}

#[derive(Deserialize)]
struct ErrorData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    fatal: bool,
}

impl From<ErrorData> for EngineError {
    fn from(data: ErrorData) -> Self {
        let kind = match data.kind.as_str() {
            "networkError" => EngineErrorKind::Network,
            "mediaError" => EngineErrorKind::Media,
            _ => EngineErrorKind::Other,
        };
        EngineError::new(kind, data.details, data.fatal)
    }
}

/// Live when the first level's details say so
fn manifest_is_live(data: JsValue) -> bool {
    serde_wasm_bindgen::from_value::<ManifestParsedData>(data)
        .ok()
        .and_then(|parsed| parsed.levels.into_iter().next())
        .and_then(|level| level.details)
        .map(|details| details.live)
        .unwrap_or(false)
}

type HlsCallback = Closure<dyn FnMut(JsValue, JsValue)>;

/// One hls.js instance, with its event callbacks kept alive alongside it
pub struct HlsEngine {
    hls: Hls,
    _on_parsed: HlsCallback,
    _on_error: HlsCallback,
}

impl HlsEngine {
    /// `Hls.isSupported()`, false when hls.js isn't loaded at all
    pub fn supported() -> bool {
        Hls::is_supported().unwrap_or(false)
    }

    /// Construct hls.js and route its events, tagged with `session`, into `sink`
    pub fn create(
        config: &EngineConfig,
        session: SessionId,
        sink: EventSink,
    ) -> streamcast_core::Result<Self> {
        let options = serde_wasm_bindgen::to_value(&HlsOptions::from(config))
            .map_err(|e| Error::Engine(e.to_string()))?;
        let hls = Hls::new(&options).map_err(|e| Error::Engine(describe(&e)))?;

        let parsed_sink = sink.clone();
        let on_parsed = HlsCallback::new(move |_event: JsValue, data: JsValue| {
            let live = manifest_is_live(data);
            parsed_sink.post(PlayerEvent::Engine {
                session,
                event: EngineEvent::ManifestParsed { live },
            });
        });

        let on_error = HlsCallback::new(move |_event: JsValue, data: JsValue| {
            match serde_wasm_bindgen::from_value::<ErrorData>(data) {
                Ok(data) => sink.post(PlayerEvent::Engine {
                    session,
                    event: EngineEvent::Error(data.into()),
                }),
                Err(e) => warn!(error = %e, "Unreadable hls.js error payload"),
            }
        });

        hls.on(MANIFEST_PARSED, on_parsed.as_ref().unchecked_ref());
        hls.on(ERROR, on_error.as_ref().unchecked_ref());
        debug!(session = %session, "hls.js instance created");

        Ok(Self {
            hls,
            _on_parsed: on_parsed,
            _on_error: on_error,
        })
    }
}

impl AdaptiveEngine<VideoSurface> for HlsEngine {
    fn load_source(&mut self, locator: &StreamLocator) -> streamcast_core::Result<()> {
        self.hls
            .load_source(locator.as_str())
            .map_err(|e| Error::Engine(describe(&e)))
    }

    fn attach_media(&mut self, element: &mut VideoSurface) -> streamcast_core::Result<()> {
        self.hls
            .attach_media(element.media())
            .map_err(|e| Error::Engine(describe(&e)))
    }

    fn destroy(&mut self) {
        self.hls.destroy();
    }
}
