//! StreamCast WASM - Browser bindings for the StreamCast player
//!
//! Runs the playback controller from `streamcast-core` against the page:
//! - hls.js as the adaptive engine (native HLS when hls.js is unavailable)
//! - The `<video>` element, fullscreen and screen orientation via web-sys
//! - `setTimeout` for the control overlay's hide timer
//! - Snapshots pushed to a JS callback after every handled event
//!
//! ## Usage
//!
//! ```javascript
//! import init, { StreamCastPlayer, cleanLocation } from '@streamcast/wasm';
//!
//! await init();
//! const param = new URLSearchParams(location.search).get('liveurl');
//! cleanLocation();
//!
//! const player = new StreamCastPlayer(video, container, { skip_seconds: 5 });
//! player.subscribe(snapshot => render(snapshot));
//! const source = player.mount(param);
//! if (source?.kind === 'embed') showEmbed(embedUrl(param));
//! ```

use streamcast_core::{resolve_stream_param, source, StreamSource};
use tracing::info;
use wasm_bindgen::prelude::*;

mod element;
mod hls;
mod host;
mod listener;
mod player;

pub use player::StreamCastPlayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    info!(version = streamcast_core::VERSION, "StreamCast WASM initialized");
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `MM:SS`, or `HH:MM:SS` from one hour on
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    streamcast_core::format_time(seconds)
}

/// Embed frame URL when the `liveurl` value is a YouTube link
#[wasm_bindgen(js_name = embedUrl)]
pub fn embed_url(stream_param: Option<String>) -> Option<String> {
    match resolve_stream_param(stream_param.as_deref()) {
        Ok(embed @ StreamSource::Embed { .. }) => embed.embed_url(),
        _ => None,
    }
}

/// Drop query and fragment from the address bar without reloading
#[wasm_bindgen(js_name = cleanLocation)]
pub fn clean_location() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let href = window.location().href()?;
    let page = url::Url::parse(&href).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let clean = source::clean_location(&page);
    if clean != page {
        window
            .history()?
            .replace_state_with_url(&JsValue::NULL, "", Some(clean.as_str()))?;
    }
    Ok(())
}
