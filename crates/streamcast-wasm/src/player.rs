//! Exported player
//!
//! DOM, hls.js and timer callbacks all post into one queue. Whoever finds the
//! controller free drains it, so a callback fired while another event is
//! being handled never re-enters the controller.

use crate::element::describe;
use crate::host::{BrowserHost, BrowserScheduler};
use crate::listener::EventListener;
use js_sys::Function;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use streamcast_core::{
    resolve_stream_param, DispatchOutcome, Intent, KeyInput, MediaEvent, PlaybackController,
    PlaybackRate, PlayerConfig, PlayerEvent, PlayerSnapshot, PointerInput, SettingsView,
    StreamSource,
};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, HtmlVideoElement, KeyboardEvent, MouseEvent};

type Controller = PlaybackController<BrowserHost, BrowserScheduler>;

pub(crate) struct Inbox {
    controller: RefCell<Controller>,
    queue: RefCell<VecDeque<PlayerEvent>>,
    subscriber: RefCell<Option<Function>>,
}

impl Inbox {
    fn post(&self, event: PlayerEvent) {
        self.queue.borrow_mut().push_back(event);
        self.drain();
    }

    /// Dispatch queued events unless a dispatch is already running up the stack
    fn drain(&self) {
        loop {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                return;
            };
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                return;
            };
            controller.dispatch(event);
            let snapshot = controller.snapshot();
            drop(controller);
            self.publish(&snapshot);
        }
    }

    /// Dispatch synchronously when nothing is pending, so the caller gets the
    /// outcome while its DOM event is still cancelable
    fn dispatch_now(&self, event: PlayerEvent) -> Option<DispatchOutcome> {
        if self.queue.borrow().is_empty() {
            if let Ok(mut controller) = self.controller.try_borrow_mut() {
                let outcome = controller.dispatch(event);
                let snapshot = controller.snapshot();
                drop(controller);
                self.publish(&snapshot);
                self.drain();
                return Some(outcome);
            }
        }
        self.post(event);
        None
    }

    /// Run a direct call on the controller and publish the result
    fn with_controller<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        let mut controller = self.controller.try_borrow_mut().ok()?;
        let result = f(&mut controller);
        let snapshot = controller.snapshot();
        drop(controller);
        self.publish(&snapshot);
        self.drain();
        Some(result)
    }

    fn snapshot(&self) -> Option<PlayerSnapshot> {
        self.controller.try_borrow().ok().map(|c| c.snapshot())
    }

    fn publish(&self, snapshot: &PlayerSnapshot) {
        let Some(callback) = self.subscriber.borrow().clone() else {
            return;
        };
        match serde_wasm_bindgen::to_value(snapshot) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    warn!(error = %describe(&e), "Snapshot subscriber threw");
                }
            }
            Err(e) => warn!(error = %e, "Snapshot serialization failed"),
        }
    }
}

/// Weak handle callbacks use to reach the inbox
#[derive(Clone)]
pub struct EventSink(Weak<Inbox>);

impl EventSink {
    pub fn post(&self, event: PlayerEvent) {
        match self.0.upgrade() {
            Some(inbox) => inbox.post(event),
            None => debug!("Event after player was freed dropped"),
        }
    }

    fn dispatch_now(&self, event: PlayerEvent) -> Option<DispatchOutcome> {
        self.0.upgrade().and_then(|inbox| inbox.dispatch_now(event))
    }
}

/// Click position relative to the video's left edge, and its width
fn click_geometry(video: &HtmlVideoElement, event: &Event) -> Option<(f64, f64)> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    let rect = video.get_bounding_client_rect();
    Some((f64::from(mouse.client_x()) - rect.left(), rect.width()))
}

/// Focus is on an input, textarea or content-editable element
fn editable_target(event: &Event) -> bool {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    if matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA") {
        return true;
    }
    element
        .dyn_ref::<HtmlElement>()
        .map(|e| e.is_content_editable())
        .unwrap_or(false)
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Player bound to one `<video>` element and its container
#[wasm_bindgen]
pub struct StreamCastPlayer {
    inbox: Rc<Inbox>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl StreamCastPlayer {
    /// Create a player. `config` is a partial `PlayerConfig` object or undefined.
    #[wasm_bindgen(constructor)]
    pub fn new(
        video: HtmlVideoElement,
        container: HtmlElement,
        config: JsValue,
    ) -> Result<StreamCastPlayer, JsValue> {
        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        config.validate().map_err(js_error)?;

        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;

        let inbox = Rc::new_cyclic(|weak: &Weak<Inbox>| {
            let host = BrowserHost::new(
                video.clone(),
                container.clone(),
                window.clone(),
                document.clone(),
                EventSink(weak.clone()),
            );
            let scheduler = BrowserScheduler::new(window.clone(), EventSink(weak.clone()));
            Inbox {
                controller: RefCell::new(PlaybackController::new(host, scheduler, config)),
                queue: RefCell::new(VecDeque::new()),
                subscriber: RefCell::new(None),
            }
        });

        let sink = EventSink(Rc::downgrade(&inbox));
        let listeners = Self::listen(&video, &container, &document, &sink)?;
        info!("StreamCast player created");

        Ok(Self { inbox, listeners })
    }

    fn listen(
        video: &HtmlVideoElement,
        container: &HtmlElement,
        document: &Document,
        sink: &EventSink,
    ) -> Result<Vec<EventListener>, JsValue> {
        let mut listeners = Vec::new();

        for event in MediaEvent::ALL {
            let sink = sink.clone();
            listeners.push(EventListener::new(video, event.dom_name(), move |_| {
                sink.post(PlayerEvent::Media(event))
            })?);
        }

        let s = sink.clone();
        listeners.push(EventListener::new(container, "mousemove", move |_| {
            s.post(PlayerEvent::Pointer(PointerInput::Move))
        })?);

        let s = sink.clone();
        listeners.push(EventListener::new(container, "mouseleave", move |_| {
            s.post(PlayerEvent::Pointer(PointerInput::Leave))
        })?);

        let (s, v) = (sink.clone(), video.clone());
        listeners.push(EventListener::new(video, "click", move |event| {
            if let Some((x, width)) = click_geometry(&v, &event) {
                s.post(PlayerEvent::Pointer(PointerInput::Click { x, width }));
            }
        })?);

        let (s, v) = (sink.clone(), video.clone());
        listeners.push(EventListener::new(video, "dblclick", move |event| {
            if let Some((x, width)) = click_geometry(&v, &event) {
                s.post(PlayerEvent::Pointer(PointerInput::DoubleClick { x, width }));
            }
        })?);

        let s = sink.clone();
        listeners.push(EventListener::new(document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
                return;
            };
            let input = KeyInput {
                key,
                editable_target: editable_target(&event),
            };
            if let Some(outcome) = s.dispatch_now(PlayerEvent::Key(input)) {
                if outcome.prevent_default {
                    event.prevent_default();
                }
            }
        })?);

        let (s, d) = (sink.clone(), document.clone());
        listeners.push(EventListener::new(document, "fullscreenchange", move |_| {
            s.post(PlayerEvent::FullscreenChanged(d.fullscreen_element().is_some()))
        })?);

        Ok(listeners)
    }

    /// Resolve the page's `liveurl` value and start playback.
    ///
    /// Returns the resolved source (`{kind: "adaptive" | "embed", ...}`) or
    /// null when resolution failed; failures surface through the snapshot.
    /// Embeds are left to the page.
    pub fn mount(&self, stream_param: Option<String>) -> Result<JsValue, JsValue> {
        let source = resolve_stream_param(stream_param.as_deref());

        let locator = match &source {
            Ok(StreamSource::Adaptive { locator }) => Ok(locator.clone()),
            Ok(StreamSource::Embed { video_id }) => {
                debug!(video_id = %video_id, "Embed source, player stays idle");
                return serde_wasm_bindgen::to_value(&source.as_ref().ok()).map_err(js_error);
            }
            Err(e) => Err(e.clone()),
        };

        self.inbox
            .with_controller(|c| c.mount(locator))
            .ok_or_else(|| js_error("player is busy"))?;
        serde_wasm_bindgen::to_value(&source.as_ref().ok()).map_err(js_error)
    }

    /// Bind a locator directly, replacing the current session
    pub fn load(&self, locator: &str) -> Result<(), JsValue> {
        let locator = streamcast_core::StreamLocator::parse(locator).map_err(js_error)?;
        self.post(PlayerEvent::Load(locator));
        Ok(())
    }

    /// Call `callback(snapshot)` after every handled event
    pub fn subscribe(&self, callback: Function) {
        *self.inbox.subscriber.borrow_mut() = Some(callback);
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self
            .inbox
            .snapshot()
            .ok_or_else(|| js_error("player is busy"))?;
        serde_wasm_bindgen::to_value(&snapshot).map_err(js_error)
    }

    /// Send an intent in its serialized form, e.g. `{type: "seek", value: 30}`
    pub fn intent(&self, intent: JsValue) -> Result<(), JsValue> {
        let intent: Intent = serde_wasm_bindgen::from_value(intent).map_err(js_error)?;
        self.post(PlayerEvent::Intent(intent));
        Ok(())
    }

    fn post(&self, event: PlayerEvent) {
        self.inbox.post(event);
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.post(PlayerEvent::Intent(Intent::TogglePlay));
    }

    pub fn seek(&self, seconds: f64) {
        self.post(PlayerEvent::Intent(Intent::Seek(seconds)));
    }

    #[wasm_bindgen(js_name = skipForward)]
    pub fn skip_forward(&self) {
        self.post(PlayerEvent::Intent(Intent::SkipForward));
    }

    #[wasm_bindgen(js_name = skipBackward)]
    pub fn skip_backward(&self) {
        self.post(PlayerEvent::Intent(Intent::SkipBackward));
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.post(PlayerEvent::Intent(Intent::SetVolume(volume)));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.post(PlayerEvent::Intent(Intent::ToggleMute));
    }

    /// Only rates offered in the speed menu are accepted
    #[wasm_bindgen(js_name = setRate)]
    pub fn set_rate(&self, rate: f64) -> Result<(), JsValue> {
        let rate = PlaybackRate::from_rate(rate)
            .ok_or_else(|| js_error(format!("unsupported playback rate {}", rate)))?;
        self.post(PlayerEvent::Intent(Intent::SetRate(rate)));
        Ok(())
    }

    #[wasm_bindgen(js_name = selectQuality)]
    pub fn select_quality(&self, label: String) {
        self.post(PlayerEvent::Intent(Intent::SelectQuality(label)));
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.post(PlayerEvent::Intent(Intent::ToggleFullscreen));
    }

    #[wasm_bindgen(js_name = openSettings)]
    pub fn open_settings(&self) {
        self.post(PlayerEvent::Intent(Intent::OpenSettings));
    }

    #[wasm_bindgen(js_name = closeSettings)]
    pub fn close_settings(&self) {
        self.post(PlayerEvent::Intent(Intent::CloseSettings));
    }

    /// `"main"`, `"quality"` or `"speed"`
    #[wasm_bindgen(js_name = showSettingsView)]
    pub fn show_settings_view(&self, view: &str) -> Result<(), JsValue> {
        let view = match view {
            "main" => SettingsView::Main,
            "quality" => SettingsView::Quality,
            "speed" => SettingsView::Speed,
            other => return Err(js_error(format!("unknown settings view {}", other))),
        };
        self.post(PlayerEvent::Intent(Intent::ShowSettingsView(view)));
        Ok(())
    }

    /// Tear down the session and detach every listener
    pub fn destroy(&mut self) {
        self.listeners.clear();
        *self.inbox.subscriber.borrow_mut() = None;
        self.post(PlayerEvent::Unmount);
        info!("StreamCast player destroyed");
    }
}
