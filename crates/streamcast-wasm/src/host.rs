//! Browser host and `setTimeout` scheduler

use crate::element::{describe, VideoSurface};
use crate::hls::HlsEngine;
use crate::player::EventSink;
use js_sys::{Function, Promise, Reflect};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use streamcast_core::{
    EngineConfig, Error, PlayerEvent, PlayerHost, Result, Scheduler, SessionId, TimerId,
};
use tracing::{debug, error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, HtmlVideoElement, OrientationLockType, ScreenOrientation, Window};

/// Video element, fullscreen container and document of one player
pub struct BrowserHost {
    surface: VideoSurface,
    container: HtmlElement,
    window: Window,
    document: Document,
    sink: EventSink,
    /// Promise of the last `requestFullscreen()`, consumed by the orientation lock
    pending_fullscreen: Option<Promise>,
}

impl BrowserHost {
    pub fn new(
        video: HtmlVideoElement,
        container: HtmlElement,
        window: Window,
        document: Document,
        sink: EventSink,
    ) -> Self {
        Self {
            surface: VideoSurface::new(video),
            container,
            window,
            document,
            sink,
            pending_fullscreen: None,
        }
    }

    fn orientation(&self) -> Result<ScreenOrientation> {
        self.window
            .screen()
            .map(|screen| screen.orientation())
            .map_err(|e| Error::Orientation(describe(&e)))
    }
}

impl PlayerHost for BrowserHost {
    type Element = VideoSurface;
    type Engine = HlsEngine;

    fn element(&self) -> &VideoSurface {
        &self.surface
    }

    fn element_mut(&mut self) -> &mut VideoSurface {
        &mut self.surface
    }

    fn engine_supported(&self) -> bool {
        HlsEngine::supported()
    }

    fn create_engine(&mut self, config: &EngineConfig, session: SessionId) -> Result<HlsEngine> {
        HlsEngine::create(config, session, self.sink.clone())
    }

    fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        // Called through Reflect to keep the promise web-sys drops
        let request = Reflect::get(&self.container, &JsValue::from_str("requestFullscreen"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| Error::Fullscreen("requestFullscreen is not available".into()))?;

        let result = request
            .call0(&self.container)
            .map_err(|e| Error::Fullscreen(describe(&e)))?;
        self.pending_fullscreen = result.dyn_into::<Promise>().ok();
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.pending_fullscreen = None;
        self.document.exit_fullscreen();
        Ok(())
    }

    /// Locks once fullscreen has actually been entered
    fn lock_landscape(&mut self) -> Result<()> {
        let orientation = self.orientation()?;
        let pending = self.pending_fullscreen.take();

        wasm_bindgen_futures::spawn_local(async move {
            if let Some(pending) = pending {
                if let Err(e) = JsFuture::from(pending).await {
                    error!(error = %describe(&e), "Error attempting to enable full-screen mode");
                    return;
                }
            }
            match orientation.lock(OrientationLockType::Landscape) {
                Ok(locked) => {
                    if let Err(e) = JsFuture::from(locked).await {
                        warn!(error = %describe(&e), "Could not lock to landscape orientation");
                    }
                }
                Err(e) => warn!(error = %describe(&e), "Could not lock to landscape orientation"),
            }
        });
        Ok(())
    }

    fn unlock_orientation(&mut self) -> Result<()> {
        self.orientation()?
            .unlock()
            .map_err(|e| Error::Orientation(describe(&e)))
    }
}

type TimerHandles = Rc<RefCell<HashMap<TimerId, i32>>>;

/// [`Scheduler`] on `window.setTimeout`, one shared callback for every timer
pub struct BrowserScheduler {
    window: Window,
    next_id: u64,
    handles: TimerHandles,
    on_timeout: Closure<dyn FnMut(JsValue)>,
}

impl BrowserScheduler {
    pub fn new(window: Window, sink: EventSink) -> Self {
        let handles: TimerHandles = Rc::new(RefCell::new(HashMap::new()));

        let fired = handles.clone();
        let on_timeout = Closure::<dyn FnMut(JsValue)>::new(move |id: JsValue| {
            let Some(raw) = id.as_f64() else {
                return;
            };
            let id = TimerId(raw as u64);
            fired.borrow_mut().remove(&id);
            sink.post(PlayerEvent::HideTimerFired(id));
        });

        Self {
            window,
            next_id: 0,
            handles,
            on_timeout,
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        match self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
            self.on_timeout.as_ref().unchecked_ref(),
            millis,
            &JsValue::from_f64(id.0 as f64),
        ) {
            Ok(handle) => {
                self.handles.borrow_mut().insert(id, handle);
            }
            Err(e) => warn!(error = %describe(&e), "setTimeout failed, controls stay visible"),
        }
        debug!(timer = %id, millis, "Hide timer scheduled");
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let handle = self.handles.borrow_mut().remove(&id);
        if let Some(handle) = handle {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.handles.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
