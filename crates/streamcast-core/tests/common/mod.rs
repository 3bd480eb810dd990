//! Recording host and scheduler shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use streamcast_core::{
    AdaptiveEngine, EngineConfig, Error, MediaElement, PlaybackController, PlayerConfig,
    PlayerHost, Result, Scheduler, SessionId, StreamLocator, TimerId,
};

pub const LIVE_URL: &str = "https://cdn.example.com/live/index_4.m3u8?sig=abc";

pub fn locator(raw: &str) -> StreamLocator {
    StreamLocator::parse(raw).unwrap()
}

// =============================================================================
// Media element
// =============================================================================

#[derive(Debug, Clone)]
pub struct MockElement {
    pub paused: bool,
    pub ended: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub rate: f64,
    pub src: Option<String>,
    pub loads: usize,
    pub play_calls: usize,
    pub reject_play: bool,
    pub native_hls: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            paused: true,
            ended: false,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            src: None,
            loads: 0,
            play_calls: 0,
            reject_play: false,
            native_hls: false,
        }
    }
}

impl MediaElement for MockElement {
    fn paused(&self) -> bool { self.paused }
    fn ended(&self) -> bool { self.ended }
    fn current_time(&self) -> f64 { self.current_time }
    fn set_current_time(&mut self, seconds: f64) { self.current_time = seconds }
    fn duration(&self) -> f64 { self.duration }
    fn volume(&self) -> f64 { self.volume }
    fn set_volume(&mut self, volume: f64) { self.volume = volume }
    fn muted(&self) -> bool { self.muted }
    fn set_muted(&mut self, muted: bool) { self.muted = muted }
    fn playback_rate(&self) -> f64 { self.rate }
    fn set_playback_rate(&mut self, rate: f64) { self.rate = rate }

    fn play(&mut self) -> Result<()> {
        self.play_calls += 1;
        if self.reject_play {
            return Err(Error::PlayRejected("NotAllowedError".into()));
        }
        self.paused = false;
        self.ended = false;
        Ok(())
    }

    fn pause(&mut self) { self.paused = true }
    fn set_src(&mut self, src: &str) { self.src = Some(src.to_string()) }
    fn clear_src(&mut self) { self.src = None }
    fn load(&mut self) { self.loads += 1 }
    fn can_play_native_hls(&self) -> bool { self.native_hls }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Created(SessionId),
    LoadSource(String),
    AttachMedia,
    Destroy,
}

pub type EngineLog = Arc<Mutex<Vec<EngineCall>>>;

#[derive(Debug)]
pub struct MockEngine {
    log: EngineLog,
    fail_attach: bool,
}

impl AdaptiveEngine<MockElement> for MockEngine {
    fn load_source(&mut self, locator: &StreamLocator) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(EngineCall::LoadSource(locator.as_str().to_string()));
        Ok(())
    }

    fn attach_media(&mut self, _element: &mut MockElement) -> Result<()> {
        if self.fail_attach {
            return Err(Error::Engine("attachMedia failed".into()));
        }
        self.log.lock().unwrap().push(EngineCall::AttachMedia);
        Ok(())
    }

    fn destroy(&mut self) {
        self.log.lock().unwrap().push(EngineCall::Destroy);
    }
}

// =============================================================================
// Host
// =============================================================================

#[derive(Debug)]
pub struct MockHost {
    pub element: MockElement,
    pub engine_supported: bool,
    pub fail_attach: bool,
    pub fullscreen: bool,
    pub fullscreen_requests: usize,
    pub fullscreen_exits: usize,
    pub lock_fails: bool,
    pub locks: usize,
    pub unlocks: usize,
    pub engine_log: EngineLog,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            element: MockElement::default(),
            engine_supported: true,
            fail_attach: false,
            fullscreen: false,
            fullscreen_requests: 0,
            fullscreen_exits: 0,
            lock_fails: false,
            locks: 0,
            unlocks: 0,
            engine_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Host without an adaptive engine; `native` decides the fallback
    pub fn without_engine(native: bool) -> Self {
        let mut host = Self::new();
        host.engine_supported = false;
        host.element.native_hls = native;
        host
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.engine_log.lock().unwrap().clone()
    }
}

pub fn count(calls: &[EngineCall], pred: impl Fn(&EngineCall) -> bool) -> usize {
    calls.iter().filter(|c| pred(c)).count()
}

pub fn loaded_sources(calls: &[EngineCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|c| match c {
            EngineCall::LoadSource(src) => Some(src.clone()),
            _ => None,
        })
        .collect()
}

impl PlayerHost for MockHost {
    type Element = MockElement;
    type Engine = MockEngine;

    fn element(&self) -> &MockElement {
        &self.element
    }

    fn element_mut(&mut self) -> &mut MockElement {
        &mut self.element
    }

    fn engine_supported(&self) -> bool {
        self.engine_supported
    }

    fn create_engine(&mut self, _config: &EngineConfig, session: SessionId) -> Result<MockEngine> {
        self.engine_log.lock().unwrap().push(EngineCall::Created(session));
        Ok(MockEngine {
            log: self.engine_log.clone(),
            fail_attach: self.fail_attach,
        })
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        self.fullscreen_requests += 1;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.fullscreen_exits += 1;
        Ok(())
    }

    fn lock_landscape(&mut self) -> Result<()> {
        self.locks += 1;
        if self.lock_fails {
            return Err(Error::Orientation("screen.orientation.lock() is not available".into()));
        }
        Ok(())
    }

    fn unlock_orientation(&mut self) -> Result<()> {
        self.unlocks += 1;
        Ok(())
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Timers only fire when a test dispatches `HideTimerFired` itself
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pub pending: Vec<(TimerId, Duration)>,
    pub cancelled: Vec<TimerId>,
}

impl ManualScheduler {
    pub fn latest(&self) -> Option<TimerId> {
        self.pending.last().map(|(id, _)| *id)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next += 1;
        let id = TimerId(self.next);
        self.pending.push((id, delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(t, _)| *t != id);
        self.cancelled.push(id);
    }
}

pub type TestController = PlaybackController<MockHost, ManualScheduler>;

pub fn controller_with(host: MockHost, config: PlayerConfig) -> TestController {
    PlaybackController::new(host, ManualScheduler::default(), config)
}

/// Controller already loaded on [`LIVE_URL`]
pub fn loaded() -> TestController {
    let mut c = controller_with(MockHost::new(), PlayerConfig::default());
    c.load(locator(LIVE_URL));
    c
}
