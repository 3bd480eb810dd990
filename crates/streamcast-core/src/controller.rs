//! Playback controller - owns the element and reconciles every event source
//!
//! Coordinates:
//! - Engine session life cycle and error surfacing
//! - Quality switches with position restore
//! - Transport commands and element state mirroring
//! - Control overlay visibility, click zones, shortcuts and fullscreen

use crate::{
    clock::MediaClock,
    config::{DoubleClickCenter, PlayerConfig},
    event::{Intent, KeyInput, MediaEvent, PlayerEvent, PointerInput},
    host::{MediaElement, PlayerHost, Scheduler},
    interaction::{
        ClickZone, ControlVisibility, Interaction, KeyOutcome, SettingsView, Shortcut,
    },
    session::{EngineAdapter, SessionSignal},
    subscription::Once,
    types::*,
    variant::{QualityOption, SwitchPlan, VariantResolver},
    Error, Result,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// Position and play status captured before a quality switch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRestore {
    pub position: f64,
    pub resume: bool,
}

/// Surfaced error, as rendered by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub code: &'static str,
    pub message: String,
}

/// Entry of the speed menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedOption {
    pub label: &'static str,
    pub rate: f64,
    pub active: bool,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub playback: PlaybackState,
    pub controls: ControlVisibility,
    pub settings_open: bool,
    pub settings_view: SettingsView,
    pub quality_label: Option<String>,
    pub quality_options: Vec<QualityOption>,
    pub rate_label: &'static str,
    pub speed_options: Vec<SpeedOption>,
    pub is_live: bool,
    pub can_seek: bool,
    pub progress: Option<f64>,
    pub time_label: String,
    /// `None` for live streams, which show a LIVE badge instead
    pub duration_label: Option<String>,
    pub backend: Option<&'static str>,
    pub session: Option<SessionId>,
    pub error: Option<ErrorView>,
}

/// Result of dispatching one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Suppress the originating DOM event's default action
    pub prevent_default: bool,
}

/// The playback controller
pub struct PlaybackController<H: PlayerHost, S: Scheduler> {
    host: H,
    scheduler: S,
    config: PlayerConfig,
    adapter: EngineAdapter<H::Engine>,
    clock: MediaClock,
    interaction: Interaction,
    variants: Option<VariantResolver>,
    restore: Once<PendingRestore>,
    error: Option<Error>,
}

impl<H: PlayerHost, S: Scheduler> PlaybackController<H, S> {
    /// Create an unmounted controller
    pub fn new(host: H, scheduler: S, config: PlayerConfig) -> Self {
        let interaction = Interaction::new(config.hide_controls_after());
        Self {
            host,
            scheduler,
            config,
            adapter: EngineAdapter::new(),
            clock: MediaClock::new(),
            interaction,
            variants: None,
            restore: Once::new(),
            error: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlaybackState {
        self.clock.state()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.adapter.session().map(|s| s.id())
    }

    /// Locator currently loaded into the session
    pub fn active_locator(&self) -> Option<&StreamLocator> {
        self.adapter.session().map(|s| s.locator())
    }

    pub fn quality_label(&self) -> Option<&str> {
        self.variants.as_ref().map(|v| v.active_label())
    }

    /// Mount with the resolver's outcome
    #[instrument(skip(self, source))]
    pub fn mount(&mut self, source: Result<StreamLocator>) {
        match source {
            Ok(locator) => self.load(locator),
            Err(e) => {
                self.teardown();
                self.clock.reset(self.host.element());
                self.interaction.reset(&mut self.scheduler);
                self.variants = None;
                warn!(code = e.error_code(), "Mounted without a playable locator");
                self.error = Some(e);
            }
        }
    }

    /// Replace every session entity with fresh ones for `locator`
    pub fn load(&mut self, locator: StreamLocator) {
        self.teardown();

        self.error = None;
        self.clock.reset(self.host.element());
        self.interaction.reset(&mut self.scheduler);
        self.variants = Some(VariantResolver::new(
            locator.clone(),
            self.config.quality_ladder.clone(),
        ));

        match self.adapter.bind(&mut self.host, &locator, &self.config.engine) {
            Ok(session) => {
                info!(session = %session, locator = %locator, "Playback session started");
                self.clock.set_buffering(true);
                self.interaction.activity(&mut self.scheduler);
            }
            Err(e) => {
                error!(code = e.error_code(), error = %e, "Could not start playback");
                self.variants = None;
                self.error = Some(e);
            }
        }
    }

    /// Tear everything down. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        self.teardown();
        info!("Controller unmounted");
    }

    fn teardown(&mut self) {
        self.interaction.cancel(&mut self.scheduler);
        self.restore.cancel();
        self.adapter.teardown(&mut self.host);
    }

    fn fail(&mut self, e: Error) {
        self.teardown();
        self.clock.set_buffering(false);
        self.error = Some(e);
    }

    /// Process one event
    pub fn dispatch(&mut self, event: PlayerEvent) -> DispatchOutcome {
        match event {
            PlayerEvent::Load(locator) => self.load(locator),
            PlayerEvent::Media(event) => self.on_media_event(event),
            PlayerEvent::Engine { session, event } => {
                match self.adapter.on_engine_event(session, event) {
                    SessionSignal::ManifestParsed { live } => self.on_manifest_parsed(live),
                    SessionSignal::Fatal(e) => self.fail(e),
                    SessionSignal::Recoverable | SessionSignal::Ignored => {}
                }
            }
            PlayerEvent::Pointer(input) => self.on_pointer(input),
            PlayerEvent::Key(input) => {
                let outcome = self.on_key(&input);
                return DispatchOutcome {
                    prevent_default: outcome.prevent_default,
                };
            }
            PlayerEvent::Intent(intent) => self.on_intent(intent),
            PlayerEvent::FullscreenChanged(fullscreen) => self.on_fullscreen_changed(fullscreen),
            PlayerEvent::HideTimerFired(id) => self.on_hide_timer(id),
            PlayerEvent::Unmount => self.unmount(),
        }
        DispatchOutcome::default()
    }

    // -------------------------------------------------------------------------
    // Engine and element events
    // -------------------------------------------------------------------------

    fn on_manifest_parsed(&mut self, live: bool) {
        if live {
            self.clock.set_live();
        }
        self.clock.set_buffering(false);
        if !self.adapter.is_native() {
            self.apply_restore();
        }
    }

    pub fn on_media_event(&mut self, event: MediaEvent) {
        self.clock.apply(event, self.host.element());

        match event {
            MediaEvent::Play => self.interaction.playback_started(&mut self.scheduler),
            MediaEvent::LoadedMetadata if self.adapter.is_native() => {
                self.clock.set_buffering(false);
                self.apply_restore();
            }
            MediaEvent::Error if self.adapter.is_native() => {
                error!("Native HLS playback failed");
                self.fail(Error::FatalMedia(
                    "native HLS stream failed to load".to_string(),
                ));
            }
            _ => {}
        }
    }

    fn apply_restore(&mut self) {
        let Some(restore) = self.restore.fire() else {
            return;
        };
        debug!(position = restore.position, resume = restore.resume, "Restoring after quality switch");

        let element = self.host.element_mut();
        element.set_current_time(restore.position);
        if restore.resume {
            if let Err(e) = element.play() {
                warn!(error = %e, "Could not resume after quality switch");
            }
        }
        self.clock.set_position(restore.position);
    }

    pub fn on_fullscreen_changed(&mut self, fullscreen: bool) {
        self.clock.set_fullscreen(fullscreen);
        self.interaction
            .fullscreen_changed(&mut self.scheduler, fullscreen);
    }

    pub fn on_hide_timer(&mut self, id: TimerId) {
        let playing = self.clock.state().is_playing;
        if self.interaction.on_hide_timer(id, playing) {
            debug!("Controls hidden");
        }
    }

    // -------------------------------------------------------------------------
    // User input
    // -------------------------------------------------------------------------

    pub fn on_pointer(&mut self, input: PointerInput) {
        match input {
            PointerInput::Move => self.interaction.activity(&mut self.scheduler),
            PointerInput::Leave => {
                let playing = self.clock.state().is_playing;
                self.interaction.pointer_leave(&mut self.scheduler, playing);
            }
            PointerInput::Click { x, width } => {
                if ClickZone::locate(x, width) == ClickZone::Middle {
                    self.toggle_play();
                }
                self.interaction.activity(&mut self.scheduler);
            }
            PointerInput::DoubleClick { x, width } => {
                match ClickZone::locate(x, width) {
                    ClickZone::Left => {
                        self.skip(-self.config.skip_seconds);
                    }
                    ClickZone::Right => {
                        self.skip(self.config.skip_seconds);
                    }
                    ClickZone::Middle => {
                        if self.config.double_click_center == DoubleClickCenter::ToggleFullscreen {
                            self.toggle_fullscreen();
                        }
                    }
                }
                self.interaction.activity(&mut self.scheduler);
            }
        }
    }

    /// Keyboard shortcut handling
    pub fn on_key(&mut self, input: &KeyInput) -> KeyOutcome {
        if input.editable_target {
            return KeyOutcome::default();
        }
        let Some(shortcut) = Shortcut::from_key(&input.key) else {
            return KeyOutcome::default();
        };

        let step = self.config.volume_step;
        let prevent_default = match shortcut {
            Shortcut::ToggleFullscreen => {
                self.toggle_fullscreen();
                false
            }
            Shortcut::TogglePlay => {
                self.toggle_play();
                true
            }
            Shortcut::ToggleMute => {
                self.toggle_mute();
                false
            }
            Shortcut::SkipForward => self.skip(self.config.skip_seconds),
            Shortcut::SkipBackward => self.skip(-self.config.skip_seconds),
            Shortcut::VolumeUp => {
                self.clock.volume_up(self.host.element_mut(), step);
                true
            }
            Shortcut::VolumeDown => {
                self.clock.volume_down(self.host.element_mut(), step);
                true
            }
        };

        self.interaction.activity(&mut self.scheduler);
        KeyOutcome {
            handled: true,
            prevent_default,
        }
    }

    pub fn on_intent(&mut self, intent: Intent) {
        match intent {
            Intent::TogglePlay => self.toggle_play(),
            Intent::Seek(seconds) => {
                self.seek(seconds);
                self.interaction.activity(&mut self.scheduler);
            }
            Intent::SkipForward => {
                self.skip(self.config.skip_seconds);
            }
            Intent::SkipBackward => {
                self.skip(-self.config.skip_seconds);
            }
            Intent::SetVolume(volume) => {
                self.set_volume(volume);
                self.interaction.activity(&mut self.scheduler);
            }
            Intent::ToggleMute => self.toggle_mute(),
            Intent::SetRate(rate) => self.set_rate(rate),
            Intent::SelectQuality(label) => self.select_quality(&label),
            Intent::ToggleFullscreen => self.toggle_fullscreen(),
            Intent::OpenSettings => self.open_settings(),
            Intent::CloseSettings => self.close_settings(),
            Intent::ShowSettingsView(view) => self.interaction.show_view(view),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    pub fn toggle_play(&mut self) {
        self.clock.toggle_play(self.host.element_mut());
    }

    /// Absolute seek; false on live streams
    pub fn seek(&mut self, seconds: f64) -> bool {
        self.clock.seek(self.host.element_mut(), seconds)
    }

    /// Relative skip; false on live streams
    pub fn skip(&mut self, delta: f64) -> bool {
        self.clock.skip(self.host.element_mut(), delta)
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.clock.set_volume(self.host.element_mut(), volume);
    }

    pub fn toggle_mute(&mut self) {
        let unmute_volume = self.config.unmute_volume;
        self.clock.toggle_mute(self.host.element_mut(), unmute_volume);
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.clock.set_rate(self.host.element_mut(), rate);
    }

    pub fn open_settings(&mut self) {
        self.interaction.open_settings(&mut self.scheduler);
    }

    pub fn close_settings(&mut self) {
        let playing = self.clock.state().is_playing;
        self.interaction.close_settings(&mut self.scheduler, playing);
    }

    /// Request or exit fullscreen. State follows the fullscreen-change signal.
    pub fn toggle_fullscreen(&mut self) {
        if self.host.is_fullscreen() {
            match self.host.exit_fullscreen() {
                Ok(()) => {
                    if let Err(e) = self.host.unlock_orientation() {
                        debug!(error = %e, "Orientation unlock unavailable");
                    }
                }
                Err(e) => error!(error = %e, "Error attempting to exit full-screen mode"),
            }
        } else {
            match self.host.request_fullscreen() {
                Ok(()) => {
                    if let Err(e) = self.host.lock_landscape() {
                        warn!(error = %e, "Could not lock to landscape orientation");
                    }
                }
                Err(e) => error!(error = %e, "Error attempting to enable full-screen mode"),
            }
        }
    }

    /// Switch quality variant by label, keeping position and play status
    #[instrument(skip(self))]
    pub fn select_quality(&mut self, label: &str) {
        let Some(variants) = self.variants.as_mut() else {
            return;
        };

        let (label, locator) = match variants.plan(label) {
            SwitchPlan::AlreadyActive => {
                debug!("Quality already active");
                return;
            }
            SwitchPlan::Rejected => {
                warn!("No locator for requested quality, switch rejected");
                return;
            }
            SwitchPlan::Switch { label, locator } => (label, locator),
        };

        let Some(session) = self.adapter.session_mut() else {
            return;
        };

        let element = self.host.element();
        let restore = PendingRestore {
            position: element.current_time(),
            resume: !element.paused(),
        };

        if let Err(e) = session.load(&locator, self.host.element_mut()) {
            warn!(error = %e, "Quality switch failed to load");
            return;
        }

        if self.restore.arm(restore).is_some() {
            debug!("Pending restore from previous switch replaced");
        }
        self.clock.set_buffering(true);
        info!(quality = %label, locator = %locator, "Quality switched");
        variants.commit(label);
    }

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> PlayerSnapshot {
        let playback = self.clock.state().clone();
        let is_live = playback.is_live();

        PlayerSnapshot {
            controls: self.interaction.visibility(),
            settings_open: self.interaction.settings_open(),
            settings_view: self.interaction.settings_view(),
            quality_label: self.quality_label().map(str::to_string),
            quality_options: self
                .variants
                .as_ref()
                .map(|v| v.options())
                .unwrap_or_default(),
            rate_label: PlaybackRate::label_for(playback.playback_rate),
            speed_options: PlaybackRate::ALL
                .iter()
                .map(|r| SpeedOption {
                    label: r.label(),
                    rate: r.rate(),
                    active: r.rate() == playback.playback_rate,
                })
                .collect(),
            is_live,
            can_seek: playback.can_seek(),
            progress: playback.progress(),
            time_label: format_time(playback.current_time),
            duration_label: (!is_live).then(|| format_time(playback.duration)),
            backend: self.adapter.session().map(|s| s.backend().label()),
            session: self.session_id(),
            error: self.error.as_ref().map(|e| ErrorView {
                code: e.error_code(),
                message: e.user_message(),
            }),
            playback,
        }
    }
}

impl<H: PlayerHost, S: Scheduler> Drop for PlaybackController<H, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
