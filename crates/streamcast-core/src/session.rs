//! Engine session - binds one locator to the media element
//!
//! Handles:
//! - Backend selection (adaptive engine, native HLS, or neither)
//! - Session identity, so events from a torn-down engine are dropped
//! - Classification of engine errors into the player error taxonomy
//! - Teardown

use crate::{
    config::EngineConfig,
    event::{EngineError, EngineErrorKind, EngineEvent},
    host::{AdaptiveEngine, MediaElement, PlayerHost},
    types::{SessionId, StreamLocator},
    Error, Result,
};
use tracing::{debug, error, info, instrument, warn};

/// Playback path chosen once per session
#[derive(Debug)]
pub enum Backend<G> {
    /// Adaptive engine attached to the element
    Engine(G),
    /// Source assigned directly to the element
    Native,
}

impl<G> Backend<G> {
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Engine(_) => "engine",
            Backend::Native => "native",
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Backend::Native)
    }
}

/// One live binding of a locator to the element
#[derive(Debug)]
pub struct EngineSession<G> {
    id: SessionId,
    locator: StreamLocator,
    backend: Backend<G>,
    manifest_parsed: bool,
}

impl<G> EngineSession<G> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Locator currently loaded
    pub fn locator(&self) -> &StreamLocator {
        &self.locator
    }

    pub fn backend(&self) -> &Backend<G> {
        &self.backend
    }

    /// Whether any manifest has been parsed during this session
    pub fn manifest_parsed(&self) -> bool {
        self.manifest_parsed
    }

    /// Swap the source in place, keeping the same engine instance
    pub fn load<E>(&mut self, locator: &StreamLocator, element: &mut E) -> Result<()>
    where
        E: MediaElement,
        G: AdaptiveEngine<E>,
    {
        match &mut self.backend {
            Backend::Engine(engine) => engine.load_source(locator)?,
            Backend::Native => {
                element.set_src(locator.as_str());
                element.load();
            }
        }
        debug!(session = %self.id, locator = %locator, "Source swapped");
        self.locator = locator.clone();
        Ok(())
    }
}

/// What an engine event means to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// Not for the current session
    Ignored,
    ManifestParsed { live: bool },
    /// Logged; the engine recovers on its own
    Recoverable,
    /// Session must end with this error
    Fatal(Error),
}

/// Map a fatal engine error onto the player error taxonomy.
///
/// Only network failures before the session's first parsed manifest mean the
/// stream has not started; a failed variant load after a switch keeps its details.
pub fn classify_fatal(err: &EngineError, manifest_parsed: bool) -> Error {
    match err.kind {
        EngineErrorKind::Network if !manifest_parsed => Error::StreamNotStarted,
        EngineErrorKind::Network => Error::FatalNetwork(err.details.clone()),
        EngineErrorKind::Media => Error::FatalMedia(err.details.clone()),
        EngineErrorKind::Other => Error::FatalOther(err.details.clone()),
    }
}

/// Owns the life cycle of the (single) engine session
#[derive(Debug)]
pub struct EngineAdapter<G> {
    session: Option<EngineSession<G>>,
}

impl<G> Default for EngineAdapter<G> {
    fn default() -> Self {
        Self { session: None }
    }
}

impl<G> EngineAdapter<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&EngineSession<G>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EngineSession<G>> {
        self.session.as_mut()
    }

    pub fn is_native(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.backend.is_native())
            .unwrap_or(false)
    }

    /// Tear down any previous session, then bind `locator`
    #[instrument(skip(self, host, locator, config), fields(locator = %locator))]
    pub fn bind<H>(
        &mut self,
        host: &mut H,
        locator: &StreamLocator,
        config: &EngineConfig,
    ) -> Result<SessionId>
    where
        H: PlayerHost<Engine = G>,
        G: AdaptiveEngine<H::Element>,
    {
        self.teardown(host);

        let id = SessionId::new();
        let backend = if host.engine_supported() {
            let mut engine = host
                .create_engine(config, id)
                .map_err(|e| Error::FatalOther(e.to_string()))?;

            let attached = engine
                .load_source(locator)
                .and_then(|_| engine.attach_media(host.element_mut()));
            if let Err(e) = attached {
                engine.destroy();
                host.element_mut().clear_src();
                return Err(Error::FatalOther(e.to_string()));
            }
            Backend::Engine(engine)
        } else if host.element().can_play_native_hls() {
            host.element_mut().set_src(locator.as_str());
            Backend::Native
        } else {
            warn!("Neither adaptive engine nor native HLS available");
            return Err(Error::UnsupportedPlayback);
        };

        info!(session = %id, backend = backend.label(), "Engine session bound");

        self.session = Some(EngineSession {
            id,
            locator: locator.clone(),
            backend,
            manifest_parsed: false,
        });

        Ok(id)
    }

    /// Destroy the session and clear the element source. Safe to repeat.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: PlayerHost<Engine = G>,
        G: AdaptiveEngine<H::Element>,
    {
        if let Some(session) = self.session.take() {
            if let Backend::Engine(mut engine) = session.backend {
                engine.destroy();
            }
            info!(session = %session.id, "Engine session torn down");
        }
        host.element_mut().clear_src();
    }

    /// Interpret an engine event tagged with `session`
    pub fn on_engine_event(&mut self, session: SessionId, event: EngineEvent) -> SessionSignal {
        let current = match self.session.as_mut() {
            Some(current) if current.id == session => current,
            _ => {
                debug!(session = %session, "Event from inactive session dropped");
                return SessionSignal::Ignored;
            }
        };

        match event {
            EngineEvent::ManifestParsed { live } => {
                current.manifest_parsed = true;
                info!(session = %session, live, "Manifest parsed");
                SessionSignal::ManifestParsed { live }
            }
            EngineEvent::Error(err) if !err.fatal => {
                warn!(
                    session = %session,
                    kind = ?err.kind,
                    details = %err.details,
                    "Recoverable engine error"
                );
                SessionSignal::Recoverable
            }
            EngineEvent::Error(err) => {
                let classified = classify_fatal(&err, current.manifest_parsed);
                error!(
                    session = %session,
                    kind = ?err.kind,
                    details = %err.details,
                    manifest_load = err.is_manifest_load(),
                    code = classified.error_code(),
                    "Fatal engine error"
                );
                SessionSignal::Fatal(classified)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(details: &str) -> EngineError {
        EngineError::new(EngineErrorKind::Network, details, true)
    }

    #[test]
    fn test_initial_manifest_load_failure_is_not_started() {
        assert_eq!(classify_fatal(&network("manifestLoadTimeOut"), false), Error::StreamNotStarted);
        assert_eq!(classify_fatal(&network("manifestLoadError"), false), Error::StreamNotStarted);
    }

    #[test]
    fn test_manifest_load_failure_after_parse_keeps_details() {
        assert_eq!(
            classify_fatal(&network("manifestLoadError"), true),
            Error::FatalNetwork("manifestLoadError".into())
        );
    }

    #[test]
    fn test_network_before_first_manifest_is_not_started() {
        assert_eq!(classify_fatal(&network("levelLoadError"), false), Error::StreamNotStarted);
    }

    #[test]
    fn test_network_after_manifest_keeps_details() {
        assert_eq!(
            classify_fatal(&network("fragLoadError"), true),
            Error::FatalNetwork("fragLoadError".into())
        );
    }

    #[test]
    fn test_media_and_other() {
        let media = EngineError::new(EngineErrorKind::Media, "bufferAppendError", true);
        assert_eq!(classify_fatal(&media, true), Error::FatalMedia("bufferAppendError".into()));
        let other = EngineError::new(EngineErrorKind::Other, "internalException", true);
        assert_eq!(classify_fatal(&other, true), Error::FatalOther("internalException".into()));
    }

    #[test]
    fn test_events_without_session_are_ignored() {
        let mut adapter: EngineAdapter<()> = EngineAdapter::new();
        let signal = adapter.on_engine_event(SessionId::new(), EngineEvent::ManifestParsed { live: true });
        assert_eq!(signal, SessionSignal::Ignored);
    }
}
