//! StreamCast Core - Playback controller for adaptive live streams
//!
//! This crate provides the platform-independent half of the player:
//! - Stream source resolution (`liveurl` parameter, base64, YouTube links)
//! - Engine session life cycle with stale-event filtering
//! - Quality variant derivation and switching with position restore
//! - Media clock mirroring element state, transport commands
//! - Control overlay state machine, click zones and keyboard shortcuts
//!
//! The browser side (hls.js, the video element, fullscreen) lives behind the
//! traits in [`host`] and is implemented by `streamcast-wasm`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StreamCast Core                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Source    │  │   Variant    │  │    Engine    │           │
//! │  │   Resolver   │  │   Resolver   │  │   Adapter    │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │  Playback   │◄──── PlayerEvent             │
//! │                    │ Controller  │────► PlayerSnapshot          │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │    Media     │  │ Interaction │  │  PlayerHost  │            │
//! │  │    Clock     │  │   Machine   │  │  Scheduler   │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod source;
pub mod variant;
pub mod host;
pub mod event;
pub mod subscription;
pub mod clock;
pub mod interaction;
pub mod session;
pub mod controller;
#[cfg(feature = "runtime")]
pub mod runtime;

pub use error::{Error, Result};
pub use types::*;
pub use config::{DoubleClickCenter, EngineConfig, PlayerConfig, QualityVariant};
pub use source::{resolve_page_url, resolve_stream_param, StreamSource, STREAM_PARAM};
pub use variant::{QualityOption, SwitchPlan, VariantResolver};
pub use host::{AdaptiveEngine, MediaElement, PlayerHost, Scheduler};
pub use event::{
    EngineError, EngineErrorKind, EngineEvent, Intent, KeyInput, MediaEvent, PlayerEvent,
    PointerInput,
};
pub use interaction::{ClickZone, ControlVisibility, KeyOutcome, SettingsView, Shortcut};
pub use session::{Backend, EngineAdapter, SessionSignal};
pub use controller::{DispatchOutcome, ErrorView, PlaybackController, PlayerSnapshot};
#[cfg(feature = "runtime")]
pub use runtime::{PlayerRuntime, TokioScheduler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "StreamCast Core initialized");
}
