//! Tokio driver tests on a paused clock

#![cfg(feature = "runtime")]

mod common;

use common::*;
use std::time::Duration;
use streamcast_core::{
    EngineError, EngineErrorKind, EngineEvent, Error, MediaEvent, PlayerConfig, PlayerEvent,
    PlayerRuntime, PointerInput,
};
use tokio::time::{sleep, Instant};
use tokio_test::assert_ok;

fn start() -> PlayerRuntime<MockHost> {
    PlayerRuntime::start(MockHost::new(), PlayerConfig::default(), Ok(locator(LIVE_URL)))
}

#[tokio::test(start_paused = true)]
async fn test_controls_hide_after_idle_timeout() {
    let runtime = start();
    let mut snapshots = runtime.subscribe();
    assert!(runtime.snapshot().controls.visible);

    let started = Instant::now();
    assert_ok!(runtime.send(PlayerEvent::Media(MediaEvent::Play)));

    let hidden = snapshots
        .wait_for(|s| !s.controls.visible)
        .await
        .map(|s| s.clone());
    assert!(hidden.is_ok());
    assert!(started.elapsed() >= Duration::from_secs(3));

    assert_ok!(runtime.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn test_activity_postpones_hide() {
    let runtime = start();
    assert_ok!(runtime.send(PlayerEvent::Media(MediaEvent::Play)));

    sleep(Duration::from_secs(2)).await;
    assert_ok!(runtime.send(PlayerEvent::Pointer(PointerInput::Move)));
    let moved = Instant::now();

    sleep(Duration::from_secs(2)).await;
    assert!(runtime.snapshot().controls.visible);

    let mut snapshots = runtime.subscribe();
    assert_ok!(snapshots.wait_for(|s| !s.controls.visible).await);
    assert!(moved.elapsed() >= Duration::from_secs(3));

    assert_ok!(runtime.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_engine_error_published() {
    let runtime = start();
    let session = runtime.snapshot().session.expect("session bound");

    assert_ok!(runtime.send(PlayerEvent::Engine {
        session,
        event: EngineEvent::Error(EngineError::new(
            EngineErrorKind::Network,
            "manifestLoadError",
            true,
        )),
    }));

    let mut snapshots = runtime.subscribe();
    let failed = snapshots.wait_for(|s| s.error.is_some()).await;
    let code = failed.map(|s| s.error.as_ref().map(|e| e.code));
    assert_eq!(code.ok().flatten(), Some("STREAM_NOT_STARTED"));
}

#[tokio::test]
async fn test_shutdown_tears_down_session() {
    let runtime = start();
    let controller = runtime.shutdown().await.expect("runtime joined");

    assert!(controller.session_id().is_none());
    let calls = controller.host().calls();
    assert_eq!(count(&calls, |e| *e == EngineCall::Destroy), 1);
    assert_eq!(controller.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_tears_down_session() {
    let host = MockHost::new();
    let log = host.engine_log.clone();
    let runtime = PlayerRuntime::start(host, PlayerConfig::default(), Ok(locator(LIVE_URL)));
    assert_ok!(runtime.send(PlayerEvent::Media(MediaEvent::Play)));

    drop(runtime);
    sleep(Duration::from_secs(10)).await;

    let calls = log.lock().unwrap().clone();
    assert_eq!(count(&calls, |e| *e == EngineCall::Destroy), 1);
}

#[tokio::test]
async fn test_mount_error_is_published_immediately() {
    let runtime = PlayerRuntime::start(
        MockHost::new(),
        PlayerConfig::default(),
        Err(Error::StreamNotStarted),
    );
    let snapshot = runtime.snapshot();
    assert_eq!(
        snapshot.error.map(|e| e.message).as_deref(),
        Some("The live class is not started yet.")
    );
    assert!(snapshot.session.is_none());
}
