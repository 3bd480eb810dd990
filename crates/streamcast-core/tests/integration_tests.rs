//! Integration tests for StreamCast Core

use base64::Engine as _;
use streamcast_core::{
    format_time, resolve_page_url, resolve_stream_param, DoubleClickCenter, Error, PlaybackRate,
    PlaybackState, PlayerConfig, QualityVariant, StreamLocator, StreamSource, SwitchPlan,
    VariantResolver,
};
use url::Url;

// =============================================================================
// Source Tests
// =============================================================================

#[test]
fn test_page_url_with_plain_locator() {
    let page = Url::parse(
        "https://class.example.com/watch?liveurl=https%3A%2F%2Fcdn.example.com%2Flive%2Findex_4.m3u8",
    )
    .unwrap();
    let source = resolve_page_url(&page).unwrap();
    assert_eq!(
        source.locator().map(|l| l.as_str()),
        Some("https://cdn.example.com/live/index_4.m3u8")
    );
}

#[test]
fn test_page_url_with_base64_locator() {
    let encoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .encode("https://cdn.example.com/live/index_5.m3u8");
    let page = Url::parse(&format!("https://class.example.com/?liveurl={}", encoded)).unwrap();
    let source = resolve_page_url(&page).unwrap();
    assert_eq!(
        source.locator().map(|l| l.as_str()),
        Some("https://cdn.example.com/live/index_5.m3u8")
    );
}

#[test]
fn test_page_url_without_param() {
    let page = Url::parse("https://class.example.com/watch?room=12").unwrap();
    assert_eq!(resolve_page_url(&page), Err(Error::StreamNotStarted));
}

#[test]
fn test_youtube_param_becomes_embed() {
    let source = resolve_stream_param(Some("https://www.youtube.com/watch?v=abc123XYZ")).unwrap();
    assert_eq!(
        source,
        StreamSource::Embed {
            video_id: "abc123XYZ".to_string()
        }
    );
    assert!(source.locator().is_none());
}

#[test]
fn test_unsupported_url_message() {
    let err = resolve_stream_param(Some("https://cdn.example.com/movie.mp4")).unwrap_err();
    assert_eq!(
        err.user_message(),
        "Unsupported stream URL. Please provide a valid .m3u8 or YouTube URL."
    );
}

#[test]
fn test_malformed_manifest_url_message() {
    let err = resolve_stream_param(Some("not a url/index.m3u8")).unwrap_err();
    assert_eq!(err.user_message(), "Invalid HLS stream URL format.");
}

// =============================================================================
// Variant Tests
// =============================================================================

fn resolver(raw: &str) -> VariantResolver {
    VariantResolver::new(
        StreamLocator::parse(raw).unwrap(),
        PlayerConfig::default().quality_ladder,
    )
}

#[test]
fn test_supplied_rendition_selects_label() {
    assert_eq!(resolver("https://cdn.example.com/a/index_4.m3u8").active_label(), "720p");
    assert_eq!(resolver("https://cdn.example.com/a/index_5.m3u8").active_label(), "720p");
    assert_eq!(resolver("https://cdn.example.com/a/index_2.m3u8").active_label(), "360p");
    assert_eq!(resolver("https://cdn.example.com/a/index_1.m3u8").active_label(), "240p");
}

#[test]
fn test_switch_plan_preserves_query() {
    let r = resolver("https://cdn.example.com/index_4.m3u8?sig=abc");
    match r.plan("240p") {
        SwitchPlan::Switch { label, locator } => {
            assert_eq!(label, "240p");
            assert_eq!(locator.as_str(), "https://cdn.example.com/index_1.m3u8?sig=abc");
        }
        other => panic!("unexpected plan: {:?}", other),
    }
    assert_eq!(r.plan("720p"), SwitchPlan::AlreadyActive);
    assert_eq!(r.plan("4K"), SwitchPlan::Rejected);
}

#[test]
fn test_custom_ladder() {
    let ladder = vec![
        QualityVariant::highest("1080p"),
        QualityVariant::with_suffix("480p", "_3.m3u8"),
    ];
    let r = VariantResolver::new(
        StreamLocator::parse("https://cdn.example.com/live/index_9.m3u8").unwrap(),
        ladder,
    );
    assert_eq!(r.active_label(), "1080p");
    assert_eq!(
        r.locator_for("480p").unwrap().as_str(),
        "https://cdn.example.com/live/index_3.m3u8"
    );
    assert_eq!(r.options().len(), 2);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_player_config_defaults() {
    let config = PlayerConfig::default();
    assert_eq!(config.hide_controls_after_ms, 3000);
    assert_eq!(config.skip_seconds, 5.0);
    assert_eq!(config.engine.live_sync_segments, 3);
    assert_eq!(config.engine.live_max_latency_segments, 5);
    assert!(config.engine.live_duration_infinity);
    assert_eq!(config.double_click_center, DoubleClickCenter::Inert);
}

#[test]
fn test_player_config_partial_json() {
    let config = PlayerConfig::from_json(r#"{"skip_seconds": 10.0}"#).unwrap();
    assert_eq!(config.skip_seconds, 10.0);
    assert_eq!(config.volume_step, 0.1);
    assert_eq!(config.quality_ladder.len(), 3);
}

#[test]
fn test_player_config_rejects_suffixed_top_rung() {
    let json = r#"{"quality_ladder": [{"label": "360p", "file_suffix": "_2.m3u8"}]}"#;
    assert!(matches!(
        PlayerConfig::from_json(json),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_vod_preset() {
    let config = PlayerConfig::vod();
    assert_eq!(config.double_click_center, DoubleClickCenter::ToggleFullscreen);
    assert!(!config.engine.live_duration_infinity);
}

// =============================================================================
// Types Tests
// =============================================================================

#[test]
fn test_format_time() {
    assert_eq!(format_time(0.0), "00:00");
    assert_eq!(format_time(59.9), "00:59");
    assert_eq!(format_time(754.0), "12:34");
    assert_eq!(format_time(3661.0), "01:01:01");
    assert_eq!(format_time(f64::INFINITY), "00:00");
}

#[test]
fn test_rate_labels() {
    let labels: Vec<_> = PlaybackRate::ALL.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["0.75x", "Normal", "1.5x", "2.0x", "3.0x"]);
    assert_eq!(PlaybackRate::label_for(1.25), "Normal");
}

#[test]
fn test_playback_state_progress() {
    let mut state = PlaybackState {
        duration: 200.0,
        current_time: 50.0,
        ..Default::default()
    };
    assert_eq!(state.progress(), Some(0.25));

    state.duration = f64::INFINITY;
    assert!(state.is_live());
    assert_eq!(state.progress(), None);
}
