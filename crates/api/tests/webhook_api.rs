//! HTTP-level tests for webhook ingress.
//!
//! Every delivery must be acknowledged with `200 OK`, whatever its content.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    body_json, body_text, build_test_app, build_with_media, drain_webhooks, get, post_json,
    post_raw, test_config, unreachable_pool,
};
use serde_json::json;
use watchgate_core::ransom::RansomState;
use watchgate_db::models::ransom::CreateRansom;
use watchgate_engine::{MemoryRansomStore, RansomStore, ResolverConfig};
use watchgate_plex::{LibrarySection, MediaServer, PlaybackSession, PlexError};

const BOUNDARY: &str = "watchgate-test-boundary";

fn play(subject: &str, title: &str, library: &str) -> serde_json::Value {
    json!({
        "event": "media.play",
        "Account": { "title": subject },
        "Metadata": { "title": title, "librarySectionTitle": library },
        "Player": { "uuid": "player-7" }
    })
}

fn pause(subject: &str, title: &str, view_offset: u64, duration: u64) -> serde_json::Value {
    json!({
        "event": "media.pause",
        "Account": { "title": subject },
        "Metadata": { "title": title, "viewOffset": view_offset, "duration": duration },
        "Player": { "uuid": "player-8" }
    })
}

fn multipart_body(payload: &serde_json::Value) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"payload\"\r\n\
         \r\n\
         {payload}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn bob_ransom() -> CreateRansom {
    CreateRansom {
        subject: "bob".into(),
        prerequisite: "Inception".into(),
        locked_collection: "Horror".into(),
        threshold: Some(20.0),
        issued_by: None,
        lock_message: None,
        unlock_message: None,
    }
}

// ---------------------------------------------------------------------------
// Acknowledgement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn json_webhook_is_acknowledged() {
    let app = build_test_app();
    let response = post_json(app.router(), "/webhook", play("ann", "Heat", "Movies")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn multipart_webhook_is_acknowledged() {
    let app = build_test_app();
    let response = post_raw(
        app.router(),
        "/webhook",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        multipart_body(&play("ann", "Heat", "Movies")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn malformed_webhook_is_still_acknowledged() {
    let app = build_test_app();

    let garbage = post_raw(app.router(), "/webhook", "application/json", "{not json").await;
    assert_eq!(garbage.status(), StatusCode::OK);

    let no_payload = post_raw(
        app.router(),
        "/webhook",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"thumb\"\r\n\r\nxx\r\n--{BOUNDARY}--\r\n"),
    )
    .await;
    assert_eq!(no_payload.status(), StatusCode::OK);
    assert_eq!(body_text(no_payload).await, "OK");
}

#[tokio::test]
async fn store_failure_is_still_acknowledged() {
    let store = std::sync::Arc::new(watchgate_engine::MemoryRansomStore::new());
    store.set_unavailable(true);
    let app = common::build_with(common::unreachable_pool(), store, common::test_config());

    let response = post_json(app.router(), "/webhook", pause("bob", "Inception", 50, 100)).await;

    assert_eq!(response.status(), StatusCode::OK);
    app.drain_webhooks().await;
}

#[tokio::test]
async fn webhook_updates_health_readout() {
    let app = build_test_app();
    assert!(app.state.monitor.last_received().is_none());

    post_json(app.router(), "/webhook", json!({})).await;

    assert!(app.state.monitor.last_received().is_some());
}

#[tokio::test]
async fn test_webhook_records_delivery() {
    let app = build_test_app();

    let response = post_raw(app.router(), "/api/v1/webhook/test", "application/json", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["received_at"].is_string());

    assert!(app.state.monitor.last_received().is_some());
}

// ---------------------------------------------------------------------------
// Enforcement through HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn locked_collection_playback_is_terminated() {
    let app = build_test_app();
    app.state.store.create_ransom(&bob_ransom()).await.unwrap();
    app.media.add_session("41", "bob", "Saw");

    let response = post_raw(
        app.router(),
        "/webhook",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        multipart_body(&play("bob", "Saw", "Horror")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    app.drain_webhooks().await;
    assert_eq!(
        app.media.terminations(),
        vec![(
            "41".to_string(),
            "LIBRARY LOCKED! Watch 20% of 'Inception' to unlock 'Horror'".to_string()
        )]
    );
}

#[tokio::test]
async fn reaching_threshold_unlocks_over_http() {
    let app = build_test_app();
    app.state.store.create_ransom(&bob_ransom()).await.unwrap();
    app.media.add_session("42", "bob", "Inception");

    post_json(app.router(), "/webhook", pause("bob", "Inception", 30, 100)).await;
    app.drain_webhooks().await;

    let unlocked = app.state.store.list_unlocked().await.unwrap();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].state, RansomState::Unlocked);
    assert_eq!(unlocked[0].progress, 30.0);
    assert_eq!(
        app.media.terminations()[0].1,
        "🎉 FREEDOM! You watched 30% - 'Horror' is now unlocked!"
    );

    // The active list is empty now.
    let response = get(app.router(), "/api/v1/ransoms/active").await;
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn other_subjects_are_untouched() {
    let app = build_test_app();
    app.state.store.create_ransom(&bob_ransom()).await.unwrap();
    app.media.add_session("43", "ann", "Saw");

    post_json(app.router(), "/webhook", play("ann", "Saw", "Horror")).await;
    app.drain_webhooks().await;

    assert!(app.media.terminations().is_empty());
}

// ---------------------------------------------------------------------------
// Slow media server
// ---------------------------------------------------------------------------

const SLOW_CALL: Duration = Duration::from_secs(9);

/// Media server where every call takes [`SLOW_CALL`] and terminating by
/// session key is refused, forcing the session-object fallback.
#[derive(Default)]
struct SlowMedia {
    terminations: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaServer for SlowMedia {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError> {
        tokio::time::sleep(SLOW_CALL).await;
        Ok(vec![PlaybackSession {
            session_key: "41".to_string(),
            session_id: Some("sid-41".to_string()),
            subject: Some("bob".to_string()),
            title: "Saw".to_string(),
            player_ids: vec!["player-7".to_string()],
        }])
    }

    async fn terminate_session(&self, session_id: &str, _reason: &str) -> Result<(), PlexError> {
        tokio::time::sleep(SLOW_CALL).await;
        if !session_id.starts_with("sid-") {
            return Err(PlexError::ApiError {
                status: 400,
                body: "unknown session".to_string(),
            });
        }
        self.terminations.lock().unwrap().push(session_id.to_string());
        Ok(())
    }

    async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        Ok(Vec::new())
    }

    async fn library_for_title(&self, _title: &str) -> Result<Option<String>, PlexError> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn slow_enforcement_outlives_the_request_timeout() {
    let mut config = test_config();
    config.resolver = ResolverConfig::default();
    config.request_timeout_secs = 30;

    let store = Arc::new(MemoryRansomStore::new());
    store.create_ransom(&bob_ransom()).await.unwrap();
    let media = Arc::new(SlowMedia::default());
    let (router, state) = build_with_media(
        unreachable_pool(),
        store,
        config,
        Arc::clone(&media) as Arc<dyn MediaServer>,
    );

    let started = tokio::time::Instant::now();
    let response = post_json(router, "/webhook", play("bob", "Saw", "Horror")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
    assert!(started.elapsed() < SLOW_CALL);

    // Settle delay plus four slow calls runs well past the request timeout.
    drain_webhooks(&state).await;
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(*media.terminations.lock().unwrap(), vec!["sid-41".to_string()]);
}
