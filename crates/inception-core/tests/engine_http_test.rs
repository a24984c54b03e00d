#![allow(clippy::unwrap_used)]
// End-to-end engine rounds against a wiremock controller.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inception_core::{
    ControlAction, CoreError, Cursor, CursorStart, Engine, EngineConfig, EntityKind,
    EventCategory, Notification, RoundOutcome, TailOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> EngineConfig {
    let mut config = EngineConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("engine-token".to_owned()),
    );
    config.timeout = Duration::from_secs(2);
    config.review_timeout = Duration::from_secs(2);
    config.sync.tailer.cursor_start = CursorStart::Ticks(90);
    config
}

async fn mount_doors(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/control/door/summary"))
        .and(header("Authorization", "APIToken engine-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Doors": {
                "d-1": {
                    "EntityInfo": {"ID": "d-1", "Name": "Front Door"},
                    "CurrentState": 0x1,
                    "Permissions": ["Control"]
                }
            }
        })))
        .mount(server)
        .await;
}

fn review_event(id: &str, ticks: u64, code: u64) -> serde_json::Value {
    json!({
        "ID": id,
        "Description": format!("event {id}"),
        "MessageCategory": code,
        "Who": "Reception",
        "What": "Front Door",
        "When": "2024-05-01T10:00:00+10:00",
        "WhenTicks": ticks.to_string()
    })
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_treats_unavailable_kinds_as_empty() {
    let server = MockServer::start().await;
    mount_doors(&server).await;

    let engine = Engine::new(config(&server)).unwrap();
    let outcome = engine.refresh_now().await.unwrap();

    assert_eq!(
        outcome,
        RoundOutcome::Committed {
            generation: 1,
            entities: 1,
            changed: 1,
            removed: 0
        }
    );
    let snap = engine.snapshot();
    let door = snap.get(EntityKind::Door, "d-1").unwrap();
    assert_eq!(door.name, "Front Door");
    assert_eq!(door.state_description(), vec!["Door is unlocked"]);
    assert_eq!(snap.count(EntityKind::User), 0);
}

#[tokio::test]
async fn test_refresh_unauthorized_requires_reauth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let engine = Engine::new(config(&server)).unwrap();
    let err = engine.refresh_now().await.unwrap_err();

    assert!(err.is_auth());
    assert!(engine.is_reauth_required());
    assert_eq!(engine.snapshot().generation(), 0);
}

// ── Review events ───────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_events_delivers_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/monitor-updates"))
        .and(body_partial_json(json!([{
            "ID": "LiveReviewEvents",
            "InputData": {"referenceTime": 89}
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": "LiveReviewEvents",
            "Result": [
                review_event("e-2", 105, 2001),
                review_event("e-1", 100, 2001),
                review_event("e-2", 105, 2001),
                review_event("e-3", 110, 10_000)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::new(config(&server)).unwrap();
    let (_, mut rx) = engine.channel_listener();

    let outcome = engine.poll_events_now().await.unwrap();
    assert!(matches!(
        outcome,
        TailOutcome::Advanced {
            delivered: 3,
            duplicates: 1,
            ..
        }
    ));

    let mut seen = Vec::new();
    while let Ok(Notification::Event(event)) = rx.try_recv() {
        seen.push((event.event_id.clone(), event.category));
    }
    assert_eq!(
        seen,
        vec![
            ("e-1".to_owned(), EventCategory::Access),
            ("e-2".to_owned(), EventCategory::Access),
            ("e-3".to_owned(), EventCategory::Hardware),
        ]
    );
    assert_eq!(engine.event_cursor(), Some(Cursor(110)));
}

#[tokio::test]
async fn test_missing_review_log_disables_tailing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/monitor-updates"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::new(config(&server)).unwrap();
    assert_eq!(engine.poll_events_now().await.unwrap(), TailOutcome::Disabled);
    assert_eq!(engine.poll_events_now().await.unwrap(), TailOutcome::Disabled);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_command_posts_activity() {
    let server = MockServer::start().await;
    mount_doors(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/control/door/d-1/activity"))
        .and(body_partial_json(json!({
            "Type": "ControlDoor",
            "DoorControlType": "TimedUnlock",
            "TimeSecs": 5
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::new(config(&server)).unwrap();
    engine.refresh_now().await.unwrap();
    engine
        .issue_command(EntityKind::Door, "d-1", ControlAction::GrantAccess)
        .await
        .unwrap();

    let err = engine
        .issue_command(EntityKind::Door, "d-1", ControlAction::Disarm)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}
