use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pocket_tools::{
    create_router,
    state::{AppState, LevelCalibration},
    tasks::spawn_expiry_notifier,
    timer::TICK_INTERVAL,
};

fn app() -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new(
        8000,
        "127.0.0.1".to_string(),
        TICK_INTERVAL,
        LevelCalibration::default(),
    ));
    let router = create_router(Arc::clone(&state));
    (state, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (_, router) = app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn test_timer_start_and_cancel() {
    let (_, router) = app();

    let (status, body) = send(
        &router,
        Method::POST,
        "/timer/start",
        Some(json!({"minutes": "1", "seconds": 5})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["display"], "01:05");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let (_, body) = send(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["display"], "01:03");
    assert_eq!(body["phase"], "running");

    let (status, body) = send(&router, Method::POST, "/timer/cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["timer"]["phase"], "cancelled");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let (_, body) = send(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["display"], "01:03");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_duration_is_ignored() {
    let (_, router) = app();

    for input in [
        json!({"minutes": 0, "seconds": 0}),
        json!({"minutes": 0, "seconds": -5}),
        json!({"minutes": "abc", "seconds": "1"}),
        json!({}),
    ] {
        let (status, body) = send(&router, Method::POST, "/timer/start", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["timer"]["phase"], "idle");
    }
}

#[tokio::test(start_paused = true)]
async fn test_expiry_reaches_notifications() {
    let (state, router) = app();
    spawn_expiry_notifier(Arc::clone(&state));

    send(&router, Method::POST, "/timer/start", Some(json!({"seconds": 2}))).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let (_, body) = send(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["phase"], "expired");
    assert_eq!(body["display"], "00:00");

    let (_, body) = send(&router, Method::GET, "/notifications", None).await;
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "timer_expired");
}

#[tokio::test]
async fn test_flashlight_toggle() {
    let (_, router) = app();

    let (_, body) = send(&router, Method::GET, "/flashlight", None).await;
    assert_eq!(body["on"], false);

    let (status, body) = send(&router, Method::POST, "/flashlight/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on"], true);

    let (_, body) = send(&router, Method::GET, "/status", None).await;
    assert_eq!(body["flashlight"]["on"], true);
    assert_eq!(body["last_action"], "flashlight-on");
}

#[tokio::test]
async fn test_level_reading_maps_offset() {
    let (_, router) = app();

    let (_, body) = send(&router, Method::GET, "/level", None).await;
    assert_eq!(body["latest"], Value::Null);

    let (status, body) = send(
        &router,
        Method::POST,
        "/level/reading",
        Some(json!({"x": 90.0, "y": 0.0})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latest"]["offset"]["x_px"], -100.0);
    assert_eq!(body["latest"]["offset"]["level"], false);

    let (_, body) = send(&router, Method::GET, "/level", None).await;
    assert_eq!(body["latest"]["reading"]["x"], 90.0);
}

#[tokio::test(start_paused = true)]
async fn test_timer_events_stream_ticks() {
    let (_, router) = app();
    send(&router, Method::POST, "/timer/start", Some(json!({"minutes": 1, "seconds": 5}))).await;

    let response = router
        .clone()
        .oneshot(Request::get("/timer/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = response.into_body().into_data_stream();
    let mut buffer = String::new();
    let mut displays = Vec::new();

    while displays.len() < 2 {
        let chunk = body.next().await.unwrap().unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());

        while let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            let is_tick = frame
                .lines()
                .any(|line| line.strip_prefix("event:").map(str::trim) == Some("tick"));
            if !is_tick {
                continue;
            }
            let data = frame
                .lines()
                .find_map(|line| line.strip_prefix("data:"))
                .unwrap()
                .trim();
            let snapshot: Value = serde_json::from_str(data).unwrap();
            displays.push(snapshot["display"].as_str().unwrap().to_string());
        }
    }

    assert_eq!(displays, ["01:05", "01:04"]);
}
