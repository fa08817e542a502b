//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    error::PocketError,
    state::{AppState, StartResult, TiltReading},
    timer::{DurationInput, TimerSnapshot},
};
use super::responses::{
    ErrorResponse, FlashlightResponse, HealthResponse, LevelResponse, NotificationsResponse,
    StatusResponse, TimerResponse,
};

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn internal_error(context: &str, e: PocketError) -> HandlerError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: e.to_string() }),
    )
}

/// Handle POST /timer/start - Start a countdown from minutes and seconds
pub async fn timer_start_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DurationInput>,
) -> Result<Json<TimerResponse>, HandlerError> {
    match state.start_timer(&input) {
        Ok(StartResult::Started(timer)) => {
            info!("Timer start endpoint called - countdown running from {}", timer.display);
            Ok(Json(TimerResponse::started(timer)))
        }
        Ok(StartResult::Ignored { reason, current }) => {
            Ok(Json(TimerResponse::ignored(reason, current)))
        }
        Err(e) => Err(internal_error("Failed to start countdown", e)),
    }
}

/// Handle POST /timer/cancel - Cancel the countdown
pub async fn timer_cancel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, HandlerError> {
    state
        .cancel_timer()
        .map(|timer| Json(TimerResponse::cancelled(timer)))
        .map_err(|e| internal_error("Failed to cancel countdown", e))
}

/// Handle GET /timer - Current countdown snapshot
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerSnapshot> {
    Json(state.countdown.snapshot())
}

/// Handle GET /timer/events - Stream every countdown update as SSE
pub async fn timer_events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.countdown.watch();

    // The first item is the current snapshot, then one per change
    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = match Event::default().event("tick").json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to encode timer event: {}", e);
                Event::default().comment("encode error")
            }
        };
        Some((Ok::<_, Infallible>(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle POST /flashlight/toggle - Toggle the torch
pub async fn flashlight_toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FlashlightResponse>, HandlerError> {
    state
        .toggle_flashlight()
        .map(|flashlight| Json(flashlight.into()))
        .map_err(|e| internal_error("Failed to toggle flashlight", e))
}

/// Handle GET /flashlight - Torch state
pub async fn flashlight_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FlashlightResponse>, HandlerError> {
    state
        .flashlight
        .get()
        .map(|flashlight| Json(flashlight.into()))
        .map_err(|e| internal_error("Failed to read flashlight", e))
}

/// Handle POST /level/reading - Accept a tilt reading from the sensor
pub async fn level_reading_handler(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<TiltReading>,
) -> Result<Json<LevelResponse>, HandlerError> {
    match state.publish_tilt(reading) {
        Ok(snapshot) => Ok(Json(LevelResponse {
            calibration: state.level.calibration(),
            latest: Some(snapshot),
            timestamp: Utc::now(),
        })),
        Err(e @ PocketError::InvalidReading(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )),
        Err(e) => Err(internal_error("Failed to publish tilt reading", e)),
    }
}

/// Handle GET /level - Latest bubble position
pub async fn level_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LevelResponse>, HandlerError> {
    let latest = state
        .level
        .latest()
        .map_err(|e| internal_error("Failed to read level", e))?;

    Ok(Json(LevelResponse {
        calibration: state.level.calibration(),
        latest,
        timestamp: Utc::now(),
    }))
}

/// Handle GET /notifications - Notification feed
pub async fn notifications_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NotificationsResponse>, HandlerError> {
    state
        .notifications
        .list()
        .map(|notifications| Json(NotificationsResponse { notifications }))
        .map_err(|e| internal_error("Failed to read notifications", e))
}

/// Handle GET /status - Return current status of every tool
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, HandlerError> {
    let flashlight = state
        .flashlight
        .get()
        .map_err(|e| internal_error("Failed to read flashlight", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: state.countdown.snapshot(),
        flashlight,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
