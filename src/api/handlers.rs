//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::Utc;
use futures::Stream;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    services::export,
    state::{AppState, RegistryError, StateError, TimerFilter, TimerId, TimerSnapshot},
};

use super::responses::{ApiResponse, ErrorResponse, HealthResponse, StatusResponse};

/// Body for POST /timers
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTimerRequest {
    pub name: String,
    pub job_number: String,
    #[serde(default)]
    pub initial_ms: u64,
}

/// Body for PUT /timers/:id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTimerRequest {
    pub name: String,
    pub job_number: String,
    pub accumulated_ms: u64,
}

/// Query string for GET /timers
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub view: TimerFilter,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a state failure to an HTTP status and error body.
fn error_response(err: StateError) -> ApiError {
    let status = match &err {
        StateError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
        StateError::Registry(RegistryError::EmptyField { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        StateError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    (status, Json(ErrorResponse::new(err.to_string())))
}

/// Current non-archived timer views for command response bodies.
fn active_view(state: &AppState) -> Result<Vec<TimerSnapshot>, ApiError> {
    state
        .list_timers(TimerFilter::Active)
        .map_err(error_response)
}

/// Handle POST /timers - create a new timer
pub async fn add_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddTimerRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let id = state
        .add_timer(&payload.name, &payload.job_number, payload.initial_ms)
        .map_err(error_response)?;

    info!("Add endpoint called - timer {} created", id);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} created", id),
        active_view(&state)?,
    )))
}

/// Handle POST /timers/:id/toggle - start or stop a timer
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, ApiError> {
    let running = state.toggle_timer(id).map_err(error_response)?;
    let timers = active_view(&state)?;

    info!("Toggle endpoint called - timer {} toggled", id);
    if running {
        Ok(Json(ApiResponse::running(
            format!("Timer {} started", id),
            timers,
        )))
    } else {
        Ok(Json(ApiResponse::paused(
            format!("Timer {} stopped", id),
            timers,
        )))
    }
}

/// Handle PUT /timers/:id - overwrite a timer's fields and tracked time
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(payload): Json<EditTimerRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    state
        .edit_timer(id, &payload.name, &payload.job_number, payload.accumulated_ms)
        .map_err(error_response)?;

    info!("Edit endpoint called - timer {} updated", id);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} updated", id),
        active_view(&state)?,
    )))
}

/// Handle POST /timers/:id/archive - soft-remove a timer
pub async fn archive_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.archive_timer(id).map_err(error_response)?;

    info!("Archive endpoint called - timer {} archived", id);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} archived", id),
        active_view(&state)?,
    )))
}

/// Handle POST /timers/:id/restore - bring a timer back from the archive
pub async fn restore_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.restore_timer(id).map_err(error_response)?;

    info!("Restore endpoint called - timer {} restored", id);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} restored", id),
        active_view(&state)?,
    )))
}

/// Handle POST /clear - zero every non-archived timer
///
/// Destructive and irreversible; clients are expected to confirm with the
/// user before calling.
pub async fn clear_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.clear_all().map_err(error_response)?;

    info!("Clear endpoint called - all timers reset");
    Ok(Json(ApiResponse::ok(
        "All timers cleared".to_string(),
        active_view(&state)?,
    )))
}

/// Handle GET /timers - list the active or archived view
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TimerSnapshot>>, ApiError> {
    let timers = state.list_timers(query.view).map_err(error_response)?;
    Ok(Json(timers))
}

/// Handle GET /export - download tracked time as a WorkflowMax CSV
pub async fn export_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let snapshots = active_view(&state)?;
    let today = Utc::now().date_naive();

    match export::build_rows(&snapshots, &state.staff_name, today) {
        Ok(rows) => {
            info!("Export endpoint called - {} rows exported", rows.len());
            let headers = [
                (
                    header::CONTENT_TYPE,
                    "text/csv; charset=utf-8".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export::filename(today)),
                ),
            ];
            Ok((headers, export::to_csv(&rows)).into_response())
        }
        Err(e) => {
            warn!("Export endpoint called with nothing to export");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}

/// Handle GET /status - return current registry and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let snapshots = state.snapshot().map_err(error_response)?;
    let active_timer = snapshots.iter().find(|s| s.is_active).map(|s| s.id);
    let archived_count = snapshots.iter().filter(|s| s.is_archived).count();
    let timers = snapshots.into_iter().filter(|s| !s.is_archived).collect();

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers,
        active_timer,
        archived_count,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - stream snapshot frames as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snapshots = rx.borrow().clone();
        let event = Event::default().json_data(&snapshots).ok()?;
        Some((Ok::<_, Infallible>(event), rx))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
