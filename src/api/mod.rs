//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", post(add_handler).get(list_handler))
        .route("/timers/:id", put(edit_handler))
        .route("/timers/:id/toggle", post(toggle_handler))
        .route("/timers/:id/archive", post(archive_handler))
        .route("/timers/:id/restore", post(restore_handler))
        .route("/clear", post(clear_handler))
        .route("/export", get(export_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
