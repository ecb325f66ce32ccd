//! Session management endpoints: list, history, rename, delete, stop.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "session not found" })),
    )
        .into_response()
}

fn internal_error(e: ie_domain::Error) -> Response {
    tracing::error!(error = %e, "session endpoint failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}

/// GET /api/v1/agent/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Response {
    let sessions = state.sessions.list();
    Json(json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
    .into_response()
}

/// GET /api/v1/agent/sessions/:session_id/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    if state.sessions.get(&session_id).is_none() {
        return not_found();
    }
    match state.sessions.list_messages(&session_id).await {
        Ok(messages) => Json(json!({ "messages": messages })).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub title: String,
}

/// PUT /api/v1/agent/sessions/:session_id
pub async fn rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Response {
    match state.sessions.rename(&session_id, &body.title) {
        Ok(session) => Json(session).into_response(),
        Err(ie_domain::Error::SessionNotFound(_)) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/v1/agent/sessions/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.sessions.delete(&session_id) {
        Ok(()) => Json(json!({ "deleted": session_id })).into_response(),
        Err(ie_domain::Error::SessionNotFound(_)) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/v1/agent/sessions/:session_id/stop
///
/// Signals the in-flight turn for this session to wind down. Stopping a
/// session with no running turn is a no-op, reported as `stopped: false`.
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let stopped = state.cancel_map.cancel(&session_id);
    if stopped {
        tracing::info!(session_id = %session_id, "stop requested");
    }
    Json(json!({ "stopped": stopped })).into_response()
}
