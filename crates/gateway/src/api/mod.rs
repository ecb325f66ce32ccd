//! Route table and top-level handlers.

pub mod chat;
pub mod sessions;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/api/v1/agent/chat/:session_id", post(chat::chat_stream))
        .route("/api/v1/agent/sessions", get(sessions::list_sessions))
        .route(
            "/api/v1/agent/sessions/:session_id/messages",
            get(sessions::get_messages),
        )
        .route(
            "/api/v1/agent/sessions/:session_id",
            put(sessions::rename_session).delete(sessions::delete_session),
        )
        .route(
            "/api/v1/agent/sessions/:session_id/stop",
            post(sessions::stop_session),
        )
}

async fn liveness() -> Json<serde_json::Value> {
    Json(json!({
        "status": "Agent API is live",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
