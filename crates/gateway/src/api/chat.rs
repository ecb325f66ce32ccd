//! The chat endpoint: accept a user message, run a turn, stream events.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::Stream;
use serde::Deserialize;
use serde_json::json;

use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

/// POST /api/v1/agent/chat/:session_id
///
/// Runs one agent turn and streams its progress as server-sent events,
/// each frame a bare `data: <json>` line. The stream closes when the turn
/// reaches a terminal state; there is no explicit end-of-turn event.
pub async fn chat_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<ChatBody>,
) -> Response {
    // Serialize turns per session: wait for any in-flight turn to finish.
    let permit = match state.session_locks.acquire(&session_id).await {
        Ok(permit) => permit,
        Err(e) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    tracing::info!(session_id = %session_id, "chat turn started");

    let rx = run_turn(
        state.clone(),
        TurnInput {
            session_id,
            user_message: body.message,
        },
        permit,
    );

    Sse::new(event_stream(rx)).into_response()
}

fn event_stream(
    mut rx: tokio::sync::mpsc::Receiver<ie_domain::event::TurnEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(data) => yield Ok(Event::default().data(data)),
                Err(e) => tracing::error!(error = %e, "failed to encode turn event"),
            }
        }
    }
}
