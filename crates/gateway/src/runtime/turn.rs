//! Turn orchestration: drive the agent loop, stream progress events, and
//! persist the finished turn.
//!
//! The turn runs in a detached task so it survives the client dropping the
//! stream mid-turn. Events are pushed into an mpsc channel; if the receiver
//! is gone the sends are ignored and the turn finishes anyway, so the turn
//! is still committed and visible in the history on the next fetch.

use ie_domain::event::TurnEvent;
use ie_domain::message::Role;
use ie_domain::{Error, Result};
use tokio::sync::mpsc;
use tokio::sync::OwnedSemaphorePermit;

use crate::runtime::agent_loop::{AgentLoop, AgentStatus};
use crate::runtime::cancel::CancelToken;
use crate::runtime::context::build_context;
use crate::state::AppState;

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct TurnInput {
    pub session_id: String,
    pub user_message: String,
}

/// Start a turn for a session and return the stream of progress events.
///
/// The caller must already hold the session's run lock; the permit is
/// moved into the turn task and released when the turn finishes, not when
/// the HTTP response does.
pub fn run_turn(
    state: AppState,
    input: TurnInput,
    permit: OwnedSemaphorePermit,
) -> mpsc::Receiver<TurnEvent> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let cancel = state.cancel_map.register(&input.session_id);

    tokio::spawn(async move {
        let _permit = permit;
        let session_id = input.session_id.clone();

        let outcome = drive_turn(&state, input, &tx, &cancel).await;
        state.cancel_map.remove(&session_id);

        match outcome {
            Ok(()) => tracing::debug!(session_id = %session_id, "turn finished"),
            Err(e) => tracing::error!(session_id = %session_id, error = %e, "turn failed"),
        }
    });

    rx
}

async fn drive_turn(
    state: &AppState,
    input: TurnInput,
    tx: &mpsc::Sender<TurnEvent>,
    cancel: &CancelToken,
) -> Result<()> {
    let history = state.sessions.list_messages(&input.session_id).await?;
    let context = build_context(
        &history,
        &input.user_message,
        state.config.context.max_history_chars,
    );

    let agent = AgentLoop::new(state.model.clone(), state.tools.clone());
    let mut agent_state = agent.start(context);

    let max_rounds = state.config.agent.max_rounds;
    let mut rounds = 0usize;
    let mut final_text = String::new();
    let mut cancelled = false;

    while !agent_state.is_terminal() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        if agent_state.status() == AgentStatus::Reasoning {
            if rounds == max_rounds {
                // The user message still counts as part of the
                // conversation even though no answer was produced.
                state
                    .sessions
                    .commit_turn(&input.session_id, &input.user_message, None)
                    .await?;
                return Err(Error::RoundLimit(max_rounds));
            }
            rounds += 1;
        }

        agent_state = agent.step(agent_state).await?;

        if let Some(latest) = agent_state.latest() {
            if latest.has_tool_calls() {
                let _ = tx.send(TurnEvent::tool_notice()).await;
            } else if latest.role == Role::Assistant && !latest.content.is_empty() {
                // Provisional final answer; overwritten if the model
                // keeps going, committed as the ai message otherwise.
                final_text = latest.content.clone();
                let _ = tx.send(TurnEvent::text(latest.content.as_str())).await;
            }
        }
    }

    let answer = (!cancelled && !final_text.is_empty()).then_some(final_text.as_str());
    state
        .sessions
        .commit_turn(&input.session_id, &input.user_message, answer)
        .await?;

    if cancelled {
        tracing::info!(session_id = %input.session_id, rounds, "turn cancelled");
    }
    Ok(())
}
