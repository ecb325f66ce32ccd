//! The reasoning/acting state machine at the heart of a turn.
//!
//! A turn alternates between two phases: asking the model what to do next
//! (`Reasoning`) and executing the tool calls it requested (`ToolInvoking`).
//! The phase transition is decided by one rule only: did the latest model
//! response carry tool calls? A response with calls means the tools run
//! next; a response without them is the final answer and the turn is done.

use std::sync::Arc;

use ie_domain::message::Message;
use ie_domain::Result;
use ie_providers::{ChatRequest, LanguageModel};
use ie_search::ToolGateway;

/// Phase of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    /// Waiting on the model for the next reasoning step.
    Reasoning,
    /// The latest model response requested tool calls that have not run yet.
    ToolInvoking,
    /// The model produced an answer with no pending tool calls. Terminal.
    Answered,
}

/// Snapshot of a turn in progress: the full message sequence so far plus
/// the current phase. Transitions consume the old state and return a new
/// one with entries appended; nothing already in the sequence is mutated.
pub struct AgentState {
    messages: Vec<Message>,
    status: AgentStatus,
}

impl AgentState {
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message, if any.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_terminal(&self) -> bool {
        self.status == AgentStatus::Answered
    }

    fn appending(mut self, new: Vec<Message>, status: AgentStatus) -> Self {
        self.messages.extend(new);
        self.status = status;
        self
    }
}

/// Drives one turn to completion, one step at a time.
///
/// The loop itself never talks to the network directly — the model and the
/// tool gateway are injected, which is what makes the whole state machine
/// testable with scripted stand-ins.
pub struct AgentLoop {
    model: Arc<dyn LanguageModel>,
    tools: Arc<ToolGateway>,
}

impl AgentLoop {
    pub fn new(model: Arc<dyn LanguageModel>, tools: Arc<ToolGateway>) -> Self {
        Self { model, tools }
    }

    /// Initial state for a turn: the assembled context, ready to reason.
    pub fn start(&self, context: Vec<Message>) -> AgentState {
        AgentState {
            messages: context,
            status: AgentStatus::Reasoning,
        }
    }

    /// Advance the state machine by one step.
    ///
    /// `Reasoning` invokes the model with the full sequence and the tool
    /// catalog; `ToolInvoking` executes every pending call concurrently and
    /// appends the keyed results. Stepping a terminal state returns it
    /// unchanged.
    pub async fn step(&self, state: AgentState) -> Result<AgentState> {
        match state.status {
            AgentStatus::Reasoning => {
                let response = self
                    .model
                    .chat(ChatRequest {
                        messages: state.messages.clone(),
                        tools: self.tools.definitions(),
                        temperature: None,
                    })
                    .await?;

                if response.tool_calls.is_empty() {
                    Ok(state.appending(
                        vec![Message::assistant(response.content)],
                        AgentStatus::Answered,
                    ))
                } else {
                    tracing::debug!(
                        calls = response.tool_calls.len(),
                        "model requested tool calls"
                    );
                    Ok(state.appending(
                        vec![Message::assistant_with_tools(
                            response.content,
                            response.tool_calls,
                        )],
                        AgentStatus::ToolInvoking,
                    ))
                }
            }
            AgentStatus::ToolInvoking => {
                let calls = state
                    .latest()
                    .map(|m| m.tool_calls.clone())
                    .unwrap_or_default();
                let results = self.tools.dispatch_all(&calls).await;
                Ok(state.appending(results, AgentStatus::Reasoning))
            }
            AgentStatus::Answered => Ok(state),
        }
    }
}
