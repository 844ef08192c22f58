//! Session runner: start and resume conversations keyed by session id.

use std::sync::Arc;

use tracing::info;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, RunOutcome, StateSnapshot};
use crate::llm::LlmClient;
use crate::memory::{CheckpointError, Checkpointer, MemorySaver, RunnableConfig};
use crate::message::{Message, ToolMessage};
use crate::policy::{NodeId, TOOL_REQUEST_ASSISTANCE};
use crate::state::ConversationState;
use crate::tool_source::{ToolSource, ToolSourceError};
use crate::tools::CodeExecutor;

use super::builder::build_agent_graph;
use super::config::AgentConfig;

/// Error type for AgentRunner build/start/resume operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("tool source error: {0}")]
    ToolSource(#[from] ToolSourceError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
}

impl RunError {
    /// Whether retrying the same call can succeed (model or storage hiccup).
    pub fn is_retryable(&self) -> bool {
        match self {
            RunError::Execution(e) => e.is_retryable(),
            RunError::Checkpoint(CheckpointError::Storage(_)) => true,
            _ => false,
        }
    }
}

/// Agent session runner: owns the compiled graph and its checkpointer.
///
/// Every session is a checkpoint thread; the session id is the thread id.
///
/// # Example
///
/// ```ignore
/// let runner = AgentRunner::new(llm, tools, None, None, AgentConfig::default()).await?;
/// let outcome = runner.start("s1", "What's the weather in Tokyo?").await?;
/// if outcome.is_interrupted() {
///     runner.resume("s1", Some("An expert will call you.".into())).await?;
/// }
/// ```
pub struct AgentRunner {
    compiled: CompiledStateGraph<ConversationState>,
}

impl AgentRunner {
    /// Builds the agent graph. Without a checkpointer, sessions live in a `MemorySaver`,
    /// which only pauses when `config.ephemeral_sessions` is set or the interrupt set is empty.
    pub async fn new(
        llm: Arc<dyn LlmClient>,
        tool_source: Arc<dyn ToolSource>,
        code_executor: Option<Arc<dyn CodeExecutor>>,
        checkpointer: Option<Arc<dyn Checkpointer<ConversationState>>>,
        config: AgentConfig,
    ) -> Result<Self, RunError> {
        let checkpointer = checkpointer.unwrap_or_else(|| {
            Arc::new(MemorySaver::new()) as Arc<dyn Checkpointer<ConversationState>>
        });
        let compiled =
            build_agent_graph(llm, tool_source, code_executor, Some(checkpointer), &config).await?;
        Ok(Self { compiled })
    }

    /// Wraps an already compiled agent graph (must have a checkpointer).
    pub fn from_compiled(compiled: CompiledStateGraph<ConversationState>) -> Self {
        Self { compiled }
    }

    pub fn compiled(&self) -> &CompiledStateGraph<ConversationState> {
        &self.compiled
    }

    /// Runs one user turn of `session_id` until the graph ends or pauses.
    ///
    /// Continues the persisted conversation when one exists, otherwise starts
    /// from a state holding only this message.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the session is paused before a node other than the
    /// chatbot (call [`resume`](Self::resume)) or its state breaks an invariant;
    /// model and persistence errors abort the turn.
    ///
    /// A turn whose model call failed stays pending before the chatbot; calling
    /// `start` again retries it. The user message is not appended twice when it
    /// is the same one.
    pub async fn start(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> Result<RunOutcome<ConversationState>, RunError> {
        let config = RunnableConfig::for_thread(session_id);
        let state = match self.compiled.get_state(&config).await? {
            Some(snapshot) => match snapshot.next.as_deref() {
                None => {
                    let mut state = snapshot.values;
                    state.messages.push(Message::user(user_message));
                    state
                }
                Some(next) if next == NodeId::Chatbot.as_str() => {
                    retry_turn(snapshot.values, session_id, user_message)
                }
                Some(next) => {
                    return Err(AgentError::InvalidState(format!(
                        "session {} is paused before {}; resume it instead",
                        session_id, next
                    ))
                    .into())
                }
            },
            None => ConversationState::from_user(user_message),
        };
        state.validate()?;
        info!(session_id, messages = state.messages.len(), "starting turn");
        Ok(self.compiled.invoke(state, Some(config)).await?)
    }

    /// Continues a paused session.
    ///
    /// With `human_response`, the response is injected as the answer to the
    /// escalation call before the human node runs; without it, the human node
    /// records that nobody answered.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the session does not exist, is not paused, or a
    /// response is given while it is not waiting for a human.
    pub async fn resume(
        &self,
        session_id: &str,
        human_response: Option<String>,
    ) -> Result<RunOutcome<ConversationState>, RunError> {
        let config = RunnableConfig::for_thread(session_id);
        let snapshot = self.compiled.get_state(&config).await?.ok_or_else(|| {
            AgentError::InvalidState(format!("unknown session {}", session_id))
        })?;
        let next = snapshot.next.clone().ok_or_else(|| {
            AgentError::InvalidState(format!("session {} is not paused", session_id))
        })?;
        snapshot.values.validate()?;

        if let Some(response) = human_response {
            let state = inject_human_response(snapshot.values, &next, response)?;
            state.validate()?;
            self.compiled.update_state(&config, state).await?;
        }
        info!(session_id, next = %next, "resuming session");
        Ok(self.compiled.resume(config).await?)
    }

    /// Latest persisted snapshot of `session_id`.
    pub async fn state(
        &self,
        session_id: &str,
    ) -> Result<Option<StateSnapshot<ConversationState>>, RunError> {
        Ok(self
            .compiled
            .get_state(&RunnableConfig::for_thread(session_id))
            .await?)
    }
}

/// State for retrying a turn that stopped before the chatbot ran.
fn retry_turn(
    mut state: ConversationState,
    session_id: &str,
    user_message: &str,
) -> ConversationState {
    let same_message = matches!(
        state.last_message(),
        Some(Message::User { content }) if content == user_message
    );
    if !same_message {
        state.messages.push(Message::user(user_message));
    }
    info!(session_id, same_message, "retrying pending turn");
    state
}

fn inject_human_response(
    mut state: ConversationState,
    next: &str,
    response: String,
) -> Result<ConversationState, AgentError> {
    if next != NodeId::Human.as_str() || !state.ask_human {
        return Err(AgentError::InvalidState(format!(
            "session is paused before {}, not waiting for a human",
            next
        )));
    }
    if state.last_message().is_some_and(Message::is_tool) {
        return Err(AgentError::InvalidState(
            "escalation has already been answered".into(),
        ));
    }
    let call_id = state
        .last_assistant()
        .and_then(|a| a.first_tool_call())
        .map(|c| c.id.clone())
        .ok_or_else(|| AgentError::InvalidState("no escalation call to answer".into()))?;
    state.messages.push(Message::Tool(ToolMessage {
        call_id,
        name: Some(TOOL_REQUEST_ASSISTANCE.to_string()),
        content: response,
        is_error: false,
    }));
    Ok(state)
}
