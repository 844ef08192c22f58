//! Conversation state threaded through every node of the agent graph.
//!
//! Nodes never mutate state in place: they return a [`StateUpdate`] which
//! [`ConversationState::apply`] merges (messages appended, flags overwritten).

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::{AssistantMessage, Message, ToolCall};
use crate::policy::{TOOL_REQUEST_ASSISTANCE, TOOL_RUN_PYTHON_CODE};

/// The only entity of the agent: full message history plus the two routing flags.
///
/// `ask_human` is true only between the chatbot requesting escalation and the
/// human node clearing it; `execute_code` likewise for code execution. At most
/// one of them is true at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub ask_human: bool,
    #[serde(default)]
    pub execute_code: bool,
}

/// Partial update returned by a node.
///
/// `messages` are appended; a flag is overwritten only when `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub ask_human: Option<bool>,
    pub execute_code: Option<bool>,
}

impl StateUpdate {
    /// Update that appends `messages` and clears both routing flags.
    pub fn clearing_flags(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ask_human: Some(false),
            execute_code: Some(false),
        }
    }
}

impl ConversationState {
    /// Fresh state holding a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ask_human: false,
            execute_code: false,
        }
    }

    /// Merges a node's partial update into this state.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(v) = update.ask_human {
            self.ask_human = v;
        }
        if let Some(v) = update.execute_code {
            self.execute_code = v;
        }
    }

    /// Consuming variant of [`apply`](Self::apply), convenient inside nodes.
    pub fn with_update(mut self, update: StateUpdate) -> Self {
        self.apply(update);
        self
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent assistant message anywhere in the history.
    pub fn last_assistant(&self) -> Option<&AssistantMessage> {
        self.messages.iter().rev().find_map(Message::as_assistant)
    }

    /// Tool calls still waiting for results: those of the last message when it
    /// is an assistant message, otherwise none.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(Message::Assistant(a)) => &a.tool_calls,
            _ => &[],
        }
    }

    /// Checks the invariants the graph relies on.
    ///
    /// Called at the session boundary (new input, loaded checkpoint, injected
    /// human response) so a corrupted or hand-edited state fails loudly.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.ask_human && self.execute_code {
            return Err(AgentError::InvalidState(
                "ask_human and execute_code are both set".into(),
            ));
        }

        let mut issued: Vec<&str> = Vec::new();
        for (i, m) in self.messages.iter().enumerate() {
            match m {
                Message::Assistant(a) => issued.extend(a.tool_calls.iter().map(|c| c.id.as_str())),
                Message::Tool(t) => {
                    if !issued.contains(&t.call_id.as_str()) {
                        return Err(AgentError::InvalidState(format!(
                            "tool message at index {} answers unknown call id {}",
                            i, t.call_id
                        )));
                    }
                }
                _ => {}
            }
        }

        let first_call = self.last_assistant().and_then(|a| a.first_tool_call());
        if self.ask_human && first_call.map(|c| c.name.as_str()) != Some(TOOL_REQUEST_ASSISTANCE) {
            return Err(AgentError::InvalidState(
                "ask_human is set but the last assistant message did not request assistance".into(),
            ));
        }
        if self.execute_code && first_call.map(|c| c.name.as_str()) != Some(TOOL_RUN_PYTHON_CODE) {
            return Err(AgentError::InvalidState(
                "execute_code is set but the last assistant message did not request code execution"
                    .into(),
            ));
        }
        Ok(())
    }
}
