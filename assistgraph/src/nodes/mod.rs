//! Node executors of the agent graph: chatbot, human, tools and code execution.
//!
//! Each node implements `Node<ConversationState>`, computes a [`StateUpdate`]
//! and merges it into the state it returns. Tool failures never abort a turn:
//! they become error tool messages the model can react to.
//!
//! [`StateUpdate`]: crate::state::StateUpdate

mod chatbot;
mod code;
mod human;
mod tool;

pub use chatbot::ChatbotNode;
pub use code::CodeExecutorNode;
pub use human::{HumanNode, NO_HUMAN_RESPONSE};
pub use tool::ToolNode;

use serde_json::Value;

use crate::message::{Message, ToolCall, ToolMessage};
use crate::tool_source::ToolSourceError;

/// Template for error tool messages; content always starts with `Error:`.
pub const TOOL_ERROR_TEMPLATE: &str = "Error: {error}\n Please fix your mistakes.";

/// Truncates a string for logging, appending "..." if longer than max_len.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Parses a call's JSON argument text; blank text means no arguments.
pub(crate) fn parse_arguments(call: &ToolCall) -> Result<Value, ToolSourceError> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&call.arguments).map_err(|e| {
        ToolSourceError::InvalidInput(format!("malformed arguments for {}: {}", call.name, e))
    })
}

/// Tool message answering `call` with either the result text or an error payload.
pub(crate) fn tool_result(call: &ToolCall, outcome: Result<String, ToolSourceError>) -> Message {
    let (content, is_error) = match outcome {
        Ok(text) => (text, false),
        Err(e) => {
            tracing::warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
            (TOOL_ERROR_TEMPLATE.replace("{error}", &e.to_string()), true)
        }
    };
    Message::Tool(ToolMessage {
        call_id: call.id.clone(),
        name: Some(call.name.clone()),
        content,
        is_error,
    })
}
