//! Conversation messages: system, user, assistant (with tool calls) and tool results.
//!
//! `Message` is what flows through `ConversationState::messages` and what the
//! model client converts to and from its wire format.

use serde::{Deserialize, Serialize};

/// One tool invocation requested by the model.
///
/// `arguments` is the raw JSON text returned by the model; tool nodes parse it
/// when executing so that malformed arguments become an error result instead of
/// a failed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id assigned by the model; tool results reference it.
    pub id: String,
    /// Tool name (e.g. `web_search`, `request_assistance`).
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Assistant turn: text content plus zero or more tool calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantMessage {
    /// First tool call, which alone decides escalation / code execution routing.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

/// Result of one tool call, addressed to the call id it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMessage {
    pub call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
    /// True when `content` carries an error payload instead of a tool result.
    #[serde(default)]
    pub is_error: bool,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant(AssistantMessage),
    Tool(ToolMessage),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Assistant message with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant(AssistantMessage {
            content: content.into(),
            tool_calls: vec![],
        })
    }

    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant(AssistantMessage {
            content: content.into(),
            tool_calls,
        })
    }

    /// Successful tool result for `call_id`.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool(ToolMessage {
            call_id: call_id.into(),
            name: None,
            content: content.into(),
            is_error: false,
        })
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Message::Tool(_))
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(a) => Some(a),
            _ => None,
        }
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::User { content } => content,
            Message::Assistant(a) => &a.content,
            Message::Tool(t) => &t.content,
        }
    }

    /// Role name as used by chat completion APIs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant(_) => "assistant",
            Message::Tool(_) => "tool",
        }
    }
}
