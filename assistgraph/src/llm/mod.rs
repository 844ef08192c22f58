//! Model service abstraction for the chatbot node.
//!
//! The chatbot node depends on a callable that takes the history plus the
//! advertised tools and returns assistant text and optional tool_calls; this
//! module defines the trait, a scripted mock and the OpenAI-compatible client.

mod mock;

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

/// Response from an LLM completion: assistant message text and optional tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; ChatbotNode turns it
/// into one new assistant message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn; empty means a final answer.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }
}

/// LLM client: given messages and the advertised tools, returns assistant text
/// and optional tool_calls.
///
/// Implementations: `MockLlm` (scripted responses), `ChatOpenAI` (real API,
/// feature `openai`). Failures are `AgentError::ModelInvocation`.
///
/// **Interaction**: Used by ChatbotNode.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool_calls.
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError>;
}
