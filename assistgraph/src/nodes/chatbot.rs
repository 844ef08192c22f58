//! Chatbot node: one model turn per execution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::AssistantMessage;
use crate::message::Message;
use crate::policy::{NodeId, TurnPolicy};
use crate::state::{ConversationState, StateUpdate};
use crate::tool_source::ToolSpec;

/// Invokes the model with the full history and the advertised tools, appends
/// exactly one assistant message and sets the routing flags from its first
/// tool call.
///
/// When the first call is routed to the human or code node, any further calls
/// in the same message are dropped so every call left in the history gets an
/// answer. Model failures propagate unchanged (`AgentError::ModelInvocation`).
///
/// **Interaction**: Implements `Node<ConversationState>`; consumes `LlmClient`;
/// its flags drive `TurnPolicy::select_next_node`.
pub struct ChatbotNode {
    llm: Arc<dyn LlmClient>,
    advertised_tools: Vec<ToolSpec>,
    policy: TurnPolicy,
}

impl ChatbotNode {
    pub fn new(llm: Arc<dyn LlmClient>, advertised_tools: Vec<ToolSpec>, policy: TurnPolicy) -> Self {
        Self {
            llm,
            advertised_tools,
            policy,
        }
    }

    pub fn advertised_tools(&self) -> &[ToolSpec] {
        &self.advertised_tools
    }
}

#[async_trait]
impl Node<ConversationState> for ChatbotNode {
    fn id(&self) -> &str {
        NodeId::Chatbot.as_str()
    }

    async fn run(&self, state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let response = self
            .llm
            .invoke(&state.messages, &self.advertised_tools)
            .await?;

        let mut message = AssistantMessage {
            content: response.content,
            tool_calls: response.tool_calls,
        };
        for (i, call) in message.tool_calls.iter_mut().enumerate() {
            if call.id.is_empty() {
                call.id = format!("call_{}_{}", state.messages.len(), i);
            }
        }

        let (ask_human, execute_code) = self.policy.inspect_first_call(&message);
        if (ask_human || execute_code) && message.tool_calls.len() > 1 {
            let dropped: Vec<&str> = message.tool_calls[1..]
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            warn!(
                first = %message.tool_calls[0].name,
                ?dropped,
                "dropping tool calls that follow a routed call"
            );
            message.tool_calls.truncate(1);
        }
        debug!(
            tool_calls = message.tool_calls.len(),
            ask_human, execute_code, "chatbot turn"
        );

        let update = StateUpdate {
            messages: vec![Message::Assistant(message)],
            ask_human: Some(ask_human),
            execute_code: Some(execute_code),
        };
        Ok((state.with_update(update), Next::Continue))
    }
}
