//! Human node: resumption point after a pause for human input.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::{Message, ToolMessage};
use crate::policy::{NodeId, TOOL_REQUEST_ASSISTANCE};
use crate::state::{ConversationState, StateUpdate};

/// Answer recorded when the run resumes without an injected human response.
pub const NO_HUMAN_RESPONSE: &str = "No response from human.";

/// Keeps the conversation well-formed after escalation.
///
/// When the last message is not a tool message (nobody injected a response
/// while the run was paused), appends [`NO_HUMAN_RESPONSE`] addressed to the
/// escalation call. Always clears both routing flags. Running it twice in a
/// row appends at most one message.
pub struct HumanNode;

#[async_trait]
impl Node<ConversationState> for HumanNode {
    fn id(&self) -> &str {
        NodeId::Human.as_str()
    }

    async fn run(&self, state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let mut messages = Vec::new();
        if !state.last_message().is_some_and(Message::is_tool) {
            match state.last_assistant().and_then(|a| a.first_tool_call()) {
                Some(call) => {
                    debug!(call_id = %call.id, "no human response injected");
                    messages.push(Message::Tool(ToolMessage {
                        call_id: call.id.clone(),
                        name: Some(TOOL_REQUEST_ASSISTANCE.to_string()),
                        content: NO_HUMAN_RESPONSE.to_string(),
                        is_error: false,
                    }));
                }
                None => warn!("human node reached without an escalation call"),
            }
        }
        Ok((state.with_update(StateUpdate::clearing_flags(messages)), Next::Continue))
    }
}
