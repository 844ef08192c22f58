//! Tool node: executes every pending tool call against a ToolSource.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::policy::{NodeId, TurnPolicy};
use crate::state::{ConversationState, StateUpdate};
use crate::tool_source::{ToolSource, ToolSourceError};

use super::{parse_arguments, tool_result, truncate_for_log};

/// Runs the pending calls of the last assistant message in order and appends
/// one tool message per call, tagged with its call id.
///
/// Every failure (unknown tool, malformed arguments, adapter error) becomes an
/// error tool message; the node itself only fails on state it cannot read.
/// A call naming a tool the policy routes to its own node is answered with an
/// error, since such tools must be the only call of their turn. Clears both flags.
///
/// **Interaction**: Implements `Node<ConversationState>`; consumes `ToolSource`
/// (e.g. `AggregateToolSource`, `MockToolSource`).
pub struct ToolNode {
    tool_source: Arc<dyn ToolSource>,
    policy: TurnPolicy,
}

impl ToolNode {
    pub fn new(tool_source: Arc<dyn ToolSource>, policy: TurnPolicy) -> Self {
        Self {
            tool_source,
            policy,
        }
    }
}

#[async_trait]
impl Node<ConversationState> for ToolNode {
    fn id(&self) -> &str {
        NodeId::Tools.as_str()
    }

    async fn run(&self, state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let calls = state.pending_tool_calls().to_vec();
        let mut messages = Vec::with_capacity(calls.len());
        for call in &calls {
            let outcome = if self.policy.is_routed_tool(&call.name) {
                Err(ToolSourceError::InvalidInput(format!(
                    "{} must be the only tool call in its turn",
                    call.name
                )))
            } else {
                match parse_arguments(call) {
                    Ok(args) => self
                        .tool_source
                        .call_tool(&call.name, args)
                        .await
                        .map(|c| c.text),
                    Err(e) => Err(e),
                }
            };
            if let Ok(text) = &outcome {
                debug!(
                    tool = %call.name,
                    call_id = %call.id,
                    preview = %truncate_for_log(text, 200),
                    "tool call ok"
                );
            }
            messages.push(tool_result(call, outcome));
        }
        Ok((state.with_update(StateUpdate::clearing_flags(messages)), Next::Continue))
    }
}
