//! Code-execution node: runs `run_python_code` calls against a CodeExecutor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::ToolCall;
use crate::policy::{NodeId, TOOL_RUN_PYTHON_CODE};
use crate::state::{ConversationState, StateUpdate};
use crate::tool_source::ToolSourceError;
use crate::tools::CodeExecutor;

use super::{parse_arguments, tool_result, truncate_for_log};

/// Executes each pending `run_python_code` call with its `code` argument and
/// appends the output (or an error result). Calls naming other tools are
/// answered with an error. Clears both flags.
///
/// **Interaction**: Implements `Node<ConversationState>`; consumes `CodeExecutor`
/// (e.g. `PythonDataFrameExecutor`).
pub struct CodeExecutorNode {
    executor: Arc<dyn CodeExecutor>,
}

impl CodeExecutorNode {
    pub fn new(executor: Arc<dyn CodeExecutor>) -> Self {
        Self { executor }
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolSourceError> {
        if call.name != TOOL_RUN_PYTHON_CODE {
            return Err(ToolSourceError::NotFound(call.name.clone()));
        }
        let args = parse_arguments(call)?;
        let code = args
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing code".to_string()))?;
        self.executor.run(code).await
    }
}

#[async_trait]
impl Node<ConversationState> for CodeExecutorNode {
    fn id(&self) -> &str {
        NodeId::CodeExecutor.as_str()
    }

    async fn run(&self, state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let calls = state.pending_tool_calls().to_vec();
        let mut messages = Vec::with_capacity(calls.len());
        for call in &calls {
            let outcome = self.execute(call).await;
            if let Ok(text) = &outcome {
                debug!(call_id = %call.id, preview = %truncate_for_log(text, 200), "code executed");
            }
            messages.push(tool_result(call, outcome));
        }
        Ok((state.with_update(StateUpdate::clearing_flags(messages)), Next::Continue))
    }
}
