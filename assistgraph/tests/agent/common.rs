//! Shared collaborators for agent integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use assistgraph::{
    AgentConfig, AgentRunner, CodeExecutor, LlmResponse, Message, MockLlm, MockToolSource,
    ToolCall, ToolSourceError,
};

pub fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

pub fn calls_turn(calls: Vec<ToolCall>) -> LlmResponse {
    LlmResponse::with_calls("", calls)
}

/// Runner over a scripted model and the mock search tool, with sessions in memory.
pub async fn runner(
    llm: Arc<MockLlm>,
    tools: Arc<MockToolSource>,
    config: AgentConfig,
) -> AgentRunner {
    AgentRunner::new(llm, tools, None, None, config.with_ephemeral_sessions(true))
        .await
        .expect("agent builds")
}

/// Code executor returning a fixed output and recording what it ran.
#[derive(Default)]
pub struct FixedExecutor {
    pub ran: Mutex<Vec<String>>,
}

#[async_trait]
impl CodeExecutor for FixedExecutor {
    async fn run(&self, code: &str) -> Result<String, ToolSourceError> {
        self.ran.lock().unwrap().push(code.to_string());
        Ok("891".to_string())
    }
}

/// (role, content) pairs, for compact assertions on the history.
pub fn transcript(messages: &[Message]) -> Vec<(&'static str, String)> {
    messages
        .iter()
        .map(|m| (m.role(), m.content().to_string()))
        .collect()
}
