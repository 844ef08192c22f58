//! Scripted LLM for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

use super::{LlmClient, LlmResponse};

/// Mock LLM: returns scripted responses in order; the last one repeats.
///
/// Each call records the message count and advertised tool names it saw so
/// tests can assert on what the chatbot sent.
///
/// **Interaction**: Implements `LlmClient`; used by ChatbotNode tests and agent scenarios.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    last: Mutex<Option<LlmResponse>>,
    failure: Option<String>,
    failures_left: Mutex<usize>,
    seen: Mutex<Vec<(usize, Vec<String>)>>,
}

impl MockLlm {
    /// Responses are returned in order; once exhausted, the last one repeats.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            last: Mutex::new(None),
            failure: None,
            failures_left: Mutex::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with plain text and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse::text(content)])
    }

    /// First turn requests `tool_name` with `arguments`; later turns answer `final_text`.
    pub fn tool_then_answer(
        tool_name: &str,
        arguments: &str,
        final_text: impl Into<String>,
    ) -> Self {
        Self::scripted(vec![
            LlmResponse::with_calls("", vec![ToolCall::new("call_1", tool_name, arguments)]),
            LlmResponse::text(final_text),
        ])
    }

    /// Every call fails with `AgentError::ModelInvocation(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(Vec::new()).with_failures(usize::MAX, message)
    }

    /// The next `times` calls fail with `AgentError::ModelInvocation(message)`
    /// before the script is used.
    pub fn with_failures(mut self, times: usize, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self.failures_left = Mutex::new(times);
        self
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// (message count, advertised tool names) per invocation.
    pub fn seen(&self) -> Vec<(usize, Vec<String>)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((messages.len(), tools.iter().map(|t| t.name.clone()).collect()));
        }
        if let Some(message) = &self.failure {
            let mut left = self
                .failures_left
                .lock()
                .map_err(|_| AgentError::ModelInvocation("mock llm lock poisoned".to_string()))?;
            if *left > 0 {
                *left = left.saturating_sub(1);
                return Err(AgentError::ModelInvocation(message.clone()));
            }
        }
        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::ModelInvocation("mock llm lock poisoned".to_string()))?
            .pop_front();
        let mut last = self
            .last
            .lock()
            .map_err(|_| AgentError::ModelInvocation("mock llm lock poisoned".to_string()))?;
        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None => last
                .clone()
                .ok_or_else(|| AgentError::ModelInvocation("mock llm has no scripted response".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted responses come back in order and the last one repeats.
    #[tokio::test]
    async fn scripted_in_order_then_repeat_last() {
        let llm = MockLlm::tool_then_answer("web_search", "{}", "done");
        let msgs = vec![Message::user("q")];
        let first = llm.invoke(&msgs, &[]).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "web_search");
        assert_eq!(llm.invoke(&msgs, &[]).await.unwrap().content, "done");
        assert_eq!(llm.invoke(&msgs, &[]).await.unwrap().content, "done");
        assert_eq!(llm.call_count(), 3);
    }

    /// **Scenario**: failing() returns ModelInvocation on every call.
    #[tokio::test]
    async fn failing_mock_returns_model_invocation() {
        let llm = MockLlm::failing("service unavailable");
        let err = llm.invoke(&[], &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelInvocation(ref m) if m == "service unavailable"));
    }

    /// **Scenario**: with_failures fails the first calls, then follows the script.
    #[tokio::test]
    async fn transient_failures_then_script() {
        let llm = MockLlm::with_no_tool_calls("back").with_failures(2, "503");
        assert!(llm.invoke(&[], &[]).await.is_err());
        assert!(llm.invoke(&[], &[]).await.is_err());
        assert_eq!(llm.invoke(&[], &[]).await.unwrap().content, "back");
        assert_eq!(llm.call_count(), 3);
    }
}
