//! Mock ToolSource for tests.
//!
//! Returns a fixed tool list and a fixed call result, or fails every call.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::policy::TOOL_WEB_SEARCH;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: fixed tool list and fixed call result.
///
/// `call_tool` rejects names that are not listed with `NotFound`, then returns
/// the configured text, or `Execution` when built with [`MockToolSource::failing`].
/// Every call is recorded for assertions.
///
/// **Interaction**: Implements `ToolSource`; used by ToolNode tests and agent scenarios.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    call_result: Result<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// Lists one tool `web_search` and returns a fixed search payload on call.
    pub fn web_search_example() -> Self {
        Self::new(
            vec![ToolSpec {
                name: TOOL_WEB_SEARCH.to_string(),
                description: Some("Search the web.".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            }],
            r#"[{"title":"Tokyo weather","url":"https://example.com/tokyo","snippet":"Sunny, 22C"}]"#
                .to_string(),
        )
    }

    /// Creates a mock with custom tool list and fixed call result.
    pub fn new(tools: Vec<ToolSpec>, call_result: String) -> Self {
        Self {
            tools,
            call_result: Ok(call_result),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Same tool list as [`web_search_example`](Self::web_search_example), but every call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            call_result: Err(message.into()),
            ..Self::web_search_example()
        }
    }

    /// Set the text returned by call_tool (builder style).
    pub fn with_call_result(mut self, text: String) -> Self {
        self.call_result = Ok(text);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockToolSource {
    fn default() -> Self {
        Self::web_search_example()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        match &self.call_result {
            Ok(text) => Ok(ToolCallContent { text: text.clone() }),
            Err(message) => Err(ToolSourceError::Execution(message.clone())),
        }
    }
}
