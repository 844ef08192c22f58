//! ToolSource over a set of registered tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

use super::Tool;

/// Routes `call_tool` to the registered tool with a matching name.
///
/// `list_tools` returns specs in registration order. Registering a name twice
/// replaces the earlier tool.
#[derive(Default, Clone)]
pub struct AggregateToolSource {
    tools: Vec<Arc<dyn Tool>>,
}

impl AggregateToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolSource for AggregateToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.iter().map(|t| t.spec()).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        tool.call(arguments).await
    }
}
