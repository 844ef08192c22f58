//! A single named tool.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};

/// One tool: name, spec advertised to the model, and the call itself.
///
/// **Interaction**: Registered into `AggregateToolSource`, which routes
/// `ToolSource::call_tool` by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError>;
}
