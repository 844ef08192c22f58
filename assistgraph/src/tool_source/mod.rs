//! Tool source abstraction: list tools and call a tool by name.
//!
//! The tools node depends on `ToolSource` instead of concrete adapters. Tool
//! specs are also what the chatbot advertises to the model. Escalation and
//! code execution are advertised through [`request_assistance_spec`] and
//! [`run_python_code_spec`] but handled by dedicated nodes.

mod mock;
mod specs;

pub use mock::MockToolSource;
pub use specs::{request_assistance_spec, run_python_code_spec};

use async_trait::async_trait;
use serde_json::Value;

/// Tool specification advertised to the model (name, description, JSON schema).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Text result of a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Tool adapter failure. Always absorbed into an error tool message by the nodes.
#[derive(Debug, thiserror::Error)]
pub enum ToolSourceError {
    /// The model asked for a tool nobody serves.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Missing or malformed arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Network or process plumbing failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The tool ran and reported a failure.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Source of callable tools.
///
/// **Interaction**: Used by `ToolNode` for `call_tool` and by agent assembly
/// for `list_tools` (the advertised tool set).
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError>;
}
