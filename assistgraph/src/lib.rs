//! # assistgraph
//!
//! A small conversational agent graph: a chatbot node backed by a chat model,
//! a web-search tool, an optional dataset code-execution tool and a
//! human-escalation path that pauses the run until someone answers.
//!
//! ## Design Principles
//!
//! - **Single state type**: [`ConversationState`] (message history plus the
//!   `ask_human` / `execute_code` routing flags) flows through every node.
//! - **One policy**: [`TurnPolicy`] decides what runs after the chatbot; the
//!   code-execution branch is a switch on the policy, not a separate agent.
//! - **Durable pauses**: the graph checkpoints after every node, so a run
//!   paused before the human node can be resumed by another process.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Next`: build and run state graphs
//!   with conditional edges, interrupts and resume.
//! - [`policy`]: turn routing (`TurnPolicy`, `NodeId`, tool name constants).
//! - [`nodes`]: `ChatbotNode`, `HumanNode`, `ToolNode`, `CodeExecutorNode`.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, and `ChatOpenAI` (feature `openai`).
//! - [`tool_source`] / [`tools`]: tool specs, `TavilySearch`, `PythonDataFrameExecutor`.
//! - [`memory`]: checkpointing (`MemorySaver`, `SqliteSaver` with feature `sqlite`).
//! - [`agent`]: `build_agent_graph` and the session-level `AgentRunner`.
//!
//! ## Features
//!
//! - `sqlite` (default): persistent checkpointer.
//! - `openai`: OpenAI-compatible chat client via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use assistgraph::{AgentConfig, AgentRunner, LlmResponse, MockLlm, MockToolSource};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::text("Hello!")]));
//! let tools = Arc::new(MockToolSource::default());
//! let runner = AgentRunner::new(llm, tools, None, None, AgentConfig::default()).await?;
//! let outcome = runner.start("session-1", "hi").await?;
//! println!("{}", outcome.state().messages.len());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod nodes;
pub mod policy;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::{build_agent_graph, AgentConfig, AgentRunner, RunError};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, NodeMiddleware,
    RunOutcome, StateGraph, StateSnapshot, END, START,
};
pub use llm::{LlmClient, LlmResponse, MockLlm, ToolChoiceMode};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, JsonSerializer, MemorySaver, RunnableConfig,
};
#[cfg(feature = "sqlite")]
pub use memory::SqliteSaver;
pub use message::{AssistantMessage, Message, ToolCall, ToolMessage};
pub use nodes::{ChatbotNode, CodeExecutorNode, HumanNode, ToolNode, NO_HUMAN_RESPONSE};
pub use policy::{
    tools_condition, NodeId, TurnPolicy, TOOL_REQUEST_ASSISTANCE, TOOL_RUN_PYTHON_CODE,
    TOOL_WEB_SEARCH,
};
pub use state::{ConversationState, StateUpdate};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{AggregateToolSource, CodeExecutor, PythonDataFrameExecutor, TavilySearch};
