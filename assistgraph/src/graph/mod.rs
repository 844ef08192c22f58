//! State graph: nodes, static and conditional edges, compile and invoke.
//!
//! Aligns with LangGraph `StateGraph`: add nodes and edges, compile (optionally
//! with a checkpointer and an interrupt set), then invoke with state or resume
//! a paused thread.

mod compile_error;
mod compiled;
pub(crate) mod logging;
mod next;
mod node;
mod node_middleware;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, RunOutcome, StateSnapshot, DEFAULT_RECURSION_LIMIT};
pub use next::Next;
pub use node::Node;
pub use node_middleware::{LoggingNodeMiddleware, NodeFuture, NodeMiddleware};
pub use state_graph::{Router, StateGraph, END, START};
