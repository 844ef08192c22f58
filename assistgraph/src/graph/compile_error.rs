//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when edges reference unknown nodes, the
//! entry point is ambiguous, or interrupts are configured without persistence.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge or path map was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START, or more than one such edge.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// A node has more than one outgoing edge (static or conditional).
    #[error("node has more than one outgoing edge: {0}")]
    DuplicateEdge(String),

    /// A node has no outgoing edge, so `Next::Continue` would have nowhere to go.
    #[error("node has no outgoing edge: {0}")]
    MissingEdge(String),

    /// An interrupt was configured for a node that does not exist.
    #[error("interrupt configured for unknown node: {0}")]
    InvalidInterrupt(String),

    /// Interrupts need durable state between pause and resume.
    #[error("interrupt_before requires a checkpointer")]
    CheckpointerRequired,
}
