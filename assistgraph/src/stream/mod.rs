//! Streaming types for graph runs.
//!
//! Defines stream modes and events emitted by `CompiledStateGraph::stream`.

use std::fmt::Debug;

/// Stream mode selector: which kinds of per-node events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node completes.
    Values,
    /// Emit incremental updates with node id and state.
    Updates,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Incremental update with the node id and state after that node.
    Updates { node_id: String, state: S },
    /// Run paused before `node_id`; always emitted regardless of mode.
    Interrupted { node_id: String, state: S },
    /// Run failed; always emitted and always last.
    Error(String),
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// State carried by the event, if any.
    pub fn state(&self) -> Option<&S> {
        match self {
            StreamEvent::Values(s) => Some(s),
            StreamEvent::Updates { state, .. } | StreamEvent::Interrupted { state, .. } => {
                Some(state)
            }
            StreamEvent::Error(_) => None,
        }
    }
}
