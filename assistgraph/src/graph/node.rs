//! Graph node trait: one step in a StateGraph.
//!
//! Receives state `S`, returns updated `S` and `Next` (continue, jump, or end).
//! Used by `StateGraph` and `CompiledStateGraph`.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// The runner uses `Next` to choose the next node: `Continue` follows the
/// node's edges (including conditional edges), `Node(id)` jumps, `End` stops.
///
/// **Interaction**: Registered with `StateGraph::add_node`; executed by
/// `CompiledStateGraph::invoke` / `resume`, optionally wrapped by a `NodeMiddleware`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"chatbot"`, `"tools"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
