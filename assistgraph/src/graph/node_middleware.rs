//! Node middleware: wraps every node run of a compiled graph.
//!
//! Attach with `StateGraph::with_middleware`. `LoggingNodeMiddleware` logs
//! node enter/exit through `tracing`.

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// Boxed future produced by the wrapped node run.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(S, Next), AgentError>> + Send>>;

/// Around-advice for node execution.
///
/// `inner` runs the node itself; implementations may inspect or replace the
/// state before and the result after, but must call `inner` at most once.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: Box<dyn FnOnce(S) -> NodeFuture<S> + Send>,
    ) -> Result<(S, Next), AgentError>;
}

/// Middleware that logs node enter/exit (and errors) around each node run.
pub struct LoggingNodeMiddleware<S> {
    _state: PhantomData<fn() -> S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: Box<dyn FnOnce(S) -> NodeFuture<S> + Send>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = node_id, "enter node");
        let result = inner(state).await;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, "exit node"),
            Err(e) => tracing::warn!(node = node_id, error = %e, "node failed"),
        }
        result
    }
}
