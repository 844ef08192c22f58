//! Agent execution error types.
//!
//! Returned by `Node::run` and by the graph runner. Only `ModelInvocation` and
//! `Persistence` are expected to abort a conversation turn; tool failures never
//! reach this type because tool nodes turn them into error-bearing tool messages.

use thiserror::Error;

/// Agent execution error.
///
/// Returned by `Node::run`, `CompiledStateGraph::invoke` / `resume` and the
/// session runner when a step cannot complete.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The language model service was unavailable or returned malformed output.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// A checkpoint could not be loaded or saved.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// State violated an invariant at the state-machine boundary.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// More node executions than the configured recursion limit in one invocation.
    #[error("recursion limit of {0} reached without hitting a stop condition")]
    RecursionLimit(usize),

    /// Execution failed with a message (e.g. unknown node at runtime).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl AgentError {
    /// Whether re-running the session from its last checkpoint can succeed.
    ///
    /// Model and persistence failures leave the checkpoint at the last node
    /// that completed, so the caller may retry them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelInvocation(_) | Self::Persistence(_))
    }
}

impl From<crate::memory::CheckpointError> for AgentError {
    fn from(e: crate::memory::CheckpointError) -> Self {
        AgentError::Persistence(e.to_string())
    }
}
