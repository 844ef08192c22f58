//! Checkpointer trait and errors.
//!
//! Aligns with LangGraph BaseCheckpointSaver (put, get_tuple, list).

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::config::RunnableConfig;

/// Error for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("checkpoint not found: {0}")]
    NotFound(String),
}

/// Saves and loads checkpoints by (thread_id, checkpoint_ns, checkpoint_id).
///
/// Checkpoints of a thread are ordered by insertion; "latest" is the last one put.
///
/// **Interaction**: Used by `CompiledStateGraph` when compiled with
/// `compile_with_checkpointer`; implemented by `MemorySaver` and `SqliteSaver`.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Stores a checkpoint for `config.thread_id`. Returns the checkpoint id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Latest checkpoint of the thread, or the one named by `config.checkpoint_id`.
    ///
    /// `Ok(None)` when the thread has no checkpoints; `NotFound` when a named
    /// checkpoint does not exist.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Checkpoints of the thread, newest first, at most `limit` items.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;

    /// Whether checkpoints outlive the process. A paused run can only be
    /// resumed by another process when this is true.
    fn is_durable(&self) -> bool {
        false
    }
}

pub(crate) fn thread_key(config: &RunnableConfig) -> Result<(String, String), CheckpointError> {
    let thread_id = config
        .thread_id
        .clone()
        .ok_or(CheckpointError::ThreadIdRequired)?;
    Ok((thread_id, config.checkpoint_ns.clone()))
}
