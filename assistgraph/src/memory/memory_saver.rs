//! In-memory checkpointer.

use std::fmt::Debug;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::checkpointer::{thread_key, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;

/// In-memory checkpointer. Checkpoints are lost when the process exits.
///
/// Keyed by (thread_id, checkpoint_ns); each key holds its checkpoints in
/// insertion order.
pub struct MemorySaver<S> {
    threads: DashMap<(String, String), Vec<Checkpoint<S>>>,
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = thread_key(config)?;
        self.threads.entry(key).or_default().push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = thread_key(config)?;
        let Some(list) = self.threads.get(&key) else {
            return match &config.checkpoint_id {
                Some(id) => Err(CheckpointError::NotFound(id.clone())),
                None => Ok(None),
            };
        };
        let found = match &config.checkpoint_id {
            Some(id) => Some(
                list.iter()
                    .find(|c| &c.id == id)
                    .ok_or_else(|| CheckpointError::NotFound(id.clone()))?,
            ),
            None => list.last(),
        };
        Ok(found.map(|c| (c.clone(), c.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = thread_key(config)?;
        let Some(list) = self.threads.get(&key) else {
            return Ok(Vec::new());
        };
        Ok(list
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .map(Checkpoint::list_item)
            .collect())
    }
}
