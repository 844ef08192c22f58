//! Checkpoint and metadata types.
//!
//! Aligns with LangGraph checkpoint (id, ts, channel_values, metadata), plus the
//! id of the node that runs next so a paused thread can be resumed.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

static CHECKPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Metadata for a single checkpoint (source, step, created_at).
///
/// Used by Checkpointer implementations and by list() for history.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// Source of the checkpoint (input, loop, update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Saved before the first node of a run.
    Input,
    /// Saved after a node.
    Loop,
    /// Written by `update_state` (e.g. an injected human response).
    Update,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Input => "input",
            CheckpointSource::Loop => "loop",
            CheckpointSource::Update => "update",
        }
    }
}

impl FromStr for CheckpointSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "loop" => Ok(Self::Loop),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown checkpoint source: {}", other)),
        }
    }
}

/// One checkpoint: state snapshot, pending node and id/ts.
///
/// Stored by Checkpointer keyed by (thread_id, checkpoint_ns, checkpoint_id).
///
/// **Interaction**: Produced by graph execution; consumed by Checkpointer::put,
/// returned by get_tuple.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    /// Node that runs next when the thread is resumed; `None` after a completed run.
    pub next: Option<String>,
    pub metadata: CheckpointMetadata,
}

/// Item returned by Checkpointer::list for history / time-travel.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub next: Option<String>,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from current state. Uses current time for id/ts.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let seq = CHECKPOINT_SEQ.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{}-{}", ts, step, seq);
        Self {
            id,
            ts,
            channel_values: state,
            next: None,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }

    /// Sets the pending node id.
    pub fn with_next(mut self, next: Option<String>) -> Self {
        self.next = next;
        self
    }

    pub fn list_item(&self) -> CheckpointListItem {
        CheckpointListItem {
            checkpoint_id: self.id.clone(),
            next: self.next.clone(),
            metadata: self.metadata.clone(),
        }
    }
}
