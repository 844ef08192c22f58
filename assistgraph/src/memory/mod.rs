//! # Memory: checkpointing
//!
//! Per-thread state snapshots so a conversation survives process restarts and
//! a run paused before the human node can be resumed later.
//!
//! ## Config
//!
//! [`RunnableConfig`] is passed to `CompiledStateGraph::invoke`. When using a checkpointer:
//! - `thread_id`: Required. Identifies the conversation/thread.
//! - `checkpoint_id`: Optional. Load a specific checkpoint (time-travel / branch).
//! - `checkpoint_ns`: Optional namespace for subgraphs.
//!
//! ## Checkpointer Implementations
//!
//! | Type             | Persistence | Use case                | Feature  |
//! |------------------|-------------|-------------------------|----------|
//! | [`MemorySaver`]  | In-memory   | Dev, tests              | -        |
//! | [`SqliteSaver`]  | SQLite file | Single-node, production | `sqlite` |
//!
//! Use with [`StateGraph::compile_with_checkpointer`](crate::graph::StateGraph::compile_with_checkpointer).
//! [`JsonSerializer`] is used by `SqliteSaver` (state must be `Serialize + DeserializeOwned`).

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;

#[cfg(feature = "sqlite")]
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};

#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;
