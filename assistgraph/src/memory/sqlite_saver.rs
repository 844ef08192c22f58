//! SQLite-backed checkpointer (feature `sqlite`).
//!
//! State is stored as JSON via [`JsonSerializer`]; metadata lives in plain
//! columns. Each operation opens its own connection on a blocking thread.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
use crate::memory::checkpointer::{thread_key, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::{JsonSerializer, Serializer};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS checkpoints (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id TEXT NOT NULL,
    checkpoint_ns TEXT NOT NULL,
    checkpoint_id TEXT NOT NULL,
    ts TEXT NOT NULL,
    state BLOB NOT NULL,
    next_node TEXT,
    source TEXT NOT NULL,
    step INTEGER NOT NULL,
    created_at_ms INTEGER,
    UNIQUE (thread_id, checkpoint_ns, checkpoint_id)
)";

const SELECT_COLUMNS: &str =
    "SELECT checkpoint_id, ts, state, next_node, source, step, created_at_ms FROM checkpoints";

struct Row {
    id: String,
    ts: String,
    state: Vec<u8>,
    next: Option<String>,
    source: String,
    step: i64,
    created_at_ms: Option<i64>,
}

impl Row {
    fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ts: row.get(1)?,
            state: row.get(2)?,
            next: row.get(3)?,
            source: row.get(4)?,
            step: row.get(5)?,
            created_at_ms: row.get(6)?,
        })
    }

    fn metadata(&self) -> Result<CheckpointMetadata, CheckpointError> {
        let source = self
            .source
            .parse::<CheckpointSource>()
            .map_err(CheckpointError::Storage)?;
        Ok(CheckpointMetadata {
            source,
            step: self.step.max(0) as u64,
            created_at: self
                .created_at_ms
                .map(|ms| SystemTime::UNIX_EPOCH + Duration::from_millis(ms.max(0) as u64)),
        })
    }
}

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

/// Persistent checkpointer over a single SQLite file.
pub struct SqliteSaver<S> {
    db_path: Arc<PathBuf>,
    serializer: JsonSerializer,
    _state: PhantomData<fn() -> S>,
}

impl<S> SqliteSaver<S> {
    /// Opens (or creates) the database at `db_path` and ensures the schema exists.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(storage)?;
            }
        }
        let conn = Connection::open(&db_path).map_err(storage)?;
        conn.execute(SCHEMA, []).map_err(storage)?;
        Ok(Self {
            db_path: Arc::new(db_path),
            serializer: JsonSerializer,
            _state: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, CheckpointError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CheckpointError> + Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(path.as_path()).map_err(storage)?;
            f(&conn)
        })
        .await
        .map_err(storage)?
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let (thread_id, ns) = thread_key(config)?;
        let state = self.serializer.serialize(&checkpoint.channel_values)?;
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let next = checkpoint.next.clone();
        let source = checkpoint.metadata.source.as_str();
        let step = checkpoint.metadata.step as i64;
        let created_at_ms = checkpoint
            .metadata
            .created_at
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64);
        let returned = id.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO checkpoints
                    (thread_id, checkpoint_ns, checkpoint_id, ts, state, next_node, source, step, created_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![thread_id, ns, id, ts, state, next, source, step, created_at_ms],
            )
            .map_err(storage)?;
            Ok(())
        })
        .await?;
        tracing::debug!(checkpoint_id = %returned, "checkpoint saved");
        Ok(returned)
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let (thread_id, ns) = thread_key(config)?;
        let wanted = config.checkpoint_id.clone();
        let lookup = wanted.clone();
        let row = self
            .with_conn(move |conn| {
                let row = match &lookup {
                    Some(id) => conn
                        .query_row(
                            &format!(
                                "{} WHERE thread_id = ?1 AND checkpoint_ns = ?2 AND checkpoint_id = ?3",
                                SELECT_COLUMNS
                            ),
                            params![thread_id, ns, id],
                            Row::from_sql,
                        )
                        .optional(),
                    None => conn
                        .query_row(
                            &format!(
                                "{} WHERE thread_id = ?1 AND checkpoint_ns = ?2 ORDER BY seq DESC LIMIT 1",
                                SELECT_COLUMNS
                            ),
                            params![thread_id, ns],
                            Row::from_sql,
                        )
                        .optional(),
                };
                row.map_err(storage)
            })
            .await?;

        let Some(row) = row else {
            return match wanted {
                Some(id) => Err(CheckpointError::NotFound(id)),
                None => Ok(None),
            };
        };
        let metadata = row.metadata()?;
        let channel_values: S = self.serializer.deserialize(&row.state)?;
        let checkpoint = Checkpoint {
            id: row.id,
            ts: row.ts,
            channel_values,
            next: row.next,
            metadata: metadata.clone(),
        };
        Ok(Some((checkpoint, metadata)))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let (thread_id, ns) = thread_key(config)?;
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "{} WHERE thread_id = ?1 AND checkpoint_ns = ?2 ORDER BY seq DESC LIMIT ?3",
                        SELECT_COLUMNS
                    ))
                    .map_err(storage)?;
                let rows = stmt
                    .query_map(params![thread_id, ns, limit], Row::from_sql)
                    .map_err(storage)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(storage)?;
                Ok(rows)
            })
            .await?;
        rows.into_iter()
            .map(|row| {
                Ok(CheckpointListItem {
                    metadata: row.metadata()?,
                    checkpoint_id: row.id,
                    next: row.next,
                })
            })
            .collect()
    }

    fn is_durable(&self) -> bool {
        true
    }
}
