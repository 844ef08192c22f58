//! Compiled state graph: immutable; supports invoke, resume, stream and state inspection.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. Holds nodes,
//! the entry node, outgoing edges, the interrupt set and an optional checkpointer.
//! When a checkpointer is set and `config.thread_id` is provided, the state is
//! saved before the first node (source `Input`) and after every node (source
//! `Loop`) together with the id of the node that runs next.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_interrupt, log_node_complete,
    log_node_start, log_resume,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::state_graph::{Router, END};
use super::{Next, Node};

/// Node executions allowed per invoke/resume call unless overridden.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

#[derive(Clone)]
pub(crate) enum Edge<S> {
    Static(String),
    Conditional {
        router: Router<S>,
        path_map: HashMap<String, String>,
    },
}

/// Result of running the graph until it stops.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<S> {
    /// Reached `END`.
    Completed(S),
    /// Paused before `next` (a node in the interrupt set); state is checkpointed.
    Interrupted { state: S, next: String },
}

impl<S> RunOutcome<S> {
    pub fn state(&self) -> &S {
        match self {
            RunOutcome::Completed(s) => s,
            RunOutcome::Interrupted { state, .. } => state,
        }
    }

    pub fn into_state(self) -> S {
        match self {
            RunOutcome::Completed(s) => s,
            RunOutcome::Interrupted { state, .. } => state,
        }
    }

    /// Node the run is paused before, if interrupted.
    pub fn interrupted_at(&self) -> Option<&str> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Interrupted { next, .. } => Some(next),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted_at().is_some()
    }
}

/// Latest persisted state of a thread.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    pub values: S,
    /// Node that runs next on resume; `None` when the last run completed.
    pub next: Option<String>,
    pub checkpoint_id: String,
    pub step: u64,
}

struct EventSink<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    tx: mpsc::Sender<StreamEvent<S>>,
    modes: HashSet<StreamMode>,
}

impl<S> EventSink<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn node_done(&self, node_id: &str, state: &S) {
        if self.modes.contains(&StreamMode::Values) {
            let _ = self.tx.send(StreamEvent::Values(state.clone())).await;
        }
        if self.modes.contains(&StreamMode::Updates) {
            let _ = self
                .tx
                .send(StreamEvent::Updates {
                    node_id: node_id.to_string(),
                    state: state.clone(),
                })
                .await;
        }
    }

    async fn interrupted(&self, node_id: &str, state: &S) {
        let _ = self
            .tx
            .send(StreamEvent::Interrupted {
                node_id: node_id.to_string(),
                state: state.clone(),
            })
            .await;
    }
}

/// Compiled graph: immutable structure.
///
/// Runs from the entry node; after each node, the node's `Next` and the
/// outgoing edges choose the next node. Nodes in the interrupt set pause the run
/// before they execute; `resume` continues from the persisted pending node.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) entry: String,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) interrupt_before: HashSet<String>,
    pub(super) recursion_limit: usize,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Runs the graph from the entry node with the given state.
    ///
    /// Returns `Completed` when `END` is reached, or `Interrupted` when the next
    /// node is in the interrupt set. Checkpoint failures abort the run with
    /// `AgentError::Persistence`.
    pub async fn invoke(
        &self,
        state: S,
        config: Option<RunnableConfig>,
    ) -> Result<RunOutcome<S>, AgentError> {
        let result = self.start_run(state, config.as_ref(), None).await;
        if let Err(e) = &result {
            log_graph_error(e);
        }
        result
    }

    /// Continues a paused (or crashed) thread from its latest checkpoint.
    ///
    /// The pending node runs without re-triggering its interrupt. Fails with
    /// `InvalidState` when the thread's last run already completed.
    pub async fn resume(&self, config: RunnableConfig) -> Result<RunOutcome<S>, AgentError> {
        let cp = self
            .checkpointer
            .as_ref()
            .ok_or_else(|| AgentError::Persistence("resume requires a checkpointer".into()))?;
        let (checkpoint, _) = cp.get_tuple(&config).await?.ok_or_else(|| {
            AgentError::Persistence(format!("no checkpoint for thread {:?}", config.thread_id))
        })?;
        let next = checkpoint.next.clone().ok_or_else(|| {
            AgentError::InvalidState("thread has no pending node to resume".into())
        })?;
        log_resume(&next, config.thread_id.as_deref());
        let step = checkpoint.metadata.step;
        let result = self
            .run_loop(checkpoint.channel_values, Some(&config), next, step, true, None)
            .await;
        if let Err(e) = &result {
            log_graph_error(e);
        }
        result
    }

    /// Streams graph execution, emitting events via channel-backed Stream.
    ///
    /// `Values` / `Updates` follow `stream_mode`; `Interrupted` and `Error` are
    /// always emitted.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let sink = EventSink {
            tx,
            modes: stream_mode.into(),
        };

        tokio::spawn(async move {
            let result = graph.start_run(state, config.as_ref(), Some(&sink)).await;
            if let Err(e) = result {
                log_graph_error(&e);
                let _ = sink.tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Latest checkpoint of the thread in `config`, if any.
    pub async fn get_state(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<StateSnapshot<S>>, AgentError> {
        let Some(cp) = &self.checkpointer else {
            return Ok(None);
        };
        Ok(cp.get_tuple(config).await?.map(|(c, _)| StateSnapshot {
            values: c.channel_values,
            next: c.next,
            checkpoint_id: c.id,
            step: c.metadata.step,
        }))
    }

    /// Replaces the thread's state with `values` (source `Update`), keeping the
    /// pending node so a paused run resumes where it stopped. Returns the new checkpoint id.
    pub async fn update_state(
        &self,
        config: &RunnableConfig,
        values: S,
    ) -> Result<String, AgentError> {
        let cp = self
            .checkpointer
            .as_ref()
            .ok_or_else(|| AgentError::Persistence("update_state requires a checkpointer".into()))?;
        if config.thread_id.is_none() {
            return Err(AgentError::Persistence(
                "update_state requires config.thread_id".into(),
            ));
        }
        let (next, step) = match cp.get_tuple(config).await? {
            Some((c, _)) => (c.next, c.metadata.step + 1),
            None => (None, 0),
        };
        let checkpoint = Checkpoint::from_state(values, CheckpointSource::Update, step).with_next(next);
        Ok(cp.put(config, &checkpoint).await?)
    }

    /// Node ids the graph pauses before.
    pub fn interrupt_nodes(&self) -> &HashSet<String> {
        &self.interrupt_before
    }

    async fn start_run(
        &self,
        state: S,
        config: Option<&RunnableConfig>,
        events: Option<&EventSink<S>>,
    ) -> Result<RunOutcome<S>, AgentError> {
        let has_thread = config.and_then(|c| c.thread_id.as_ref()).is_some();
        if !self.interrupt_before.is_empty() && !has_thread {
            return Err(AgentError::Persistence(
                "graph has interrupts; config.thread_id is required".into(),
            ));
        }
        let step = match (&self.checkpointer, config) {
            (Some(cp), Some(cfg)) if has_thread => cp
                .get_tuple(cfg)
                .await?
                .map(|(c, _)| c.metadata.step + 1)
                .unwrap_or(0),
            _ => 0,
        };
        log_graph_start(&self.entry);
        self.save(config, &state, Some(&self.entry), CheckpointSource::Input, step)
            .await?;
        self.run_loop(state, config, self.entry.clone(), step, false, events)
            .await
    }

    /// Shared run loop used by invoke(), resume() and stream().
    ///
    /// Every path that reaches an interrupt check has just checkpointed the state
    /// with `next == current`, so pausing needs no extra save.
    async fn run_loop(
        &self,
        mut state: S,
        config: Option<&RunnableConfig>,
        mut current: String,
        mut step: u64,
        mut resuming: bool,
        events: Option<&EventSink<S>>,
    ) -> Result<RunOutcome<S>, AgentError> {
        let thread_id = config.and_then(|c| c.thread_id.as_deref());
        let mut executed = 0usize;
        loop {
            if current == END {
                log_graph_complete(executed);
                return Ok(RunOutcome::Completed(state));
            }
            if !resuming && self.interrupt_before.contains(&current) {
                log_interrupt(&current, thread_id);
                if let Some(sink) = events {
                    sink.interrupted(&current, &state).await;
                }
                return Ok(RunOutcome::Interrupted {
                    state,
                    next: current,
                });
            }
            resuming = false;

            if executed >= self.recursion_limit {
                return Err(AgentError::RecursionLimit(self.recursion_limit));
            }
            executed += 1;

            let node = self
                .nodes
                .get(&current)
                .cloned()
                .ok_or_else(|| AgentError::ExecutionFailed(format!("node not found: {}", current)))?;
            log_node_start(&current);
            let (new_state, next) = self.run_node(&current, node, state).await?;
            state = new_state;

            let next_id = self.resolve_next(&current, next, &state)?;
            log_node_complete(&current, &next_id);
            step += 1;
            let pending = (next_id != END).then_some(next_id.as_str());
            self.save(config, &state, pending, CheckpointSource::Loop, step)
                .await?;
            if let Some(sink) = events {
                sink.node_done(&current, &state).await;
            }
            current = next_id;
        }
    }

    async fn run_node(
        &self,
        node_id: &str,
        node: Arc<dyn Node<S>>,
        state: S,
    ) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(mw) => {
                mw.around_run(
                    node_id,
                    state,
                    Box::new(move |s: S| -> NodeFuture<S> {
                        Box::pin(async move { node.run(s).await })
                    }),
                )
                .await
            }
            None => node.run(state).await,
        }
    }

    fn resolve_next(&self, from: &str, next: Next, state: &S) -> Result<String, AgentError> {
        let to = match next {
            Next::End => return Ok(END.to_string()),
            Next::Node(id) => id,
            Next::Continue => match self.edges.get(from) {
                None => {
                    return Err(AgentError::ExecutionFailed(format!(
                        "node {} has no outgoing edge",
                        from
                    )))
                }
                Some(Edge::Static(to)) => to.clone(),
                Some(Edge::Conditional { router, path_map }) => {
                    let key = router(state);
                    path_map.get(&key).cloned().ok_or_else(|| {
                        AgentError::ExecutionFailed(format!(
                            "router for {} returned unmapped branch {}",
                            from, key
                        ))
                    })?
                }
            },
        };
        if to != END && !self.nodes.contains_key(&to) {
            return Err(AgentError::ExecutionFailed(format!("node not found: {}", to)));
        }
        Ok(to)
    }

    async fn save(
        &self,
        config: Option<&RunnableConfig>,
        state: &S,
        next: Option<&str>,
        source: CheckpointSource,
        step: u64,
    ) -> Result<(), AgentError> {
        let (Some(cp), Some(cfg)) = (&self.checkpointer, config) else {
            return Ok(());
        };
        if cfg.thread_id.is_none() {
            return Ok(());
        }
        let checkpoint =
            Checkpoint::from_state(state.clone(), source, step).with_next(next.map(str::to_string));
        cp.put(cfg, &checkpoint)
            .await
            .map_err(|e| AgentError::Persistence(e.to_string()))?;
        Ok(())
    }
}
