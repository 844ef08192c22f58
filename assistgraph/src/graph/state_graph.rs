//! State graph: nodes + explicit edges (from → to) + conditional edges.
//!
//! Add nodes with `add_node`, define the entry with `add_edge(START, id)`,
//! connect nodes with `add_edge` or `add_conditional_edges`, then `compile` or
//! `compile_with_checkpointer` to get a `CompiledStateGraph`.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, Edge, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)` or as a path target.
pub const END: &str = "__end__";

/// Routing function for a conditional edge: returns a key of the edge's path map.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

enum EdgeSpec<S> {
    Static(String),
    Conditional {
        router: Router<S>,
        path_map: HashMap<String, String>,
    },
}

/// State graph: nodes plus explicit and conditional edges.
///
/// Generic over state type `S`. Build with `add_node` / `add_edge` /
/// `add_conditional_edges`, optionally configure `with_interrupt_before`, recursion
/// limit and middleware, then compile.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, EdgeSpec<S>)>,
    interrupt_before: Vec<String>,
    recursion_limit: usize,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            interrupt_before: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            middleware: None,
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an unconditional edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges
            .push((from_id.into(), EdgeSpec::Static(to_id.into())));
        self
    }

    /// Adds a conditional edge: after `from_id` runs, `router(state)` picks a key
    /// of `path_map`, whose value is the next node id (or `END`).
    pub fn add_conditional_edges<K, V>(
        &mut self,
        from_id: impl Into<String>,
        router: Router<S>,
        path_map: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let path_map = path_map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.edges
            .push((from_id.into(), EdgeSpec::Conditional { router, path_map }));
        self
    }

    /// Nodes before which execution pauses (checkpoint, return `Interrupted`).
    ///
    /// Requires a checkpointer at compile time.
    pub fn with_interrupt_before<I, T>(&mut self, node_ids: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.interrupt_before = node_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum node executions per invoke/resume call.
    pub fn with_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Wraps every node run with `middleware`.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer; state is saved after
    /// every node for runs whose config carries a thread id.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        let known = |id: &str| self.nodes.contains_key(id);

        let mut entry: Option<String> = None;
        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        for (from, spec) in self.edges {
            if from == START {
                match spec {
                    EdgeSpec::Static(to) if entry.is_none() => {
                        if !known(to.as_str()) {
                            return Err(CompilationError::NodeNotFound(to));
                        }
                        entry = Some(to);
                        continue;
                    }
                    _ => return Err(CompilationError::MissingStart),
                }
            }
            if !known(from.as_str()) {
                return Err(CompilationError::NodeNotFound(from));
            }
            let edge = match spec {
                EdgeSpec::Static(to) => {
                    if to != END && !known(to.as_str()) {
                        return Err(CompilationError::NodeNotFound(to));
                    }
                    Edge::Static(to)
                }
                EdgeSpec::Conditional { router, path_map } => {
                    let unknown = path_map
                        .values()
                        .find(|to| to.as_str() != END && !known(to.as_str()));
                    if let Some(bad) = unknown {
                        return Err(CompilationError::NodeNotFound(bad.clone()));
                    }
                    Edge::Conditional { router, path_map }
                }
            };
            if edges.insert(from.clone(), edge).is_some() {
                return Err(CompilationError::DuplicateEdge(from));
            }
        }
        let entry = entry.ok_or(CompilationError::MissingStart)?;
        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        if let Some(dangling) = ids.into_iter().find(|id| !edges.contains_key(id.as_str())) {
            return Err(CompilationError::MissingEdge(dangling.clone()));
        }

        let mut interrupt_before = HashSet::new();
        for id in self.interrupt_before {
            if !known(id.as_str()) {
                return Err(CompilationError::InvalidInterrupt(id));
            }
            interrupt_before.insert(id);
        }
        if !interrupt_before.is_empty() && checkpointer.is_none() {
            return Err(CompilationError::CheckpointerRequired);
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            edges,
            interrupt_before,
            recursion_limit: self.recursion_limit,
            checkpointer,
            middleware: self.middleware,
        })
    }
}
