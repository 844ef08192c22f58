//! Invoke config: thread_id, checkpoint_id, checkpoint_ns.
//!
//! Aligns with LangGraph's config["configurable"]. Used by CompiledStateGraph::invoke
//! and Checkpointer.

/// Config for a single invoke. Identifies the thread and optional checkpoint.
///
/// When using a checkpointer, invoke must provide at least thread_id.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke(state, config)` and
/// `Checkpointer::put` / `get_tuple` / `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Unique id for this conversation/thread. Required when using a checkpointer.
    pub thread_id: Option<String>,
    /// If set, load state from this checkpoint instead of the latest (time travel / branch).
    pub checkpoint_id: Option<String>,
    /// Optional namespace for checkpoints (e.g. subgraph). Default is empty.
    pub checkpoint_ns: String,
}

impl RunnableConfig {
    /// Config addressing the latest checkpoint of `thread_id`.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: RunnableConfig::default() has all optionals None and checkpoint_ns empty.
    #[test]
    fn runnable_config_default_all_optionals_none_or_empty() {
        let c = RunnableConfig::default();
        assert!(c.thread_id.is_none());
        assert!(c.checkpoint_id.is_none());
        assert!(c.checkpoint_ns.is_empty());
    }

    /// **Scenario**: for_thread sets only the thread id.
    #[test]
    fn for_thread_sets_thread_only() {
        let c = RunnableConfig::for_thread("t1");
        assert_eq!(c.thread_id.as_deref(), Some("t1"));
        assert!(c.checkpoint_id.is_none());
        assert_eq!(c, RunnableConfig::for_thread(String::from("t1")));
    }
}
