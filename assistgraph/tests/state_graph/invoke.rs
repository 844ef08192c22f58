//! StateGraph invoke through the public API: order of execution, errors and checkpoints.

use std::sync::Arc;

use assistgraph::{
    AgentError, Checkpointer, MemorySaver, RunOutcome, RunnableConfig, StateGraph, END, START,
};

use crate::common::{FailingNode, MarkNode, Trail};

#[tokio::test]
async fn invoke_runs_nodes_in_edge_order() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(MarkNode::new("a")))
        .add_node("b", Arc::new(MarkNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", END);
    let compiled = graph.compile().expect("graph compiles");
    let out = compiled.invoke(Vec::new(), None).await.unwrap();
    assert_eq!(out, RunOutcome::Completed(vec!["a".to_string(), "b".to_string()]));
}

/// A failing node aborts the run; the last good checkpoint stays the latest one.
#[tokio::test]
async fn node_error_leaves_last_checkpoint() {
    let cp = Arc::new(MemorySaver::<Trail>::new());
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(MarkNode::new("a")))
        .add_node("failing", Arc::new(FailingNode))
        .add_edge(START, "a")
        .add_edge("a", "failing")
        .add_edge("failing", END);
    let compiled = graph.compile_with_checkpointer(cp.clone()).expect("graph compiles");
    let config = RunnableConfig::for_thread("t");

    let err = compiled.invoke(Vec::new(), Some(config.clone())).await.unwrap_err();
    assert!(matches!(err, AgentError::ModelInvocation(_)));

    let (latest, _) = cp.get_tuple(&config).await.unwrap().unwrap();
    assert_eq!(latest.channel_values, vec!["a".to_string()]);
    assert_eq!(latest.next.as_deref(), Some("failing"));
}
