//! StateGraph compile failure cases: unknown node, missing entry, dangling node, bad interrupts.

use std::sync::Arc;

use assistgraph::{CompilationError, StateGraph, END, START};

use crate::common::{MarkNode, Trail};

fn mark(id: &'static str) -> Arc<MarkNode> {
    Arc::new(MarkNode::new(id))
}

#[tokio::test]
async fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph.add_node("a", mark("a"));
    graph.add_edge(START, "a");
    graph.add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_fails_without_start_edge() {
    let mut graph = StateGraph::<Trail>::new();
    graph.add_node("a", mark("a")).add_edge("a", END);
    assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
}

#[tokio::test]
async fn compile_fails_with_two_start_edges() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_node("b", mark("b"))
        .add_edge(START, "a")
        .add_edge(START, "b")
        .add_edge("a", END)
        .add_edge("b", END);
    assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
}

#[tokio::test]
async fn compile_fails_for_node_without_outgoing_edge() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_node("b", mark("b"))
        .add_edge(START, "a")
        .add_edge("a", "b");
    match graph.compile() {
        Err(CompilationError::MissingEdge(id)) => assert_eq!(id, "b"),
        other => panic!("expected MissingEdge, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_fails_for_static_and_conditional_edge_on_same_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_edge(START, "a")
        .add_edge("a", END)
        .add_conditional_edges("a", Arc::new(|_: &Trail| "end".to_string()), [("end", END)]);
    match graph.compile() {
        Err(CompilationError::DuplicateEdge(id)) => assert_eq!(id, "a"),
        other => panic!("expected DuplicateEdge, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_fails_for_unknown_path_map_target() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_edge(START, "a")
        .add_conditional_edges("a", Arc::new(|_: &Trail| "x".to_string()), [("x", "ghost")]);
    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_fails_for_unknown_interrupt_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_edge(START, "a")
        .add_edge("a", END)
        .with_interrupt_before(["nope"]);
    let cp = Arc::new(assistgraph::MemorySaver::<Trail>::new());
    match graph.compile_with_checkpointer(cp) {
        Err(CompilationError::InvalidInterrupt(id)) => assert_eq!(id, "nope"),
        other => panic!("expected InvalidInterrupt, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_fails_for_interrupt_without_checkpointer() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", mark("a"))
        .add_edge(START, "a")
        .add_edge("a", END)
        .with_interrupt_before(["a"]);
    assert!(matches!(
        graph.compile(),
        Err(CompilationError::CheckpointerRequired)
    ));
}
