//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for node execution, interrupts and run boundaries.

use crate::error::AgentError;

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

pub fn log_node_complete(node_id: &str, next_id: &str) {
    tracing::debug!(node_id = node_id, next = next_id, "Node execution complete");
}

pub fn log_graph_start(entry: &str) {
    tracing::info!(entry = entry, "Starting graph execution");
}

pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps = steps, "Graph execution complete");
}

/// Execution paused before `node_id`; the state has been checkpointed.
pub fn log_interrupt(node_id: &str, thread_id: Option<&str>) {
    tracing::info!(node_id = node_id, thread_id = ?thread_id, "Interrupted before node");
}

pub fn log_resume(node_id: &str, thread_id: Option<&str>) {
    tracing::info!(node_id = node_id, thread_id = ?thread_id, "Resuming at node");
}

pub fn log_graph_error(error: &AgentError) {
    tracing::error!(%error, "Graph execution error");
}
