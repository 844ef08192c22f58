//! Integration tests for StateGraph: compile validation and invoke through the public API.
//!
//! Tests are split into modules under `state_graph/`:
//! - `common`: shared node types
//! - `compile_fail`: compile error cases
//! - `invoke`: invoke, jump and interrupt behaviour

#[path = "state_graph/common.rs"]
mod common;

#[path = "state_graph/compile_fail.rs"]
mod compile_fail;

#[path = "state_graph/invoke.rs"]
mod invoke;
