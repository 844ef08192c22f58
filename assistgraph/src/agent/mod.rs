//! Agent assembly and session entry points.
//!
//! [`build_agent_graph`] wires chatbot, tools, human and (optionally) code
//! execution nodes around the [`TurnPolicy`](crate::policy::TurnPolicy).
//! [`AgentRunner`] drives sessions keyed by session id: `start` a turn with a
//! user message, `resume` a session paused before the human node.

mod builder;
mod config;
mod runner;

pub use builder::build_agent_graph;
pub use config::AgentConfig;
pub use runner::{AgentRunner, RunError};
