//! assistgraph-cli library: env-based configuration and run entry points for the agent.
//!
//! Reads OpenAI, Tavily and session settings from `.env`, builds the agent graph
//! (chatbot, tools, human escalation, optional pandas code execution) and runs
//! or resumes a session.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let outcome = assistgraph_cli::run("What's the weather in Tokyo?").await?;
//! if let Some(node) = outcome.interrupted_at() {
//!     println!("paused before {}", node);
//! }
//! ```

mod config;
mod run;

pub use assistgraph::{ConversationState, Message, RunOutcome};
pub use config::{Error, RunConfig, RunOptions, DEFAULT_DB_PATH};
pub use run::{
    build_runner, build_runner_with, resume_with_config, run, run_with_config, run_with_options,
};

#[cfg(test)]
mod tests;
