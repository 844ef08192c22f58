//! Run entry points: run with default config, with overrides, or with an explicit config.
//!
//! Re-exports [`run_with_config`], [`resume_with_config`], [`build_runner`] and [`Error`].

pub use crate::config::Error;

mod config_summary;
mod run_with_config;

use assistgraph::{ConversationState, RunOutcome};

use crate::config::{RunConfig, RunOptions};

pub(crate) use config_summary::config_summary;
pub use run_with_config::{build_runner, build_runner_with, resume_with_config, run_with_config};

/// Runs one turn with config from env (and .env).
pub async fn run(user_message: &str) -> Result<RunOutcome<ConversationState>, Error> {
    run_with_options(user_message, &RunOptions::default()).await
}

/// Runs one turn with config from env and `options` applied on top.
pub async fn run_with_options(
    user_message: &str,
    options: &RunOptions,
) -> Result<RunOutcome<ConversationState>, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    run_with_config(&config, user_message).await
}
