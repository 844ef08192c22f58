//! Configuration for running the agent from the command line.
//!
//! Re-exports [`RunConfig`], [`RunOptions`] and config [`Error`].

mod run_config;
mod run_options;

pub use run_config::{Error, RunConfig, DEFAULT_DB_PATH};
pub use run_options::RunOptions;
