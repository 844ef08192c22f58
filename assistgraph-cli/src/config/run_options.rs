//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use assistgraph::ToolChoiceMode;

/// Optional overrides applied on top of the env-based [`RunConfig`](super::RunConfig).
///
/// Only set fields override; the boolean flags only ever switch on.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override sampling temperature (0–2).
    pub temperature: Option<f32>,
    /// Override tool choice mode (auto, none, required).
    pub tool_choice: Option<ToolChoiceMode>,
    /// Session to run; overrides `THREAD_ID`.
    pub thread_id: Option<String>,
    /// SQLite database for checkpoints; overrides `DB_PATH`.
    pub db_path: Option<String>,
    /// CSV dataset enabling code execution; overrides `DATA_CSV`.
    pub data_csv: Option<String>,
    /// Run escalations straight through instead of pausing before the human node.
    pub no_interrupt: bool,
    /// Interactive session; lets in-memory sessions pause before the human node.
    pub interactive: bool,
    /// Node-level logging and debug tracing.
    pub verbose: bool,
}
