//! Run config: model endpoint, adapters, session and persistence. Filled from env / .env.
//!
//! Interacts with [`RunOptions`](super::RunOptions), [`build_runner`](crate::build_runner)
//! and the library's [`AgentConfig`].

use std::str::FromStr;

use assistgraph::{AgentConfig, NodeId, ToolChoiceMode};

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Default number of search results per query.
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 2;

/// Checkpoint database used when `DB_PATH` is not set.
pub const DEFAULT_DB_PATH: &str = "assistgraph.db";

/// Run config for the agent binary.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI-compatible API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0–2. Default: unset (use API default).
    pub temperature: Option<f32>,
    pub tool_choice: Option<ToolChoiceMode>,
    /// Tavily key; web search is not offered when unset.
    pub tavily_api_key: Option<String>,
    pub search_max_results: usize,
    /// CSV dataset; when set the agent can run pandas code over it.
    pub data_csv: Option<String>,
    /// Python interpreter used for code execution.
    pub python_bin: String,
    /// Session id (checkpoint thread).
    pub thread_id: String,
    /// SQLite checkpoint database. Sessions live in memory when unset.
    pub db_path: Option<String>,
    /// Nodes before which the run pauses.
    pub interrupt_before: Vec<NodeId>,
    /// Whole conversation in one process; in-memory sessions may pause.
    pub interactive: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to pick up `.env`.
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_API_BASE`, `OPENAI_MODEL`, `SEARCH_MAX_RESULTS`,
    /// `PYTHON_BIN`, `THREAD_ID`, `DB_PATH` ([`DEFAULT_DB_PATH`] with the sqlite feature) and
    /// `INTERRUPT_BEFORE` have defaults. `OPENAI_TEMPERATURE`, `OPENAI_TOOL_CHOICE`
    /// (auto|none|required), `TAVILY_API_KEY` and `DATA_CSV` are optional.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "OPENAI_API_KEY is not set; please configure it in .env",
            )
        })?;
        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let temperature = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok());
        let tool_choice = std::env::var("OPENAI_TOOL_CHOICE")
            .ok()
            .and_then(|s| s.parse().ok());
        let tavily_api_key = non_empty_var("TAVILY_API_KEY");
        let search_max_results = std::env::var("SEARCH_MAX_RESULTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        let data_csv = non_empty_var("DATA_CSV");
        let python_bin = std::env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".to_string());
        let thread_id = non_empty_var("THREAD_ID").unwrap_or_else(|| "default".to_string());
        let db_path = non_empty_var("DB_PATH").or_else(default_db_path);
        let interrupt_before = match std::env::var("INTERRUPT_BEFORE") {
            Ok(list) => parse_node_list(&list)?,
            Err(_) => vec![NodeId::Human],
        };
        Ok(Self {
            api_base,
            api_key,
            model,
            temperature,
            tool_choice,
            tavily_api_key,
            search_max_results,
            data_csv,
            python_bin,
            thread_id,
            db_path,
            interrupt_before,
            interactive: false,
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions`; only set fields override.
    pub fn apply_options(&mut self, options: &super::RunOptions) {
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(tc) = options.tool_choice {
            self.tool_choice = Some(tc);
        }
        if let Some(id) = &options.thread_id {
            self.thread_id = id.clone();
        }
        if options.db_path.is_some() {
            self.db_path = options.db_path.clone();
        }
        if options.data_csv.is_some() {
            self.data_csv = options.data_csv.clone();
        }
        if options.no_interrupt {
            self.interrupt_before.clear();
        }
        if options.interactive {
            self.interactive = true;
        }
        if options.verbose {
            self.verbose = true;
        }
    }

    /// Library-side agent configuration derived from this config.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::default()
            .with_code_execution(self.data_csv.is_some())
            .with_interrupt_before(self.interrupt_before.clone())
            .with_ephemeral_sessions(self.interactive)
            .with_verbose(self.verbose)
    }
}

#[cfg(feature = "sqlite")]
fn default_db_path() -> Option<String> {
    Some(DEFAULT_DB_PATH.to_string())
}

#[cfg(not(feature = "sqlite"))]
fn default_db_path() -> Option<String> {
    None
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a comma-separated node list; blank entries are skipped.
pub(crate) fn parse_node_list(list: &str) -> Result<Vec<NodeId>, Error> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| NodeId::from_str(s).map_err(Error::from))
        .collect()
}
