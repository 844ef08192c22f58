//! Builds the agent from a [`RunConfig`] and runs one turn; does not read .env.
//!
//! Adapters: `ChatOpenAI` for the model, Tavily search when `TAVILY_API_KEY` is set,
//! the pandas executor when `DATA_CSV` is set, and a `SqliteSaver` when `DB_PATH` is set.

use std::sync::Arc;

use assistgraph::{
    AgentRunner, AggregateToolSource, ChatOpenAI, Checkpointer, CodeExecutor, ConversationState,
    LlmClient, PythonDataFrameExecutor, RunOutcome, TavilySearch, ToolSource,
};
use async_openai::config::OpenAIConfig;
use tracing::{info, warn};

use crate::config::RunConfig;

use super::config_summary;
use super::Error;

/// Builds the session runner for `config` with the real adapters.
pub async fn build_runner(config: &RunConfig) -> Result<AgentRunner, Error> {
    let openai_config = OpenAIConfig::new()
        .with_api_base(&config.api_base)
        .with_api_key(config.api_key.clone());
    let mut llm = ChatOpenAI::with_config(openai_config, config.model.clone());
    if let Some(t) = config.temperature {
        llm = llm.with_temperature(t);
    }
    if let Some(tc) = config.tool_choice {
        llm = llm.with_tool_choice(tc);
    }

    let mut tools = AggregateToolSource::new();
    match &config.tavily_api_key {
        Some(key) => {
            let search = TavilySearch::new(key.clone()).with_max_results(config.search_max_results);
            tools = tools.register(Arc::new(search));
        }
        None => warn!("TAVILY_API_KEY is not set; web search is disabled"),
    }

    let code_executor = config.data_csv.as_ref().map(|path| {
        Arc::new(PythonDataFrameExecutor::new(path).with_python_bin(config.python_bin.clone()))
            as Arc<dyn CodeExecutor>
    });

    build_runner_with(config, Arc::new(llm), Arc::new(tools), code_executor).await
}

/// Builds the session runner from `config` with the given collaborators.
///
/// Checkpoints go to SQLite when `config.db_path` is set, otherwise to memory.
pub async fn build_runner_with(
    config: &RunConfig,
    llm: Arc<dyn LlmClient>,
    tool_source: Arc<dyn ToolSource>,
    code_executor: Option<Arc<dyn CodeExecutor>>,
) -> Result<AgentRunner, Error> {
    if config.verbose {
        eprintln!("{}", config_summary(config));
    }
    let checkpointer = open_checkpointer(config)?;
    let runner = AgentRunner::new(
        llm,
        tool_source,
        code_executor,
        checkpointer,
        config.agent_config(),
    )
    .await?;
    Ok(runner)
}

#[cfg(feature = "sqlite")]
fn open_checkpointer(
    config: &RunConfig,
) -> Result<Option<Arc<dyn Checkpointer<ConversationState>>>, Error> {
    match &config.db_path {
        Some(path) => {
            info!(db_path = %path, "using sqlite checkpoints");
            let saver = assistgraph::SqliteSaver::<ConversationState>::new(path)?;
            Ok(Some(Arc::new(saver) as Arc<dyn Checkpointer<ConversationState>>))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "sqlite"))]
fn open_checkpointer(
    config: &RunConfig,
) -> Result<Option<Arc<dyn Checkpointer<ConversationState>>>, Error> {
    match &config.db_path {
        Some(_) => Err("DB_PATH requires the sqlite feature. Build with --features sqlite".into()),
        None => Ok(None),
    }
}

/// Runs one user turn in `config.thread_id`; does not read .env.
pub async fn run_with_config(
    config: &RunConfig,
    user_message: &str,
) -> Result<RunOutcome<ConversationState>, Error> {
    let runner = build_runner(config).await?;
    info!(thread_id = %config.thread_id, "running turn");
    Ok(runner.start(&config.thread_id, user_message).await?)
}

/// Resumes the paused session `config.thread_id`, optionally answering for the human.
///
/// Only meaningful across processes with `DB_PATH` set.
pub async fn resume_with_config(
    config: &RunConfig,
    human_response: Option<String>,
) -> Result<RunOutcome<ConversationState>, Error> {
    let runner = build_runner(config).await?;
    Ok(runner.resume(&config.thread_id, human_response).await?)
}
