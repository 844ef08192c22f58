//! One-line-per-section summary of a [`RunConfig`], printed to stderr in verbose mode.
//!
//! Secrets are never printed; only whether they are set.

use crate::config::RunConfig;

/// Renders the effective configuration as `section: key=value ...` lines.
pub(crate) fn config_summary(config: &RunConfig) -> String {
    let tool_choice = config
        .tool_choice
        .as_ref()
        .map(|tc| format!("{:?}", tc).to_lowercase())
        .unwrap_or_else(|| "auto".to_string());
    let temperature = config
        .temperature
        .map(|t| t.to_string())
        .unwrap_or_else(|| "default".to_string());
    let search = if config.tavily_api_key.is_some() {
        format!("tavily(max_results={})", config.search_max_results)
    } else {
        "off".to_string()
    };
    let code = match &config.data_csv {
        Some(path) => format!("{} via {}", path, config.python_bin),
        None => "off".to_string(),
    };
    let store = config.db_path.as_deref().unwrap_or("memory");
    let interrupts: Vec<&str> = config.interrupt_before.iter().map(|n| n.as_str()).collect();

    [
        format!(
            "llm: model={} api_base={} temperature={} tool_choice={}",
            config.model, config.api_base, temperature, tool_choice
        ),
        format!("tools: web_search={} code={}", search, code),
        format!(
            "session: thread_id={} checkpoints={} interrupt_before=[{}]",
            config.thread_id,
            store,
            interrupts.join(",")
        ),
    ]
    .join("\n")
}
