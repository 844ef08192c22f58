use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::policy::TOOL_WEB_SEARCH;
use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

/// Tavily search endpoint.
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Results returned per query unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 2;

/// One search hit as handed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl From<TavilyHit> for SearchResult {
    fn from(hit: TavilyHit) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            snippet: hit.content,
        }
    }
}

/// Web search over the Tavily API, exposed to the model as `web_search`.
///
/// Wraps reqwest::Client. The model passes `{"query": "..."}`; the tool
/// returns the hits as a JSON array of `{title, url, snippet}`.
///
/// # Interaction
///
/// - **reqwest::Client**: POSTs `{api_key, query, max_results}` to [`TAVILY_SEARCH_URL`]
/// - **AggregateToolSource**: Registers this tool by name "web_search"
/// - **ToolSourceError**: Maps HTTP and decode errors to `Transport`
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
}

impl TavilySearch {
    /// Creates a search tool with a default HTTP client and [`DEFAULT_MAX_RESULTS`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Uses a custom HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Points the tool at another Tavily-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Runs one query and returns at most `max_results` hits.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ToolSourceError> {
        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolSourceError::Transport(format!(
                "request failed with status: {}",
                response.status()
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("failed to decode response: {}", e)))?;
        Ok(into_results(parsed, max_results))
    }
}

fn into_results(response: TavilyResponse, max_results: usize) -> Vec<SearchResult> {
    response
        .results
        .into_iter()
        .take(max_results)
        .map(SearchResult::from)
        .collect()
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        TOOL_WEB_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_WEB_SEARCH.to_string(),
            description: Some(
                "Search the web for current information. Returns a short list of results \
                 with title, url and snippet."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing query".to_string()))?;

        let results = self.search(query, self.max_results).await?;
        let text = serde_json::to_string(&results)
            .map_err(|e| ToolSourceError::Execution(format!("failed to encode results: {}", e)))?;
        Ok(ToolCallContent { text })
    }
}
