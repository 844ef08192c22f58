//! Concrete tool adapters and their aggregation into a `ToolSource`.
//!
//! - [`TavilySearch`]: web search (`web_search`) over the Tavily HTTP API.
//! - [`CodeExecutor`] / [`PythonDataFrameExecutor`]: code execution over a
//!   pre-loaded dataset, driven by `CodeExecutorNode`.
//! - [`AggregateToolSource`]: serves registered [`Tool`]s to the tools node.

mod aggregate_source;
pub mod code;
mod r#trait;
pub mod web;

pub use aggregate_source::AggregateToolSource;
pub use code::{CodeExecutor, PythonDataFrameExecutor};
pub use r#trait::Tool;
pub use web::{SearchResult, TavilySearch, DEFAULT_MAX_RESULTS};
