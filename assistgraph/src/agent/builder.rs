//! Builds the compiled agent graph from its collaborators.

use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, LoggingNodeMiddleware, StateGraph, START};
use crate::llm::LlmClient;
use crate::memory::Checkpointer;
use crate::nodes::{ChatbotNode, CodeExecutorNode, HumanNode, ToolNode};
use crate::policy::{NodeId, TurnPolicy};
use crate::state::ConversationState;
use crate::tool_source::{request_assistance_spec, run_python_code_spec, ToolSource};
use crate::tools::CodeExecutor;

use super::config::AgentConfig;
use super::runner::RunError;

/// Builds and compiles the agent graph.
///
/// `chatbot` routes through `TurnPolicy::select_next_node`; `tools`, `human`
/// and `code_executor` always return to `chatbot`. The chatbot advertises the
/// tool source's tools plus the escalation tool, and the code tool when
/// `config.code_execution` is set (which then requires `code_executor`).
///
/// # Errors
///
/// - `RunError::ToolSource` when listing tools fails.
/// - `RunError::Execution(InvalidState)` when code execution is enabled without an executor.
/// - `RunError::Execution(Persistence)` when the interrupt set is non-empty and the
///   checkpointer is not durable, unless `config.ephemeral_sessions` is set.
/// - `RunError::Compilation` for an invalid interrupt set (e.g. interrupts without a checkpointer).
pub async fn build_agent_graph(
    llm: Arc<dyn LlmClient>,
    tool_source: Arc<dyn ToolSource>,
    code_executor: Option<Arc<dyn CodeExecutor>>,
    checkpointer: Option<Arc<dyn Checkpointer<ConversationState>>>,
    config: &AgentConfig,
) -> Result<CompiledStateGraph<ConversationState>, RunError> {
    let policy = TurnPolicy::new(config.code_execution);
    let code_executor = match (config.code_execution, code_executor) {
        (true, None) => {
            return Err(AgentError::InvalidState(
                "code execution is enabled but no code executor was provided".into(),
            )
            .into())
        }
        (true, Some(exec)) => Some(exec),
        (false, _) => None,
    };

    if let Some(cp) = &checkpointer {
        if !config.interrupt_before.is_empty() && !cp.is_durable() && !config.ephemeral_sessions {
            return Err(AgentError::Persistence(
                "pausing a session needs a durable checkpointer (e.g. SqliteSaver); \
                 enable ephemeral sessions to pause in memory"
                    .into(),
            )
            .into());
        }
    }

    let mut advertised: Vec<_> = tool_source
        .list_tools()
        .await?
        .into_iter()
        .filter(|spec| !policy.is_routed_tool(&spec.name))
        .collect();
    advertised.push(request_assistance_spec());
    if policy.code_execution {
        advertised.push(run_python_code_spec());
    }
    tracing::debug!(
        tools = ?advertised.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "advertised tools"
    );

    let chatbot = NodeId::Chatbot.as_str();
    let mut graph = StateGraph::<ConversationState>::new();
    graph
        .add_node(chatbot, Arc::new(ChatbotNode::new(llm, advertised, policy)))
        .add_node(NodeId::Tools.as_str(), Arc::new(ToolNode::new(tool_source, policy)))
        .add_node(NodeId::Human.as_str(), Arc::new(HumanNode))
        .add_edge(START, chatbot)
        .add_edge(NodeId::Tools.as_str(), chatbot)
        .add_edge(NodeId::Human.as_str(), chatbot)
        .add_conditional_edges(
            chatbot,
            Arc::new(move |state: &ConversationState| {
                policy.select_next_node(state).as_str().to_string()
            }),
            policy.branches().into_iter().map(|id| (id.as_str(), id.as_str())),
        )
        .with_interrupt_before(config.interrupt_before.iter().map(|id| id.as_str()))
        .with_recursion_limit(config.recursion_limit);
    if let Some(exec) = code_executor {
        graph
            .add_node(NodeId::CodeExecutor.as_str(), Arc::new(CodeExecutorNode::new(exec)))
            .add_edge(NodeId::CodeExecutor.as_str(), chatbot);
    }
    if config.verbose {
        graph = graph.with_middleware(Arc::new(LoggingNodeMiddleware::default()));
    }

    let compiled = match checkpointer {
        Some(cp) => graph.compile_with_checkpointer(cp)?,
        None => graph.compile()?,
    };
    Ok(compiled)
}
