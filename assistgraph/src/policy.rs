//! Turn policy: decides which node runs after the chatbot.
//!
//! Pure function of [`ConversationState`]. Priority order, first match wins:
//! `ask_human` → human, `execute_code` (when enabled) → code executor, any tool
//! call on the trailing assistant message → tools, otherwise end.

use std::fmt;

use crate::graph::END;
use crate::message::AssistantMessage;
use crate::state::ConversationState;

/// Escalation tool. Intercepted locally by the policy, never forwarded to an adapter.
pub const TOOL_REQUEST_ASSISTANCE: &str = "request_assistance";

/// Code-execution tool over the pre-loaded dataset.
pub const TOOL_RUN_PYTHON_CODE: &str = "run_python_code";

/// Web search tool served by the search adapter.
pub const TOOL_WEB_SEARCH: &str = "web_search";

/// Node ids of the agent graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Chatbot,
    Human,
    Tools,
    CodeExecutor,
    End,
}

impl NodeId {
    /// Graph id of the node; `End` maps to the graph's `END` sentinel.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Chatbot => "chatbot",
            NodeId::Human => "human",
            NodeId::Tools => "tools",
            NodeId::CodeExecutor => "code_executor",
            NodeId::End => END,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatbot" => Ok(Self::Chatbot),
            "human" => Ok(Self::Human),
            "tools" => Ok(Self::Tools),
            "code_executor" => Ok(Self::CodeExecutor),
            "end" | END => Ok(Self::End),
            other => Err(format!(
                "unknown node: {} (use chatbot, human, tools, code_executor or end)",
                other
            )),
        }
    }
}

/// Routing configuration: which optional branches are wired into the graph.
///
/// One policy covers every agent variant; the code-execution branch is simply
/// switched off for agents without a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnPolicy {
    pub code_execution: bool,
}

impl TurnPolicy {
    pub fn new(code_execution: bool) -> Self {
        Self { code_execution }
    }

    /// Next node after the chatbot. Total and deterministic.
    pub fn select_next_node(&self, state: &ConversationState) -> NodeId {
        if state.ask_human {
            return NodeId::Human;
        }
        if self.code_execution && state.execute_code {
            return NodeId::CodeExecutor;
        }
        tools_condition(state)
    }

    /// Flags implied by an assistant message. Only the first tool call counts.
    ///
    /// Returns `(ask_human, execute_code)`; at most one is true. The code flag
    /// is never raised when the code branch is disabled.
    pub fn inspect_first_call(&self, message: &AssistantMessage) -> (bool, bool) {
        match message.first_tool_call().map(|c| c.name.as_str()) {
            Some(TOOL_REQUEST_ASSISTANCE) => (true, false),
            Some(TOOL_RUN_PYTHON_CODE) if self.code_execution => (false, true),
            _ => (false, false),
        }
    }

    /// Whether `name` is handled by a dedicated node rather than the tools node.
    pub fn is_routed_tool(&self, name: &str) -> bool {
        name == TOOL_REQUEST_ASSISTANCE || (self.code_execution && name == TOOL_RUN_PYTHON_CODE)
    }

    /// Node ids reachable from the chatbot under this policy.
    pub fn branches(&self) -> Vec<NodeId> {
        let mut out = vec![NodeId::Human, NodeId::Tools, NodeId::End];
        if self.code_execution {
            out.push(NodeId::CodeExecutor);
        }
        out
    }
}

/// Generic tool routing: `Tools` when the trailing assistant message carries
/// tool calls, `End` otherwise.
pub fn tools_condition(state: &ConversationState) -> NodeId {
    if state.pending_tool_calls().is_empty() {
        NodeId::End
    } else {
        NodeId::Tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, ToolCall};

    fn state_with_calls(calls: Vec<ToolCall>) -> ConversationState {
        let mut s = ConversationState::from_user("q");
        s.messages.push(Message::assistant_with_calls("", calls));
        s
    }

    /// **Scenario**: ask_human wins over every other field, including execute_code and pending calls.
    #[test]
    fn ask_human_has_priority() {
        let policy = TurnPolicy::new(true);
        for execute_code in [false, true] {
            let mut s = state_with_calls(vec![ToolCall::new("c", TOOL_WEB_SEARCH, "{}")]);
            s.ask_human = true;
            s.execute_code = execute_code;
            assert_eq!(policy.select_next_node(&s), NodeId::Human);
        }
    }

    /// **Scenario**: execute_code routes to the code executor only when the branch is enabled.
    #[test]
    fn execute_code_requires_enabled_branch() {
        let mut s = state_with_calls(vec![ToolCall::new("c", TOOL_RUN_PYTHON_CODE, "{}")]);
        s.execute_code = true;
        assert_eq!(TurnPolicy::new(true).select_next_node(&s), NodeId::CodeExecutor);
        assert_eq!(TurnPolicy::new(false).select_next_node(&s), NodeId::Tools);
    }

    /// **Scenario**: No flags and no tool calls ends the loop.
    #[test]
    fn no_calls_no_flags_ends() {
        let mut s = ConversationState::from_user("q");
        s.messages.push(Message::assistant("done"));
        assert_eq!(TurnPolicy::new(true).select_next_node(&s), NodeId::End);
        assert_eq!(TurnPolicy::default().select_next_node(&s), NodeId::End);
    }

    /// **Scenario**: A trailing tool message means nothing is pending, so the loop ends.
    #[test]
    fn answered_calls_are_not_pending() {
        let mut s = state_with_calls(vec![ToolCall::new("c", TOOL_WEB_SEARCH, "{}")]);
        s.messages.push(Message::tool("c", "ok"));
        assert_eq!(tools_condition(&s), NodeId::End);
    }

    /// **Scenario**: Only the first tool call raises a flag.
    #[test]
    fn inspect_first_call_uses_first_only() {
        let policy = TurnPolicy::new(true);
        let msg = AssistantMessage {
            content: String::new(),
            tool_calls: vec![
                ToolCall::new("a", TOOL_WEB_SEARCH, "{}"),
                ToolCall::new("b", TOOL_REQUEST_ASSISTANCE, "{}"),
            ],
        };
        assert_eq!(policy.inspect_first_call(&msg), (false, false));

        let msg = AssistantMessage {
            content: String::new(),
            tool_calls: vec![ToolCall::new("a", TOOL_RUN_PYTHON_CODE, "{}")],
        };
        assert_eq!(policy.inspect_first_call(&msg), (false, true));
        assert_eq!(TurnPolicy::new(false).inspect_first_call(&msg), (false, false));
    }

    /// **Scenario**: NodeId parses from its own string form and rejects unknown names.
    #[test]
    fn node_id_roundtrips_through_str() {
        for id in [
            NodeId::Chatbot,
            NodeId::Human,
            NodeId::Tools,
            NodeId::CodeExecutor,
            NodeId::End,
        ] {
            assert_eq!(id.as_str().parse::<NodeId>().unwrap(), id);
        }
        assert!("bogus".parse::<NodeId>().is_err());
    }
}
