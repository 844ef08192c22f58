//! Agent configuration: enabled branches, interrupts, recursion limit.

use crate::graph::DEFAULT_RECURSION_LIMIT;
use crate::policy::NodeId;

/// Configuration for building the agent graph.
///
/// Callers (e.g. assistgraph-cli) build this from env and CLI flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Wire the code-execution branch (`run_python_code` → code executor node).
    pub code_execution: bool,
    /// Nodes before which a run pauses. Defaults to the human node.
    pub interrupt_before: Vec<NodeId>,
    /// Node executions allowed per start/resume call.
    pub recursion_limit: usize,
    /// Attach node enter/exit logging middleware.
    pub verbose: bool,
    /// Allow pausing with a checkpointer that does not outlive the process.
    /// Paused sessions are then only resumable by the same runner.
    pub ephemeral_sessions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            code_execution: false,
            interrupt_before: vec![NodeId::Human],
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            verbose: false,
            ephemeral_sessions: false,
        }
    }
}

impl AgentConfig {
    pub fn with_code_execution(mut self, enabled: bool) -> Self {
        self.code_execution = enabled;
        self
    }

    pub fn with_interrupt_before(mut self, nodes: Vec<NodeId>) -> Self {
        self.interrupt_before = nodes;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_ephemeral_sessions(mut self, ephemeral: bool) -> Self {
        self.ephemeral_sessions = ephemeral;
        self
    }
}
