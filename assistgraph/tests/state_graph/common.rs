//! Shared node types for state graph integration tests.

use async_trait::async_trait;

use assistgraph::{AgentError, Next, Node};

/// State used by the generic graph tests: the ids of the nodes that ran.
pub type Trail = Vec<String>;

/// Appends its own id to the trail and follows its edge.
pub struct MarkNode {
    id: &'static str,
}

impl MarkNode {
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Node<Trail> for MarkNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, mut state: Trail) -> Result<(Trail, Next), AgentError> {
        state.push(self.id.to_string());
        Ok((state, Next::Continue))
    }
}

/// Fails every run with a model error.
pub struct FailingNode;

#[async_trait]
impl Node<Trail> for FailingNode {
    fn id(&self) -> &str {
        "failing"
    }

    async fn run(&self, _state: Trail) -> Result<(Trail, Next), AgentError> {
        Err(AgentError::ModelInvocation("model unavailable".into()))
    }
}
