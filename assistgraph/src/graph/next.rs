//! Routing result returned by a node alongside its new state.

/// What the runner does after a node completes.
///
/// `Continue` follows the node's outgoing edge (static or conditional),
/// `Node(id)` jumps directly, `End` stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
