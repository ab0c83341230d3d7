//! Policy trait for the learning agent.

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::Rng;

use crate::graph::Graph;

/// A policy that picks which outgoing edge to take from a vertex.
///
/// Implementations read edge values from the graph but never modify them.
pub trait ActionPolicy: Send + Sync {
    /// Selects one outgoing edge of `at`.
    ///
    /// # Returns
    ///
    /// `None` when `at` has no outgoing edges.
    fn select<R: Rng + ?Sized>(&self, graph: &Graph, at: NodeIndex, rng: &mut R)
        -> Option<EdgeIndex>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
