//! Pure-greedy policy used when reading out learned values.

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::Rng;

use super::trait_::ActionPolicy;
use crate::graph::Graph;

/// Always takes the outgoing edge with the highest value; the first edge
/// wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPolicy;

impl ActionPolicy for GreedyPolicy {
    fn select<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        at: NodeIndex,
        _rng: &mut R,
    ) -> Option<EdgeIndex> {
        graph.best_edge(at)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}
