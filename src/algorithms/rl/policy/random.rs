//! Random policy for exploration and baselines.

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::trait_::ActionPolicy;
use crate::graph::Graph;

/// Uniformly random choice among the outgoing edges of a vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl ActionPolicy for RandomPolicy {
    fn select<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        at: NodeIndex,
        rng: &mut R,
    ) -> Option<EdgeIndex> {
        graph.out_edges(at).choose(rng).copied()
    }

    fn name(&self) -> &str {
        "random"
    }
}
