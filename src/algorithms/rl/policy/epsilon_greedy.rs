//! ε-greedy policy used during training.

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::Rng;

use super::random::RandomPolicy;
use super::trait_::ActionPolicy;
use crate::graph::{Graph, DEFAULT_Q};

/// Exploits with probability `1 - epsilon`, otherwise explores uniformly.
///
/// Exploiting requires at least one outgoing edge with a non-default value;
/// a vertex whose edges are all untouched is always explored.
#[derive(Debug, Clone, Copy)]
pub struct EpsilonGreedyPolicy {
    epsilon: f64,
}

impl EpsilonGreedyPolicy {
    /// Creates a policy exploring with probability `epsilon`.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl ActionPolicy for EpsilonGreedyPolicy {
    fn select<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        at: NodeIndex,
        rng: &mut R,
    ) -> Option<EdgeIndex> {
        let exploit = rng.gen::<f64>() >= self.epsilon;
        if exploit && graph.max_q(at) != DEFAULT_Q {
            return graph.best_edge(at);
        }
        RandomPolicy.select(graph, at, rng)
    }

    fn name(&self) -> &str {
        "epsilon_greedy"
    }
}
