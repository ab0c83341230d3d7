//! Configuration-selected policy.

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::Rng;

use super::epsilon_greedy::EpsilonGreedyPolicy;
use super::greedy::GreedyPolicy;
use super::random::RandomPolicy;
use super::trait_::ActionPolicy;
use crate::algorithms::rl::config::LearningConfig;
use crate::algorithms::rl::types::ActionSelection;
use crate::graph::Graph;

/// One of the built-in policies, chosen at runtime from [`LearningConfig`].
#[derive(Debug, Clone, Copy)]
pub enum SelectionPolicy {
    Random(RandomPolicy),
    EpsilonGreedy(EpsilonGreedyPolicy),
    Greedy(GreedyPolicy),
}

impl SelectionPolicy {
    pub fn from_config(config: &LearningConfig) -> Self {
        match config.selection {
            ActionSelection::Random => SelectionPolicy::Random(RandomPolicy),
            ActionSelection::EpsilonGreedy => {
                SelectionPolicy::EpsilonGreedy(EpsilonGreedyPolicy::new(config.epsilon))
            }
            ActionSelection::Greedy => SelectionPolicy::Greedy(GreedyPolicy),
        }
    }
}

impl ActionPolicy for SelectionPolicy {
    fn select<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        at: NodeIndex,
        rng: &mut R,
    ) -> Option<EdgeIndex> {
        match self {
            SelectionPolicy::Random(p) => p.select(graph, at, rng),
            SelectionPolicy::EpsilonGreedy(p) => p.select(graph, at, rng),
            SelectionPolicy::Greedy(p) => p.select(graph, at, rng),
        }
    }

    fn name(&self) -> &str {
        match self {
            SelectionPolicy::Random(p) => p.name(),
            SelectionPolicy::EpsilonGreedy(p) => p.name(),
            SelectionPolicy::Greedy(p) => p.name(),
        }
    }
}
