use thiserror::Error;

use crate::graph::GraphError;
use crate::VertexId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown algorithm: {0} (expected qlearning or sarsa)")]
pub struct ParseAlgorithmError(pub String);

/// Out-of-range learning hyperparameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("alpha must lie in (0, 1], got {0}")]
    Alpha(f64),

    #[error("gamma must lie in [0, 1], got {0}")]
    Gamma(f64),

    #[error("epsilon must lie in [0, 1], got {0}")]
    Epsilon(f64),

    #[error("goal reward must be finite and positive, got {0}")]
    GoalReward(f64),

    #[error("convergence window must be at least 1")]
    ConvergenceWindow,

    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error("Cannot train on an empty graph")]
    EmptyGraph,

    #[error("Goal vertex {0} has no connections and cannot be reached")]
    UnreachableGoal(VertexId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid learning configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Training toward vertex {goal} diverged at vertex {vertex}")]
    Diverged { goal: VertexId, vertex: VertexId },
}
