//! Tabular reinforcement learning over the indoor graph.
//!
//! One [`Agent`] type is parameterized by an update rule ([`QLearning`] or
//! [`Sarsa`]) and an action-selection policy (random, ε-greedy or greedy).
//! Edge values live on the [`Graph`](crate::graph::Graph) itself, so every
//! training run needs exclusive access to its own graph copy.

pub mod agent;
pub mod config;
pub mod error;
pub mod policy;
pub mod training;
pub mod types;
pub mod update;

pub use agent::{Agent, EpisodeEnd, EpisodeOutcome};
pub use config::LearningConfig;
pub use error::{ConfigError, ParseAlgorithmError, TrainingError};
pub use policy::{
    ActionPolicy, EpsilonGreedyPolicy, GreedyPolicy, RandomPolicy, SelectionPolicy,
};
pub use training::{ConvergenceStatus, ConvergenceTracker, Trainer, TrainingReport};
pub use types::{ActionSelection, Algorithm};
pub use update::{QLearning, Sarsa, Transition, UpdateRule};
