//! Value update rules.
//!
//! Both rules move the value of the edge just taken toward a bootstrapped
//! target:
//!
//! ```text
//! Q-learning: Δ = α · (1 / w) · (r + γ · max_q(v) − q)
//! SARSA:      Δ = α · (r + γ · q(next action from v) − q)
//! ```
//!
//! The `1 / w` factor damps updates on physically longer edges.

use super::config::LearningConfig;
use super::types::Algorithm;

/// Everything an update rule may read about one transition `u --e--> v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Current value of `e`.
    pub q: f64,
    /// Physical weight of `e`.
    pub weight: f64,
    /// Reward of `v`.
    pub reward: f64,
    /// Largest value among the outgoing edges of `v`.
    pub max_next_q: f64,
    /// Value of the edge actually chosen next from `v` (0 at the goal).
    pub next_q: f64,
}

/// Strategy computing the value change for one transition.
pub trait UpdateRule: Send + Sync {
    /// Which algorithm this rule implements.
    const ALGORITHM: Algorithm;

    /// Whether the follow-up action must be chosen before the update (and
    /// then executed as the next step).
    const ON_POLICY: bool;

    fn delta(&self, config: &LearningConfig, transition: &Transition) -> f64;
}

/// Off-policy rule bootstrapping from the best value at the next vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct QLearning;

/// On-policy rule bootstrapping from the action the policy actually picks next.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sarsa;

impl UpdateRule for QLearning {
    const ALGORITHM: Algorithm = Algorithm::QLearning;
    const ON_POLICY: bool = false;

    fn delta(&self, config: &LearningConfig, t: &Transition) -> f64 {
        q_learning_delta(config.alpha, config.gamma, t.q, t.reward, t.max_next_q, t.weight)
    }
}

impl UpdateRule for Sarsa {
    const ALGORITHM: Algorithm = Algorithm::Sarsa;
    const ON_POLICY: bool = true;

    fn delta(&self, config: &LearningConfig, t: &Transition) -> f64 {
        sarsa_delta(config.alpha, config.gamma, t.q, t.reward, t.next_q)
    }
}

/// `α · (1 / weight) · (reward + γ · max_q − q)`
pub fn q_learning_delta(alpha: f64, gamma: f64, q: f64, reward: f64, max_q: f64, weight: f64) -> f64 {
    alpha * (1.0 / weight) * (reward + gamma * max_q - q)
}

/// `α · (reward + γ · next_q − q)`
pub fn sarsa_delta(alpha: f64, gamma: f64, q: f64, reward: f64, next_q: f64) -> f64 {
    alpha * (reward + gamma * next_q - q)
}
