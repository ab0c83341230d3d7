//! Hyperparameters for training and its safety ceilings.

use super::error::ConfigError;
use super::types::ActionSelection;

/// Configuration for one training run.
///
/// Controls the update rule, exploration, goal reward, convergence detection
/// and the hard ceilings that guarantee termination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LearningConfig {
    // --- Update rule ---
    /// Learning rate α.
    pub alpha: f64,
    /// Discount factor γ.
    pub gamma: f64,

    // --- Exploration ---
    /// Exploration rate ε: probability of a uniform random action under
    /// ε-greedy selection.
    pub epsilon: f64,
    /// Action-selection strategy used while training.
    pub selection: ActionSelection,

    // --- Goal ---
    /// Reward placed on the goal vertex before training.
    pub goal_reward: f64,

    // --- Convergence ---
    /// Number of trailing entries of the value-change history that must be
    /// identical to declare convergence.
    pub convergence_window: usize,
    /// Steps between two convergence checks.
    pub convergence_check_interval: u64,

    // --- Ceilings ---
    /// Total steps across all episodes before training gives up.
    pub max_total_steps: u64,
    /// Episodes before training gives up.
    pub max_episodes: u64,
    /// Steps after which a single wandering episode is cut short.
    pub max_steps_per_episode: u64,
}

impl LearningConfig {
    /// Checks every hyperparameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Gamma(self.gamma));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        if !self.goal_reward.is_finite() || self.goal_reward <= 0.0 {
            return Err(ConfigError::GoalReward(self.goal_reward));
        }
        if self.convergence_window == 0 {
            return Err(ConfigError::ConvergenceWindow);
        }
        let limits = [
            ("convergence_check_interval", self.convergence_check_interval),
            ("max_total_steps", self.max_total_steps),
            ("max_episodes", self.max_episodes),
            ("max_steps_per_episode", self.max_steps_per_episode),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
        }
        Ok(())
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.7,
            epsilon: 0.9,
            selection: ActionSelection::EpsilonGreedy,
            goal_reward: 10.0,
            convergence_window: 5,
            convergence_check_interval: 5_000,
            max_total_steps: 500_000,
            max_episodes: 200_000,
            max_steps_per_episode: 100_000,
        }
    }
}
