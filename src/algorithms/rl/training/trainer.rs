//! Episode loop driving one agent to convergence.

use log::{debug, info, warn};
use rand::Rng;

use crate::algorithms::rl::agent::{Agent, EpisodeEnd};
use crate::algorithms::rl::config::LearningConfig;
use crate::algorithms::rl::error::TrainingError;
use crate::algorithms::rl::policy::{ActionPolicy, SelectionPolicy};
use crate::algorithms::rl::types::Algorithm;
use crate::algorithms::rl::update::{QLearning, Sarsa, UpdateRule};
use crate::graph::Graph;
use crate::VertexId;

/// Why a training run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConvergenceStatus {
    /// The value-change history settled.
    Converged,
    /// An episode or step ceiling was hit first. The learned values are still
    /// usable as a best-effort policy.
    BudgetExhausted,
}

/// Summary of one training run toward a goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingReport {
    pub goal: VertexId,
    pub algorithm: Algorithm,
    pub episodes: u64,
    pub steps: u64,
    /// Episodes cut short by `max_steps_per_episode`.
    pub truncated_episodes: u64,
    pub delta_q_total: f64,
    /// Length of the value-change history, including its leading `0.0`.
    pub history_len: usize,
    pub status: ConvergenceStatus,
}

impl TrainingReport {
    pub fn is_converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}

/// Runs episodes from random starts until the learned values converge.
///
/// The update rule `U` and action policy `P` are fixed at construction; the
/// graph and random source are supplied per run so the same trainer can be
/// reused across goals.
#[derive(Debug, Clone)]
pub struct Trainer<U, P> {
    config: LearningConfig,
    rule: U,
    policy: P,
}

impl Trainer<QLearning, SelectionPolicy> {
    /// Q-learning with the policy selected by `config.selection`.
    pub fn q_learning(config: LearningConfig) -> Self {
        let policy = SelectionPolicy::from_config(&config);
        Self::new(config, QLearning, policy)
    }
}

impl Trainer<Sarsa, SelectionPolicy> {
    /// SARSA with the policy selected by `config.selection`.
    ///
    /// With the default exploration rate the on-policy updates keep
    /// bootstrapping from random follow-up actions, so the value-change
    /// history seldom settles exactly. Most SARSA runs therefore end with
    /// [`ConvergenceStatus::BudgetExhausted`] and a non-convergence warning;
    /// the greedy routes read from the learned values are still usable.
    pub fn sarsa(config: LearningConfig) -> Self {
        let policy = SelectionPolicy::from_config(&config);
        Self::new(config, Sarsa, policy)
    }
}

impl<U, P> Trainer<U, P>
where
    U: UpdateRule,
    P: ActionPolicy,
{
    pub fn new(config: LearningConfig, rule: U, policy: P) -> Self {
        Self {
            config,
            rule,
            policy,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Trains the edge values of `graph` toward `goal`.
    ///
    /// Sets the goal reward, then runs episodes from uniformly random starts
    /// until convergence or until `max_episodes` / `max_total_steps` is hit.
    /// Hitting a ceiling is not an error: the report's status says so and the
    /// values learned so far stay in `graph`.
    ///
    /// # Errors
    ///
    /// * [`TrainingError::InvalidConfig`] if the configuration is out of range
    /// * [`TrainingError::EmptyGraph`] if there is nothing to train on
    /// * [`TrainingError::Graph`] if `goal` is not in the graph
    /// * [`TrainingError::UnreachableGoal`] if `goal` has no connections
    /// * [`TrainingError::Diverged`] if an update produced a non-finite value,
    ///   typically because `alpha / weight` exceeds 2 on some edge
    pub fn train<R: Rng + ?Sized>(
        &self,
        graph: &mut Graph,
        goal: VertexId,
        rng: &mut R,
    ) -> Result<TrainingReport, TrainingError> {
        self.config.validate()?;
        if graph.is_empty() {
            return Err(TrainingError::EmptyGraph);
        }
        let goal_node = graph.lookup(goal)?;
        if graph.vertex_count() > 1 && graph.out_degree(goal_node) == 0 {
            return Err(TrainingError::UnreachableGoal(goal));
        }
        graph.define_reward(goal, self.config.goal_reward)?;

        let mut report = TrainingReport {
            goal,
            algorithm: U::ALGORITHM,
            episodes: 0,
            steps: 0,
            truncated_episodes: 0,
            delta_q_total: 0.0,
            history_len: 1,
            status: ConvergenceStatus::Converged,
        };
        if graph.vertex_count() == 1 {
            return Ok(report);
        }

        let config = &self.config;
        let mut agent = Agent::new(graph, goal_node, goal_node, &self.rule, &self.policy, config);
        while !agent.is_converged()
            && agent.episodes() < config.max_episodes
            && agent.steps() < config.max_total_steps
        {
            agent.reset(rng);
            let outcome = agent.run_episode(rng);
            debug!(
                "goal {} episode {}: {:?} after {} steps (delta_q_total={:.6})",
                goal,
                agent.episodes(),
                outcome.end,
                outcome.steps,
                agent.delta_q_total()
            );
            if outcome.end == EpisodeEnd::Diverged {
                let vertex = agent
                    .diverged_at()
                    .and_then(|node| agent.graph().vertex(node))
                    .map_or(goal, |v| v.id);
                return Err(TrainingError::Diverged { goal, vertex });
            }
            if outcome.end == EpisodeEnd::Truncated {
                report.truncated_episodes += 1;
                warn!(
                    "goal {}: episode {} truncated after {} steps",
                    goal,
                    agent.episodes(),
                    outcome.steps
                );
            }
        }

        report.status = if agent.check_convergence() {
            ConvergenceStatus::Converged
        } else {
            ConvergenceStatus::BudgetExhausted
        };
        report.episodes = agent.episodes();
        report.steps = agent.steps();
        report.delta_q_total = agent.delta_q_total();
        report.history_len = agent.history().len();

        match report.status {
            ConvergenceStatus::Converged => info!(
                "{} converged toward vertex {} after {} episodes ({} steps)",
                report.algorithm, goal, report.episodes, report.steps
            ),
            ConvergenceStatus::BudgetExhausted => warn!(
                "{} did not converge toward vertex {} within {} episodes ({} steps); keeping best-effort values",
                report.algorithm, goal, report.episodes, report.steps
            ),
        }
        Ok(report)
    }
}
