//! Trains one policy table per goal vertex, in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::error::PolicyTableError;
use super::store::{PolicySet, PolicyStore};
use super::table::PolicyTable;
use crate::algorithms::rl::{Algorithm, LearningConfig, Trainer, TrainingError, TrainingReport};
use crate::graph::Graph;
use crate::{generate_run_id, RunId, VertexId};

/// Successful build of one goal's table.
#[derive(Debug, Clone)]
pub struct GoalBuild {
    pub table: PolicyTable,
    pub report: TrainingReport,
    /// Training runs spent, including non-converged retries.
    pub attempts: u32,
}

/// A goal whose training could not run at all.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalFailure {
    pub goal: VertexId,
    pub attempts: u32,
    pub error: TrainingError,
}

impl From<GoalFailure> for PolicyTableError {
    fn from(failure: GoalFailure) -> Self {
        PolicyTableError::Training {
            goal: failure.goal,
            source: failure.error,
        }
    }
}

/// Outcome of building the tables of every goal.
#[derive(Debug)]
pub struct BuildReport {
    pub run_id: RunId,
    pub algorithm: Algorithm,
    pub tables: PolicySet,
    /// Training reports of the goals that produced a table, in vertex order.
    pub reports: Vec<TrainingReport>,
    pub failures: Vec<GoalFailure>,
    /// Trained tables that [`PolicyTableBuilder::build_into`] could not save.
    pub save_failures: Vec<(VertexId, PolicyTableError)>,
}

impl BuildReport {
    /// Goals whose table is only a best-effort result.
    pub fn non_converged(&self) -> Vec<VertexId> {
        self.reports
            .iter()
            .filter(|report| !report.is_converged())
            .map(|report| report.goal)
            .collect()
    }

    /// True when every goal produced a table and every save succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.save_failures.is_empty()
    }

    pub fn into_policy_set(self) -> PolicySet {
        self.tables
    }
}

/// Builds per-goal policy tables.
///
/// Every goal trains on its own deep copy of the graph with its own seeded
/// random source, so goals share no mutable state and run on a bounded
/// worker pool. A run that ends without converging is retried with a fresh
/// seed up to `max_retries` times; the last attempt's table is kept either
/// way. A goal that cannot be trained at all is reported in
/// [`BuildReport::failures`] without stopping the other goals.
///
/// # Example
///
/// ```
/// use qroute::algorithms::rl::{Algorithm, LearningConfig};
/// use qroute::graph::{Graph, Vertex};
/// use qroute::policy_table::PolicyTableBuilder;
///
/// let mut graph = Graph::new();
/// graph.add_vertex(Vertex::new(0, "lobby")).unwrap();
/// graph.add_vertex(Vertex::new(1, "cafe")).unwrap();
/// graph.add_edge(0, 1, 2.0).unwrap();
///
/// let report = PolicyTableBuilder::new(LearningConfig::default(), Algorithm::QLearning)
///     .with_seed(7)
///     .build_all(&graph)
///     .unwrap();
/// let table = report.tables.get(Algorithm::QLearning, 1).unwrap();
/// assert_eq!(table.next_hop(0), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct PolicyTableBuilder {
    config: LearningConfig,
    algorithm: Algorithm,
    seed: u64,
    max_workers: Option<usize>,
    max_retries: u32,
}

impl PolicyTableBuilder {
    pub fn new(config: LearningConfig, algorithm: Algorithm) -> Self {
        Self {
            config,
            algorithm,
            seed: 0,
            max_workers: None,
            max_retries: 1,
        }
    }

    /// Base seed every per-goal random source is derived from.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Caps the number of concurrent training runs. Defaults to the number of
    /// available CPUs.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Extra attempts granted to a goal whose training does not converge.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Trains toward one goal on a private copy of `graph`.
    pub fn build_goal(&self, graph: &Graph, goal: VertexId) -> Result<GoalBuild, GoalFailure> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let (table, report) =
                self.train_once(graph, goal, attempts)
                    .map_err(|error| GoalFailure {
                        goal,
                        attempts,
                        error,
                    })?;
            if report.is_converged() || attempts > self.max_retries {
                return Ok(GoalBuild {
                    table,
                    report,
                    attempts,
                });
            }
            warn!(
                "vertex {}: attempt {} did not converge, retrying with a fresh seed",
                goal, attempts
            );
        }
    }

    fn train_once(
        &self,
        graph: &Graph,
        goal: VertexId,
        attempt: u32,
    ) -> Result<(PolicyTable, TrainingReport), TrainingError> {
        let mut working = graph.clone();
        let mut rng = StdRng::seed_from_u64(derive_seed(self.seed, goal, attempt));
        let config = self.config.clone();
        let report = match self.algorithm {
            Algorithm::QLearning => Trainer::q_learning(config).train(&mut working, goal, &mut rng)?,
            Algorithm::Sarsa => Trainer::sarsa(config).train(&mut working, goal, &mut rng)?,
        };
        let table = PolicyTable::from_trained(&working, goal, self.algorithm);
        Ok((table, report))
    }

    /// Builds the table of every vertex of `graph` as goal.
    ///
    /// # Errors
    ///
    /// Only fails if the worker pool cannot be started; per-goal failures are
    /// collected in the report.
    pub fn build_all(&self, graph: &Graph) -> Result<BuildReport, PolicyTableError> {
        let run_id = generate_run_id();
        let goals: Vec<VertexId> = graph.vertices().map(|v| v.id).collect();
        let total = goals.len().max(1);
        info!(
            "run {}: building {} {} policy tables",
            run_id,
            goals.len(),
            self.algorithm
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers.unwrap_or(0))
            .build()
            .map_err(|e| PolicyTableError::ThreadPool(e.to_string()))?;

        let done = AtomicUsize::new(0);
        let results: Vec<Result<GoalBuild, GoalFailure>> = pool.install(|| {
            goals
                .par_iter()
                .map(|&goal| {
                    let result = self.build_goal(graph, goal);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(
                        "run {}: {}% - finished training toward vertex {}",
                        run_id,
                        finished * 100 / total,
                        goal
                    );
                    result
                })
                .collect()
        });

        let mut report = BuildReport {
            run_id,
            algorithm: self.algorithm,
            tables: PolicySet::new(),
            reports: Vec::with_capacity(results.len()),
            failures: Vec::new(),
            save_failures: Vec::new(),
        };
        for result in results {
            match result {
                Ok(build) => {
                    report.tables.insert(build.table);
                    report.reports.push(build.report);
                }
                Err(failure) => {
                    error!(
                        "run {}: vertex {} failed after {} attempt(s): {}",
                        report.run_id, failure.goal, failure.attempts, failure.error
                    );
                    report.failures.push(failure);
                }
            }
        }

        let non_converged = report.non_converged();
        if !non_converged.is_empty() {
            warn!(
                "run {}: {} table(s) did not converge: {:?}",
                report.run_id,
                non_converged.len(),
                non_converged
            );
        }
        Ok(report)
    }

    /// Builds every table and saves the successful ones into `store`.
    ///
    /// Every table is saved independently, in goal order. A failed save is
    /// logged and collected in [`BuildReport::save_failures`]; the trained
    /// tables stay in the report either way.
    pub fn build_into<S: PolicyStore>(
        &self,
        graph: &Graph,
        store: &mut S,
    ) -> Result<BuildReport, PolicyTableError> {
        let mut report = self.build_all(graph)?;
        for goal in report.tables.goals(self.algorithm) {
            let Some(table) = report.tables.get(self.algorithm, goal) else {
                continue;
            };
            if let Err(e) = store.save(table) {
                error!(
                    "run {}: failed to save table for vertex {}: {}",
                    report.run_id, goal, e
                );
                report.save_failures.push((goal, e));
            }
        }
        Ok(report)
    }
}

fn derive_seed(seed: u64, goal: VertexId, attempt: u32) -> u64 {
    let key = (u64::from(goal) << 32) | u64::from(attempt);
    seed ^ key.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
