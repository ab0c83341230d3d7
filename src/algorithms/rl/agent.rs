//! Tabular agent walking the graph toward a single goal.

use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::config::LearningConfig;
use super::policy::ActionPolicy;
use super::training::convergence::ConvergenceTracker;
use super::update::{Transition, UpdateRule};
use crate::graph::{Graph, DEFAULT_Q};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    ReachedGoal,
    /// The walk hit `max_steps_per_episode`.
    Truncated,
    /// The walk started on a vertex without outgoing edges.
    DeadEnd,
    /// The run-wide `max_total_steps` budget ran out mid-episode.
    BudgetExhausted,
    /// An update produced a non-finite value; see [`Agent::diverged_at`].
    Diverged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeOutcome {
    pub steps: u64,
    pub end: EpisodeEnd,
}

/// Training state of one agent learning edge values toward `goal`.
///
/// The agent holds exclusive access to the graph it trains on: edge values
/// are updated in place and no other walker may share them.
///
/// # Lifecycle
///
/// 1. [`Agent::new`] places the agent on a start vertex.
/// 2. [`Agent::reset`] moves it to a uniformly random vertex for a new episode.
/// 3. [`Agent::run_episode`] walks until the goal (or a ceiling) is reached,
///    updating the value of every edge taken.
/// 4. [`Agent::is_converged`] reports whether the value-change history settled.
pub struct Agent<'a, U, P> {
    graph: &'a mut Graph,
    rule: &'a U,
    policy: &'a P,
    config: &'a LearningConfig,
    goal: NodeIndex,
    nodes: Vec<NodeIndex>,
    current: NodeIndex,
    path: Vec<NodeIndex>,
    /// Follow-up action already chosen by an on-policy update.
    pending: Option<EdgeIndex>,
    episodes: u64,
    steps: u64,
    delta_q_total: f64,
    tracker: ConvergenceTracker,
    converged: bool,
    /// Vertex whose outgoing update blew up, if any.
    diverged: Option<NodeIndex>,
}

impl<'a, U, P> Agent<'a, U, P>
where
    U: UpdateRule,
    P: ActionPolicy,
{
    pub fn new(
        graph: &'a mut Graph,
        goal: NodeIndex,
        start: NodeIndex,
        rule: &'a U,
        policy: &'a P,
        config: &'a LearningConfig,
    ) -> Self {
        let nodes = graph.node_indices().collect();
        Self {
            graph,
            rule,
            policy,
            config,
            goal,
            nodes,
            current: start,
            path: vec![start],
            pending: None,
            episodes: 0,
            steps: 0,
            delta_q_total: 0.0,
            tracker: ConvergenceTracker::new(config.convergence_window),
            converged: false,
            diverged: None,
        }
    }

    /// Starts a new episode from a uniformly random vertex.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(&start) = self.nodes.choose(rng) {
            self.current = start;
        }
        self.path.clear();
        self.path.push(self.current);
        self.pending = None;
    }

    /// Takes one action from the current vertex and updates the value of the
    /// edge taken.
    ///
    /// Returns the vertex arrived at, or `None` if the current vertex has no
    /// outgoing edges or the update diverged. A diverged update leaves the
    /// edge value untouched and the agent where it was.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<NodeIndex> {
        let action = match self.pending.take() {
            Some(action) => action,
            None => self.policy.select(self.graph(), self.current, rng)?,
        };
        let next = self.graph().edge_target(action)?;
        let (q, weight) = self.graph().edge(action).map(|e| (e.q, e.weight))?;

        let follow_up = if U::ON_POLICY && next != self.goal {
            self.policy.select(self.graph(), next, rng)
        } else {
            None
        };
        let next_q = follow_up
            .and_then(|e| self.graph().edge(e))
            .map_or(DEFAULT_Q, |e| e.q);

        let transition = Transition {
            q,
            weight,
            reward: self.graph().reward(next),
            max_next_q: self.graph().max_q(next),
            next_q,
        };
        let delta = self.rule.delta(self.config, &transition);
        if !self.apply(action, q, delta) {
            self.diverged = Some(self.current);
            self.pending = None;
            return None;
        }

        self.pending = follow_up;
        self.current = next;
        self.path.push(next);
        self.steps += 1;
        Some(next)
    }

    fn apply(&mut self, action: EdgeIndex, q: f64, delta: f64) -> bool {
        let updated = q + delta;
        let total = self.delta_q_total + delta;
        if !updated.is_finite() || !total.is_finite() {
            return false;
        }
        self.graph.set_q(action, updated);
        self.delta_q_total = total;
        if delta != 0.0 {
            self.tracker.record(total);
        }
        true
    }

    /// Walks from the current vertex until the goal, a dead end, or one of the
    /// step ceilings is reached. Convergence is checked every
    /// `convergence_check_interval` steps along the way.
    pub fn run_episode<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EpisodeOutcome {
        let interval = self.config.convergence_check_interval.max(1);
        let mut taken = 0;
        let end = loop {
            if self.current == self.goal {
                break EpisodeEnd::ReachedGoal;
            }
            if self.steps >= self.config.max_total_steps {
                break EpisodeEnd::BudgetExhausted;
            }
            if taken >= self.config.max_steps_per_episode {
                break EpisodeEnd::Truncated;
            }
            if self.step(rng).is_none() {
                break match self.diverged {
                    Some(_) => EpisodeEnd::Diverged,
                    None => EpisodeEnd::DeadEnd,
                };
            }
            taken += 1;
            if self.steps % interval == 0 {
                self.check_convergence();
            }
        };
        self.episodes += 1;
        EpisodeOutcome { steps: taken, end }
    }

    /// Re-evaluates the convergence predicate. Once converged, stays converged.
    pub fn check_convergence(&mut self) -> bool {
        if !self.converged && self.tracker.is_converged() {
            self.converged = true;
        }
        self.converged
    }

    /// Follows the highest-value edges from `start` without learning.
    ///
    /// Stops at the goal, at a vertex without edges, or right after the first
    /// revisited vertex; callers check whether the last vertex is the goal.
    pub fn greedy_path(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let mut current = start;
        while current != self.goal {
            let Some(next) = self
                .graph()
                .best_edge(current)
                .and_then(|e| self.graph().edge_target(e))
            else {
                break;
            };
            path.push(next);
            if !visited.insert(next) {
                break;
            }
            current = next;
        }
        path
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    pub fn goal(&self) -> NodeIndex {
        self.goal
    }

    pub fn current(&self) -> NodeIndex {
        self.current
    }

    /// Vertices visited in the current episode.
    pub fn path(&self) -> &[NodeIndex] {
        &self.path
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn delta_q_total(&self) -> f64 {
        self.delta_q_total
    }

    /// Running `delta_q_total` after every non-zero update, starting at `0.0`.
    pub fn history(&self) -> &[f64] {
        self.tracker.history()
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn diverged_at(&self) -> Option<NodeIndex> {
        self.diverged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::rl::policy::{GreedyPolicy, RandomPolicy};
    use crate::algorithms::rl::update::{QLearning, Sarsa};
    use crate::graph::Vertex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always takes the first outgoing edge and counts how often it is asked.
    #[derive(Default)]
    struct FirstEdge {
        calls: AtomicUsize,
    }

    impl ActionPolicy for FirstEdge {
        fn select<R: Rng + ?Sized>(
            &self,
            graph: &Graph,
            at: NodeIndex,
            _rng: &mut R,
        ) -> Option<EdgeIndex> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            graph.out_edges(at).first().copied()
        }

        fn name(&self) -> &str {
            "first_edge"
        }
    }

    fn graph_of(n: u32, edges: &[(u32, u32, f64)]) -> Graph {
        let mut g = Graph::new();
        for id in 0..n {
            g.add_vertex(Vertex::new(id, format!("v{}", id))).unwrap();
        }
        for &(a, b, w) in edges {
            g.add_edge(a, b, w).unwrap();
        }
        g
    }

    fn q_of(g: &Graph, a: u32, b: u32) -> f64 {
        g.edge_between(a, b).unwrap().unwrap().q
    }

    #[test]
    fn q_learning_step_updates_taken_edge() {
        let mut g = graph_of(2, &[(0, 1, 2.0)]);
        g.define_reward(1, 10.0).unwrap();
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(1).unwrap());
        let cfg = LearningConfig::default();

        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &GreedyPolicy, &cfg);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(agent.step(&mut rng), Some(goal));
        assert_eq!(agent.path(), &[start, goal]);
        assert!((agent.delta_q_total() - 1.5).abs() < 1e-12);
        assert_eq!(agent.history().len(), 2);

        // 0.3 · (1/2) · (10 + 0.7·0 − 0)
        assert!((q_of(&g, 0, 1) - 1.5).abs() < 1e-12);
        assert_eq!(q_of(&g, 1, 0), DEFAULT_Q);
    }

    #[test]
    fn zero_delta_is_not_recorded() {
        let mut g = graph_of(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(2).unwrap());
        let cfg = LearningConfig::default();
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &GreedyPolicy, &cfg);
        let mut rng = StdRng::seed_from_u64(0);
        agent.step(&mut rng);
        assert_eq!(agent.delta_q_total(), 0.0);
        assert_eq!(agent.history(), &[0.0]);
    }

    /// V's first edge (to W) is worth 1.0 while its best edge (to X) is worth
    /// 5.0. Taking U -> V must bootstrap from 1.0 under SARSA and from 5.0
    /// under Q-learning.
    #[test]
    fn sarsa_bootstraps_from_chosen_action_not_max() {
        // ids: U=0, V=1, W=2, X=3, goal=4 (reachable from W)
        let mut base = graph_of(5, &[(1, 2, 1.0), (1, 3, 1.0), (0, 1, 1.0), (2, 4, 1.0)]);
        let v = base.lookup(1).unwrap();
        let vw = base.find_edge(v, base.lookup(2).unwrap()).unwrap();
        let vx = base.find_edge(v, base.lookup(3).unwrap()).unwrap();
        base.set_q(vw, 1.0);
        base.set_q(vx, 5.0);
        let (start, goal) = (base.lookup(0).unwrap(), base.lookup(4).unwrap());
        let cfg = LearningConfig::default();
        let policy = FirstEdge::default();
        let mut rng = StdRng::seed_from_u64(0);

        let mut sarsa_graph = base.clone();
        let mut sarsa = Agent::new(&mut sarsa_graph, goal, start, &Sarsa, &policy, &cfg);
        sarsa.step(&mut rng);
        let sarsa_delta = sarsa.delta_q_total();

        let mut q_graph = base.clone();
        let mut qlearning = Agent::new(&mut q_graph, goal, start, &QLearning, &policy, &cfg);
        qlearning.step(&mut rng);
        let q_delta = qlearning.delta_q_total();

        assert!((sarsa_delta - cfg.alpha * cfg.gamma * 1.0).abs() < 1e-12);
        assert!((q_delta - cfg.alpha * cfg.gamma * 5.0).abs() < 1e-12);
        assert_ne!(sarsa_delta, q_delta);
        assert!((q_of(&sarsa_graph, 0, 1) - sarsa_delta).abs() < 1e-12);
    }

    #[test]
    fn sarsa_executes_the_action_it_bootstrapped_from() {
        // Line 0 - 1 - 2 - 3, goal 3. FirstEdge from 1 goes back to 0, so the
        // walk never reaches the goal within the ceiling.
        let mut g = graph_of(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(3).unwrap());
        let cfg = LearningConfig {
            max_steps_per_episode: 4,
            ..LearningConfig::default()
        };

        let policy = FirstEdge::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut agent = Agent::new(&mut g, goal, start, &Sarsa, &policy, &cfg);
        let outcome = agent.run_episode(&mut rng);
        assert_eq!(outcome.end, EpisodeEnd::Truncated);
        // One initial choice plus one follow-up per step.
        assert_eq!(policy.calls.load(Ordering::SeqCst), 5);

        let policy = FirstEdge::default();
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &policy, &cfg);
        agent.run_episode(&mut rng);
        assert_eq!(policy.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn episode_reaches_goal() {
        let mut g = graph_of(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        g.define_reward(3, 10.0).unwrap();
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(3).unwrap());
        let cfg = LearningConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &RandomPolicy, &cfg);

        let outcome = agent.run_episode(&mut rng);
        assert_eq!(outcome.end, EpisodeEnd::ReachedGoal);
        assert!(outcome.steps >= 3);
        assert_eq!(agent.current(), goal);
        assert_eq!(agent.episodes(), 1);
        assert_eq!(agent.path().first(), Some(&start));
        assert_eq!(agent.path().last(), Some(&goal));
        assert!(agent.delta_q_total() > 0.0);
    }

    #[test]
    fn unreachable_goal_truncates_episode() {
        let mut g = graph_of(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(3).unwrap());
        let cfg = LearningConfig {
            max_steps_per_episode: 25,
            ..LearningConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &RandomPolicy, &cfg);
        let outcome = agent.run_episode(&mut rng);
        assert_eq!(outcome, EpisodeOutcome { steps: 25, end: EpisodeEnd::Truncated });
    }

    #[test]
    fn total_budget_stops_episode() {
        let mut g = graph_of(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(3).unwrap());
        let cfg = LearningConfig {
            max_total_steps: 10,
            ..LearningConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &RandomPolicy, &cfg);
        let outcome = agent.run_episode(&mut rng);
        assert_eq!(outcome.end, EpisodeEnd::BudgetExhausted);
        assert_eq!(agent.steps(), 10);
    }

    #[test]
    fn isolated_start_is_dead_end() {
        let mut g = graph_of(3, &[(0, 1, 1.0)]);
        let (start, goal) = (g.lookup(2).unwrap(), g.lookup(1).unwrap());
        let cfg = LearningConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &RandomPolicy, &cfg);
        assert_eq!(agent.run_episode(&mut rng).end, EpisodeEnd::DeadEnd);
    }

    #[test]
    fn overshooting_update_stops_episode() {
        // alpha / weight = 3: every update on 0 -> 1 overshoots and doubles.
        let mut g = graph_of(2, &[(0, 1, 0.1)]);
        g.define_reward(1, 10.0).unwrap();
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(1).unwrap());
        let edge = g.find_edge(start, goal).unwrap();
        g.set_q(edge, f64::MAX);
        let cfg = LearningConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &GreedyPolicy, &cfg);

        let outcome = agent.run_episode(&mut rng);
        assert_eq!(outcome, EpisodeOutcome { steps: 0, end: EpisodeEnd::Diverged });
        assert_eq!(agent.diverged_at(), Some(start));
        assert_eq!(agent.current(), start);
        assert_eq!(agent.delta_q_total(), 0.0);
        assert_eq!(q_of(&g, 0, 1), f64::MAX);
    }

    #[test]
    fn reset_clears_path() {
        let mut g = graph_of(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let (start, goal) = (g.lookup(0).unwrap(), g.lookup(2).unwrap());
        let cfg = LearningConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut agent = Agent::new(&mut g, goal, start, &QLearning, &RandomPolicy, &cfg);
        agent.run_episode(&mut rng);
        agent.reset(&mut rng);
        assert_eq!(agent.path(), &[agent.current()]);
    }

    #[test]
    fn greedy_path_follows_values() {
        let mut g = graph_of(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let n: Vec<NodeIndex> = (0..3).map(|id| g.lookup(id).unwrap()).collect();
        let e01 = g.find_edge(n[0], n[1]).unwrap();
        let e12 = g.find_edge(n[1], n[2]).unwrap();
        g.set_q(e01, 7.0);
        g.set_q(e12, 10.0);
        let cfg = LearningConfig::default();
        let agent = Agent::new(&mut g, n[2], n[0], &QLearning, &GreedyPolicy, &cfg);
        assert_eq!(agent.greedy_path(n[0]), vec![n[0], n[1], n[2]]);
    }

    #[test]
    fn greedy_path_stops_on_loop() {
        let mut g = graph_of(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let n: Vec<NodeIndex> = (0..3).map(|id| g.lookup(id).unwrap()).collect();
        let cfg = LearningConfig::default();
        // All values untouched: 0 -> 1 -> 0 loops.
        let agent = Agent::new(&mut g, n[2], n[0], &QLearning, &GreedyPolicy, &cfg);
        assert_eq!(agent.greedy_path(n[0]), vec![n[0], n[1], n[0]]);
    }
}
