//! qroute - interest-biased indoor routing over learned next-hop policies.
//!
//! Routes are learned offline: for every destination vertex a tabular agent
//! (Q-learning or SARSA) walks the graph until its edge values settle, and the
//! greedy next hop of every vertex is frozen into a per-goal policy table.
//! At query time the [`routing::RouteAssembler`] chains those tables, optionally
//! detouring through vertices tagged with requested interest categories.

pub mod algorithms;
pub mod graph;
pub mod policy_table;
pub mod routing;

pub use algorithms::rl::{Algorithm, LearningConfig, Trainer, TrainingReport};
pub use graph::{Graph, GraphError, Position, Vertex};
pub use policy_table::{PolicySet, PolicyTable, PolicyTableBuilder};
pub use routing::{Route, RouteAssembler, RouteError, RouteQuery};

/// Identifier type used for vertices in feeds, policy tables and routes.
pub type VertexId = u32;

/// Identifier type used for policy-table build runs.
pub type RunId = String;

/// Generates a new unique run identifier (UUID v4).
pub fn generate_run_id() -> RunId {
    uuid::Uuid::new_v4().to_string()
}
