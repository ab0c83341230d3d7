use thiserror::Error;

use crate::algorithms::rl::Algorithm;
use crate::graph::GraphError;
use crate::VertexId;

/// A policy table that does not lead to its goal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrityError {
    #[error("Policy table for goal {goal} loops back to vertex {vertex}")]
    Cycle { goal: VertexId, vertex: VertexId },

    #[error("Policy table for goal {goal} has no entry for vertex {vertex}")]
    MissingEntry { goal: VertexId, vertex: VertexId },

    #[error("Policy table for goal {goal} hops from {from} to {to}, which are not adjacent")]
    NotAdjacent {
        goal: VertexId,
        from: VertexId,
        to: VertexId,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("No {algorithm} policy table for goal {goal}")]
    MissingPolicyTable { goal: VertexId, algorithm: Algorithm },

    #[error("Corrupted policy table: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Vertex {0} has no position")]
    MissingPosition(VertexId),
}
