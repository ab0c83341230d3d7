use thiserror::Error;

use super::vertex::VertexRef;
use crate::VertexId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex not found: {0}")]
    NotFound(VertexRef),

    #[error("Vertex ID already exists: {0}")]
    DuplicateId(VertexId),

    #[error("Vertex name already exists: {0}")]
    DuplicateName(String),

    #[error("Invalid weight {weight} on edge {start} -> {end}: weights must be finite and positive")]
    InvalidWeight {
        start: VertexId,
        end: VertexId,
        weight: f64,
    },

    #[error("Self-loop on vertex {0} is not allowed")]
    SelfLoop(VertexId),
}
