use std::path::PathBuf;

use thiserror::Error;

use crate::algorithms::rl::{Algorithm, TrainingError};
use crate::VertexId;

#[derive(Debug, Error)]
pub enum PolicyTableError {
    #[error("No {algorithm} policy table for goal {goal}")]
    MissingPolicyTable { goal: VertexId, algorithm: Algorithm },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed policy table {path}, line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Training toward vertex {goal} failed: {source}")]
    Training {
        goal: VertexId,
        #[source]
        source: TrainingError,
    },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}
