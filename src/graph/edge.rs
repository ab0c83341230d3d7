use std::fmt;

use crate::VertexId;

/// Value every edge starts training from.
pub const DEFAULT_Q: f64 = 0.0;

/// One direction of a physical connection.
///
/// `weight` is the static physical cost; `q` is the learned estimate of the
/// long-term value of taking this edge toward the current goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub start: VertexId,
    pub end: VertexId,
    pub weight: f64,
    pub q: f64,
}

impl Edge {
    pub fn new(start: VertexId, end: VertexId, weight: f64) -> Self {
        Self {
            start,
            end,
            weight,
            q: DEFAULT_Q,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({} - {:.4})", self.start, self.end, self.weight, self.q)
    }
}
