//! Feed records handed over by the ingestion layer.

use super::vertex::Vertex;
use crate::VertexId;

/// One row of the vertex feed: `(id, name, category, x, y)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexRecord {
    pub id: VertexId,
    pub name: String,
    pub category: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// One row of the edge feed: `(start, end, weight)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub start: VertexId,
    pub end: VertexId,
    pub weight: f64,
}

impl From<VertexRecord> for Vertex {
    /// Blank categories are treated as untagged; coordinates are kept only
    /// when both axes are present.
    fn from(record: VertexRecord) -> Self {
        let mut vertex = Vertex::new(record.id, record.name);
        vertex.category = record
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let (Some(x), Some(y)) = (record.x, record.y) {
            vertex = vertex.with_position(x, y);
        }
        vertex
    }
}
