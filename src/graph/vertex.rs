use std::fmt;

use super::position::Position;
use crate::VertexId;

/// A location in the indoor graph.
///
/// Identity (`id`, `name`) is fixed at construction. `reward` is only non-zero
/// on the vertex currently being trained toward.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub id: VertexId,
    pub name: String,
    /// Interest category tag (e.g. "Food", "Tech").
    pub category: Option<String>,
    pub position: Option<Position>,
    pub reward: f64,
}

impl Vertex {
    /// Creates an untagged vertex with no coordinates and zero reward.
    pub fn new(id: VertexId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            position: None,
            reward: 0.0,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Returns true if this vertex is tagged with `category`, ignoring case
    /// and surrounding whitespace.
    pub fn matches_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(category.trim()))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vertex {} '{}' | R={}", self.id, self.name, self.reward)
    }
}

/// A way of referring to a vertex: by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VertexRef {
    Id(VertexId),
    Name(String),
}

impl From<VertexId> for VertexRef {
    fn from(id: VertexId) -> Self {
        VertexRef::Id(id)
    }
}

impl From<&str> for VertexRef {
    fn from(name: &str) -> Self {
        VertexRef::Name(name.to_string())
    }
}

impl From<String> for VertexRef {
    fn from(name: String) -> Self {
        VertexRef::Name(name)
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexRef::Id(id) => write!(f, "id {}", id),
            VertexRef::Name(name) => write!(f, "name '{}'", name),
        }
    }
}
