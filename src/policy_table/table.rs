//! Frozen next-hop tables, one per goal and algorithm.

use std::collections::BTreeMap;

use crate::algorithms::rl::Algorithm;
use crate::graph::{Graph, DEFAULT_Q};
use crate::VertexId;

/// Learned next hop of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyEntry {
    pub next: VertexId,
    pub q: f64,
}

/// Persisted row shape: `vertex,next,q`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyRecord {
    pub vertex: VertexId,
    pub next: VertexId,
    pub q: f64,
}

/// Mapping from every vertex to its greedy next hop toward `goal`.
///
/// Read-only once built. The goal maps to itself with value `0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyTable {
    goal: VertexId,
    algorithm: Algorithm,
    entries: BTreeMap<VertexId, PolicyEntry>,
}

impl PolicyTable {
    pub fn new(goal: VertexId, algorithm: Algorithm) -> Self {
        Self {
            goal,
            algorithm,
            entries: BTreeMap::new(),
        }
    }

    /// Freezes the values trained toward `goal` into a table.
    ///
    /// Every vertex with outgoing edges maps to the end of its first
    /// highest-value edge. Vertices without edges get no row.
    pub fn from_trained(graph: &Graph, goal: VertexId, algorithm: Algorithm) -> Self {
        let mut table = Self::new(goal, algorithm);
        for node in graph.node_indices() {
            let Some(vertex) = graph.vertex(node) else {
                continue;
            };
            if vertex.id == goal {
                table.insert(goal, goal, DEFAULT_Q);
                continue;
            }
            if let Some(edge) = graph.best_edge(node).and_then(|e| graph.edge(e)) {
                table.insert(vertex.id, edge.end, edge.q);
            }
        }
        table
    }

    pub fn from_records<I>(goal: VertexId, algorithm: Algorithm, records: I) -> Self
    where
        I: IntoIterator<Item = PolicyRecord>,
    {
        let mut table = Self::new(goal, algorithm);
        for record in records {
            table.insert(record.vertex, record.next, record.q);
        }
        table
    }

    pub fn goal(&self) -> VertexId {
        self.goal
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sets the next hop of `vertex`, returning the previous entry if any.
    pub fn insert(&mut self, vertex: VertexId, next: VertexId, q: f64) -> Option<PolicyEntry> {
        self.entries.insert(vertex, PolicyEntry { next, q })
    }

    pub fn next_hop(&self, vertex: VertexId) -> Option<VertexId> {
        self.entries.get(&vertex).map(|entry| entry.next)
    }

    pub fn entry(&self, vertex: VertexId) -> Option<&PolicyEntry> {
        self.entries.get(&vertex)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in ascending vertex order.
    pub fn records(&self) -> impl Iterator<Item = PolicyRecord> + '_ {
        self.entries.iter().map(|(&vertex, entry)| PolicyRecord {
            vertex,
            next: entry.next,
            q: entry.q,
        })
    }
}
