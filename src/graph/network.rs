use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;

use super::edge::{Edge, DEFAULT_Q};
use super::error::GraphError;
use super::records::{EdgeRecord, VertexRecord};
use super::vertex::{Vertex, VertexRef};
use crate::VertexId;

/// Undirected-in-effect weighted graph over identified vertices.
///
/// # Invariants
///
/// - Vertex ids and names are unique; [`add_vertex`](Self::add_vertex) enforces this
/// - Every connection is stored as two directed edges with the same weight and
///   independent `q` values
/// - At most one edge exists per ordered `(start, end)` pair
/// - Outgoing edges keep their insertion order, which is the tie-break order
///   for greedy action selection
///
/// The structure is append-only apart from rewards and edge values. `Clone`
/// produces a fully independent copy, which is how each per-goal training run
/// gets its own edge values.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: StableGraph<Vertex, Edge, Directed>,
    node_by_id: HashMap<VertexId, NodeIndex>,
    node_by_name: HashMap<String, NodeIndex>,
    /// Outgoing edges of each node in insertion order.
    adjacency: HashMap<NodeIndex, Vec<EdgeIndex>>,
    /// Vertices in registration order.
    order: Vec<NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from vertex and edge feeds, validating every record the
    /// same way as [`add_vertex`](Self::add_vertex) and [`add_edge`](Self::add_edge).
    pub fn from_records<V, E>(vertices: V, edges: E) -> Result<Self, GraphError>
    where
        V: IntoIterator<Item = VertexRecord>,
        E: IntoIterator<Item = EdgeRecord>,
    {
        let mut graph = Self::new();
        for record in vertices {
            graph.add_vertex(record.into())?;
        }
        for record in edges {
            graph.add_edge(record.start, record.end, record.weight)?;
        }
        Ok(graph)
    }

    /// Registers a vertex.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` / `DuplicateName` if either identity is already taken
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<NodeIndex, GraphError> {
        if self.node_by_id.contains_key(&vertex.id) {
            return Err(GraphError::DuplicateId(vertex.id));
        }
        if self.node_by_name.contains_key(&vertex.name) {
            return Err(GraphError::DuplicateName(vertex.name));
        }

        let id = vertex.id;
        let name = vertex.name.clone();
        let node = self.graph.add_node(vertex);
        self.node_by_id.insert(id, node);
        self.node_by_name.insert(name, node);
        self.order.push(node);
        Ok(node)
    }

    /// Connects two vertices in both directions with the same `weight`.
    ///
    /// Returns `false` if both directions already existed (the call is then a
    /// no-op, whatever the weight).
    ///
    /// # Errors
    ///
    /// - `NotFound` if either endpoint is not registered
    /// - `InvalidWeight` if `weight` is not finite and strictly positive
    /// - `SelfLoop` if `start == end`
    pub fn add_edge(
        &mut self,
        start: VertexId,
        end: VertexId,
        weight: f64,
    ) -> Result<bool, GraphError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GraphError::InvalidWeight { start, end, weight });
        }
        let a = self.lookup(start)?;
        let b = self.lookup(end)?;
        if a == b {
            return Err(GraphError::SelfLoop(start));
        }

        let forward = self.connect(a, b, weight);
        let backward = self.connect(b, a, weight);
        Ok(forward || backward)
    }

    fn connect(&mut self, from: NodeIndex, to: NodeIndex, weight: f64) -> bool {
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        let edge = Edge::new(self.graph[from].id, self.graph[to].id, weight);
        let index = self.graph.add_edge(from, to, edge);
        self.adjacency.entry(from).or_default().push(index);
        true
    }

    /// Resolves a vertex by id or by name.
    pub fn lookup(&self, vertex: impl Into<VertexRef>) -> Result<NodeIndex, GraphError> {
        let vertex = vertex.into();
        let found = match &vertex {
            VertexRef::Id(id) => self.node_by_id.get(id),
            VertexRef::Name(name) => self.node_by_name.get(name),
        };
        found.copied().ok_or(GraphError::NotFound(vertex))
    }

    /// Returns the vertex registered under `id`.
    pub fn vertex_by_id(&self, id: VertexId) -> Result<&Vertex, GraphError> {
        let node = self.lookup(id)?;
        Ok(&self.graph[node])
    }

    pub fn vertex(&self, node: NodeIndex) -> Option<&Vertex> {
        self.graph.node_weight(node)
    }

    /// Sets the reward received on arrival at a vertex.
    pub fn define_reward(
        &mut self,
        vertex: impl Into<VertexRef>,
        reward: f64,
    ) -> Result<(), GraphError> {
        let node = self.lookup(vertex)?;
        self.graph[node].reward = reward;
        Ok(())
    }

    /// Reward of a vertex, zero for unknown indices.
    pub fn reward(&self, node: NodeIndex) -> f64 {
        self.vertex(node).map_or(0.0, |v| v.reward)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges (twice the number of connections).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node handles in registration order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.order.iter().copied()
    }

    /// Vertices in registration order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.order.iter().map(move |&node| &self.graph[node])
    }

    /// Every directed edge: vertices in registration order, then each vertex's
    /// outgoing edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.order
            .iter()
            .flat_map(move |&node| self.edges_from(node).map(|(_, edge)| edge))
    }

    /// Outgoing edge handles of `node` in insertion order.
    pub fn out_edges(&self, node: NodeIndex) -> &[EdgeIndex] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outgoing edges of `node` in insertion order.
    pub fn edges_from(&self, node: NodeIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.out_edges(node)
            .iter()
            .map(move |&index| (index, &self.graph[index]))
    }

    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.out_edges(node).len()
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&Edge> {
        self.graph.edge_weight(index)
    }

    /// Node an edge leads to.
    pub fn edge_target(&self, index: EdgeIndex) -> Option<NodeIndex> {
        self.graph.edge_endpoints(index).map(|(_, target)| target)
    }

    pub fn find_edge(&self, from: NodeIndex, to: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(from, to)
    }

    /// The directed edge `start -> end`, if the two vertices are adjacent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either vertex is not registered.
    pub fn edge_between(&self, start: VertexId, end: VertexId) -> Result<Option<&Edge>, GraphError> {
        let a = self.lookup(start)?;
        let b = self.lookup(end)?;
        Ok(self.find_edge(a, b).map(|index| &self.graph[index]))
    }

    /// Overwrites the learned value of an edge. Returns `false` for unknown edges.
    pub(crate) fn set_q(&mut self, index: EdgeIndex, q: f64) -> bool {
        match self.graph.edge_weight_mut(index) {
            Some(edge) => {
                edge.q = q;
                true
            }
            None => false,
        }
    }

    /// Largest `q` among the outgoing edges of `node`, never below [`DEFAULT_Q`].
    pub fn max_q(&self, node: NodeIndex) -> f64 {
        self.edges_from(node)
            .map(|(_, edge)| edge.q)
            .fold(DEFAULT_Q, f64::max)
    }

    /// Outgoing edge with the highest `q`; the first one wins ties.
    pub fn best_edge(&self, node: NodeIndex) -> Option<EdgeIndex> {
        let mut best: Option<(EdgeIndex, f64)> = None;
        for (index, edge) in self.edges_from(node) {
            match best {
                Some((_, q)) if edge.q <= q => {}
                _ => best = Some((index, edge.q)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Vertices tagged with any of `categories` (case-insensitive), in
    /// registration order.
    pub fn vertices_in_categories<S: AsRef<str>>(&self, categories: &[S]) -> Vec<&Vertex> {
        self.vertices()
            .filter(|v| categories.iter().any(|c| v.matches_category(c.as_ref())))
            .collect()
    }

    /// Distinct category tags present in the graph.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.vertices()
            .filter_map(|v| v.category.as_deref())
            .collect()
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph {{")?;
        writeln!(f, "  Vertices: {}", self.vertex_count())?;
        writeln!(f, "  Edges: {}", self.edge_count())?;
        for &node in &self.order {
            writeln!(f, "  {}", self.graph[node])?;
            for (_, edge) in self.edges_from(node) {
                writeln!(f, "    {}", edge)?;
            }
        }
        write!(f, "}}")
    }
}
