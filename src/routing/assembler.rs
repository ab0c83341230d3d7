//! Route assembly over frozen policy tables.

use std::collections::HashSet;

use log::debug;

use super::error::{IntegrityError, RouteError};
use super::query::{Route, RouteQuery};
use crate::algorithms::rl::Algorithm;
use crate::graph::{Graph, Position, Vertex};
use crate::policy_table::PolicySet;
use crate::VertexId;

/// Composes routes by chaining per-goal policy tables.
///
/// Reads only immutable data, so one assembler can serve any number of
/// concurrent queries.
///
/// # Direct routes
///
/// Starting at `start`, the next hop is read from the table of `goal` until
/// the goal is reached. A table that revisits a vertex, lacks an entry, or
/// hops between non-adjacent vertices is reported as an [`IntegrityError`].
///
/// # Interest routes
///
/// Vertices (other than start and goal) whose category matches one of the
/// requested interests become candidates. Up to `max_waypoints` times, the
/// candidate nearest to the current vertex in straight-line distance is
/// picked (first one wins ties), reached through its own table, and becomes
/// the current vertex. The route then finishes toward the goal.
#[derive(Debug, Clone, Copy)]
pub struct RouteAssembler<'a> {
    graph: &'a Graph,
    tables: &'a PolicySet,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(graph: &'a Graph, tables: &'a PolicySet) -> Self {
        Self { graph, tables }
    }

    pub fn route(&self, query: &RouteQuery) -> Result<Route, RouteError> {
        self.graph.lookup(query.start)?;
        self.graph.lookup(query.goal)?;

        let mut route = Route::starting_at(query.start);
        let mut current = query.start;
        if !query.is_direct() {
            current = self.visit_interests(query, &mut route)?;
        }
        let (hops, distance) = self.leg(query.algorithm, current, query.goal)?;
        route.path.extend(hops);
        route.distance += distance;

        debug!(
            "route {} -> {} ({}): {} waypoints, {} steps, distance {:.2}",
            query.start,
            query.goal,
            query.algorithm,
            route.waypoints.len(),
            route.steps(),
            route.distance
        );
        Ok(route)
    }

    /// Shortcut for a route without interests.
    pub fn direct(
        &self,
        start: VertexId,
        goal: VertexId,
        algorithm: Algorithm,
    ) -> Result<Route, RouteError> {
        self.route(&RouteQuery::new(start, goal).with_algorithm(algorithm))
    }

    /// Walks waypoints and returns the vertex the route stopped at.
    fn visit_interests(
        &self,
        query: &RouteQuery,
        route: &mut Route,
    ) -> Result<VertexId, RouteError> {
        let mut candidates: Vec<&Vertex> = self
            .graph
            .vertices_in_categories(&query.interests)
            .into_iter()
            .filter(|v| v.id != query.start && v.id != query.goal)
            .collect();
        let limit = query.max_waypoints.unwrap_or(candidates.len());

        let mut current = query.start;
        while route.waypoints.len() < limit && !candidates.is_empty() {
            let here = self.position_of(current)?;
            let Some(index) = nearest(here, &candidates)? else {
                break;
            };
            let waypoint = candidates.remove(index).id;

            let (hops, distance) = self.leg(query.algorithm, current, waypoint)?;
            for hop in &hops {
                if let Some(pos) = candidates.iter().position(|v| v.id == *hop) {
                    candidates.remove(pos);
                    route.incidental.push(*hop);
                }
            }
            route.path.extend(hops);
            route.distance += distance;
            route.waypoints.push(waypoint);
            current = waypoint;
        }
        Ok(current)
    }

    /// Follows the table of `goal` from `from`, returning the hops taken
    /// (excluding `from`) and their total weight.
    fn leg(
        &self,
        algorithm: Algorithm,
        from: VertexId,
        goal: VertexId,
    ) -> Result<(Vec<VertexId>, f64), RouteError> {
        let table = self
            .tables
            .get(algorithm, goal)
            .ok_or(RouteError::MissingPolicyTable { goal, algorithm })?;

        // Every hop adds an unvisited vertex or fails, so the walk is bounded
        // by the vertex count.
        let mut hops = Vec::new();
        let mut distance = 0.0;
        let mut visited = HashSet::from([from]);
        let mut current = from;
        loop {
            if current == goal {
                debug!("{} -> {}: {} hops, distance {:.2}", from, goal, hops.len(), distance);
                return Ok((hops, distance));
            }
            let next = table
                .next_hop(current)
                .ok_or(IntegrityError::MissingEntry { goal, vertex: current })?;
            self.graph.lookup(next)?;
            let edge = self
                .graph
                .edge_between(current, next)?
                .ok_or(IntegrityError::NotAdjacent {
                    goal,
                    from: current,
                    to: next,
                })?;
            if !visited.insert(next) {
                return Err(IntegrityError::Cycle { goal, vertex: next }.into());
            }
            distance += edge.weight;
            hops.push(next);
            current = next;
        }
    }

    fn position_of(&self, id: VertexId) -> Result<Position, RouteError> {
        self.graph
            .vertex_by_id(id)?
            .position
            .ok_or(RouteError::MissingPosition(id))
    }
}

/// Index of the candidate closest to `here`; the first one wins ties.
fn nearest(here: Position, candidates: &[&Vertex]) -> Result<Option<usize>, RouteError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, vertex) in candidates.iter().enumerate() {
        let position = vertex.position.ok_or(RouteError::MissingPosition(vertex.id))?;
        let distance = here.distance_to(&position);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    Ok(best.map(|(index, _)| index))
}
