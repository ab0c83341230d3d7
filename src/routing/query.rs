use std::fmt;

use crate::algorithms::rl::Algorithm;
use crate::VertexId;

/// A route request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteQuery {
    pub start: VertexId,
    pub goal: VertexId,
    pub algorithm: Algorithm,
    /// Interest categories to detour through; empty for a direct route.
    pub interests: Vec<String>,
    /// Most waypoints to visit; `None` visits every matching vertex.
    pub max_waypoints: Option<usize>,
}

impl RouteQuery {
    pub fn new(start: VertexId, goal: VertexId) -> Self {
        Self {
            start,
            goal,
            algorithm: Algorithm::default(),
            interests: Vec::new(),
            max_waypoints: None,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_waypoints(mut self, max: usize) -> Self {
        self.max_waypoints = Some(max);
        self
    }

    /// Splits a comma-separated interest list, lower-cased and trimmed.
    pub fn parse_interests(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    pub fn is_direct(&self) -> bool {
        self.interests.is_empty() || self.max_waypoints == Some(0)
    }
}

/// An assembled route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Visited vertices from start to goal.
    pub path: Vec<VertexId>,
    /// Sum of the physical weights of the edges walked.
    pub distance: f64,
    /// Interest vertices selected as waypoints, in visiting order.
    pub waypoints: Vec<VertexId>,
    /// Interest vertices passed on the way to a waypoint. They are not
    /// selected again and do not count toward the waypoint limit.
    pub incidental: Vec<VertexId>,
}

impl Route {
    pub(crate) fn starting_at(start: VertexId) -> Self {
        Self {
            path: vec![start],
            distance: 0.0,
            waypoints: Vec::new(),
            incidental: Vec::new(),
        }
    }

    /// Number of hops walked.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn last(&self) -> Option<VertexId> {
        self.path.last().copied()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(|id| id.to_string()).collect();
        write!(
            f,
            "{} ({} steps, distance {:.2})",
            path.join(" -> "),
            self.steps(),
            self.distance
        )
    }
}
