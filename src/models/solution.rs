//! Solution and violation types.

use serde::Serialize;

use super::{NodeId, RequestId, Route};

/// A type of constraint violation found while walking a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViolationType {
    /// The route contains a node that is not part of the instance.
    UnknownNode {
        /// Offending node ID.
        node: NodeId,
    },
    /// Service would start after the node's time window closes.
    TimeWindowViolated {
        /// Node where the violation occurred.
        node: NodeId,
        /// Service start time after waiting.
        time: f64,
        /// Time window close.
        close: f64,
    },
    /// A delivery is visited before its pickup.
    PrecedenceViolated {
        /// Delivery node.
        node: NodeId,
        /// Request whose pickup is missing.
        request: RequestId,
    },
    /// A delivery is visited before every pickup of its paired group.
    PairingViolated {
        /// Delivery node.
        node: NodeId,
        /// Request being delivered.
        request: RequestId,
        /// A group member whose pickup has not happened yet.
        missing: RequestId,
    },
}

/// A constraint violation at a given route position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Index in the route where the walk stopped.
    pub position: usize,
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(position: usize, kind: ViolationType) -> Self {
        Self { position, kind }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationType::UnknownNode { node } => {
                write!(f, "unknown node {node} at position {}", self.position)
            }
            ViolationType::TimeWindowViolated { node, time, close } => write!(
                f,
                "node {node} at position {} served at {time} after window close {close}",
                self.position
            ),
            ViolationType::PrecedenceViolated { node, request } => write!(
                f,
                "delivery node {node} at position {} visited before pickup of request {request}",
                self.position
            ),
            ViolationType::PairingViolated {
                node,
                request,
                missing,
            } => write!(
                f,
                "delivery node {node} (request {request}) at position {} visited before paired request {missing} was picked up",
                self.position
            ),
        }
    }
}

/// Counters reported by the 2-opt improvement phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImprovementStats {
    /// Complete or interrupted scans over all (i, j) pairs.
    pub passes: usize,
    /// Accepted reversals.
    pub moves: usize,
    /// Distance of the route handed to the improver.
    pub initial_distance: f64,
    /// Distance of the returned route.
    pub final_distance: f64,
    /// `true` if a pass limit, time limit or cancellation cut the search short.
    pub stopped_early: bool,
}

/// Result of a successful solve: the constructed and the improved route.
///
/// # Examples
///
/// ```
/// use pdp_routing::models::{ImprovementStats, Route, Solution};
///
/// let route = Route::from(vec![0, 1, 2]);
/// let sol = Solution::new(route.clone(), 5.0, route, 5.0, ImprovementStats::default());
/// assert_eq!(sol.improved().nodes(), &[0, 1, 2]);
/// assert_eq!(sol.savings(), 0.0);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    constructed: Route,
    constructed_distance: f64,
    improved: Route,
    improved_distance: f64,
    improvement: ImprovementStats,
}

impl Solution {
    /// Creates a solution from both phase results.
    pub fn new(
        constructed: Route,
        constructed_distance: f64,
        improved: Route,
        improved_distance: f64,
        improvement: ImprovementStats,
    ) -> Self {
        Self {
            constructed,
            constructed_distance,
            improved,
            improved_distance,
            improvement,
        }
    }

    /// Route produced by greedy construction.
    pub fn constructed(&self) -> &Route {
        &self.constructed
    }

    /// Route produced by 2-opt improvement (the final answer).
    pub fn improved(&self) -> &Route {
        &self.improved
    }

    /// Total distance of the constructed route.
    pub fn constructed_distance(&self) -> f64 {
        self.constructed_distance
    }

    /// Total distance of the improved route.
    pub fn improved_distance(&self) -> f64 {
        self.improved_distance
    }

    /// Improvement phase counters.
    pub fn improvement(&self) -> &ImprovementStats {
        &self.improvement
    }

    /// Distance saved by the improvement phase.
    pub fn savings(&self) -> f64 {
        self.constructed_distance - self.improved_distance
    }

    /// Consumes the solution, returning `(constructed, improved)`.
    pub fn into_routes(self) -> (Route, Route) {
        (self.constructed, self.improved)
    }
}
