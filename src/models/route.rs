//! Route and visit types.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A single visit to a node within a route, with its computed timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    /// Node being visited.
    pub node: NodeId,
    /// Arrival time at this node (before any waiting).
    pub arrival_time: f64,
    /// Service start (arrival plus waiting for the window to open).
    pub service_start: f64,
    /// Departure time (service start + service duration).
    pub departure_time: f64,
}

/// An ordered sequence of node identifiers driven by the single vehicle.
///
/// Unlike a visit list, a `Route` stores the depots explicitly: it begins with
/// the start depot and, for closed routes, ends with the end depot.
///
/// # Examples
///
/// ```
/// use pdp_routing::models::Route;
///
/// let route = Route::from(vec![0, 1, 3, 0]);
/// assert_eq!(route.len(), 4);
/// assert_eq!(route.first(), Some(0));
/// assert_eq!(route.nodes(), &[0, 1, 3, 0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    nodes: Vec<NodeId>,
}

impl Route {
    /// Creates an empty route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node sequence.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of stops, depots included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if this route has no stops at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First stop (the start depot for a valid route).
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last stop.
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Position of the first occurrence of `node`.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Consumes the route, returning the node sequence.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl From<Vec<NodeId>> for Route {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }
}

impl From<&[NodeId]> for Route {
    fn from(nodes: &[NodeId]) -> Self {
        Self {
            nodes: nodes.to_vec(),
        }
    }
}

impl AsRef<[NodeId]> for Route {
    fn as_ref(&self) -> &[NodeId] {
        &self.nodes
    }
}
