//! Problem instance and its builder.

use std::collections::HashMap;

use serde::Deserialize;

use super::{InstanceError, NodeId, Request, RequestId, Route, TimeWindow};
use crate::distance::{total_distance, DistanceMatrix, NodeIndex};

/// Builder for [`Instance`].
///
/// Also the serde representation of an instance: deserializing an `Instance`
/// goes through this type and [`InstanceBuilder::build`], so JSON input gets
/// the same validation as programmatic input.
///
/// ```json
/// {
///   "nodes": [0, 1, 2],
///   "start": 0,
///   "requests": [{ "id": 1, "pickup": 1, "delivery": 2 }],
///   "distances": [[0, 2, 3], [2, 0, 4], [3, 4, 0]],
///   "time_windows": { "2": [0, 50] }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceBuilder {
    nodes: Vec<NodeId>,
    start: NodeId,
    #[serde(default)]
    end: Option<NodeId>,
    #[serde(default)]
    requests: Vec<Request>,
    #[serde(default)]
    distances: Option<DistanceMatrix>,
    #[serde(default)]
    travel_times: Option<DistanceMatrix>,
    #[serde(default)]
    service_times: HashMap<NodeId, f64>,
    #[serde(default)]
    time_windows: HashMap<NodeId, TimeWindow>,
    #[serde(default)]
    default_time_window: Option<TimeWindow>,
    #[serde(default)]
    paired_groups: Vec<Vec<RequestId>>,
}

impl InstanceBuilder {
    /// Sets the end depot (closed route).
    pub fn with_end(mut self, end: NodeId) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the travel distance matrix (indexed by node position).
    pub fn with_distances(mut self, distances: DistanceMatrix) -> Self {
        self.distances = Some(distances);
        self
    }

    /// Sets the travel time matrix. Defaults to the distance matrix.
    pub fn with_travel_times(mut self, travel_times: DistanceMatrix) -> Self {
        self.travel_times = Some(travel_times);
        self
    }

    /// Adds a request.
    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    /// Sets the service duration at a node. Defaults to zero.
    pub fn with_service_time(mut self, node: NodeId, service_time: f64) -> Self {
        self.service_times.insert(node, service_time);
        self
    }

    /// Sets the time window of a node.
    pub fn with_time_window(mut self, node: NodeId, tw: TimeWindow) -> Self {
        self.time_windows.insert(node, tw);
        self
    }

    /// Sets the window used by nodes without their own. Defaults to [`TimeWindow::unbounded`].
    pub fn with_default_time_window(mut self, tw: TimeWindow) -> Self {
        self.default_time_window = Some(tw);
        self
    }

    /// Adds a paired group: every pickup of the group precedes any of its deliveries.
    pub fn with_paired_group(mut self, requests: impl IntoIterator<Item = RequestId>) -> Self {
        self.paired_groups.push(requests.into_iter().collect());
        self
    }

    /// Validates the data and builds the instance.
    ///
    /// Inverted time windows are accepted: they make the instance infeasible,
    /// which the solver reports as such.
    pub fn build(self) -> Result<Instance, InstanceError> {
        if self.nodes.is_empty() {
            return Err(InstanceError::NoNodes);
        }
        let index = NodeIndex::new(&self.nodes)?;
        let n = index.len();

        for depot in std::iter::once(self.start).chain(self.end) {
            if !index.contains(depot) {
                return Err(InstanceError::UnknownDepot(depot));
            }
        }

        let distances = self.distances.ok_or(InstanceError::MissingDistances)?;
        check_matrix("distance", &distances, &index)?;
        let travel_times = match self.travel_times {
            Some(tt) => tt,
            None => distances.clone(),
        };
        check_matrix("travel time", &travel_times, &index)?;

        let mut request_positions = HashMap::with_capacity(self.requests.len());
        for (pos, r) in self.requests.iter().enumerate() {
            if request_positions.insert(r.id(), pos).is_some() {
                return Err(InstanceError::DuplicateRequest(r.id()));
            }
            for node in [r.pickup(), r.delivery()] {
                if !index.contains(node) {
                    return Err(InstanceError::UnknownNode(node));
                }
            }
            if r.pickup() == r.delivery() {
                return Err(InstanceError::SamePickupDelivery(r.id()));
            }
        }

        let mut service_times = vec![0.0; n];
        for (&node, &s) in &self.service_times {
            let pos = index
                .position(node)
                .ok_or(InstanceError::UnknownNode(node))?;
            if !(s.is_finite() && s >= 0.0) {
                return Err(InstanceError::InvalidValue {
                    field: "service time",
                    node,
                });
            }
            service_times[pos] = s;
        }

        let mut time_windows = vec![self.default_time_window.unwrap_or_default(); n];
        for (&node, &tw) in &self.time_windows {
            let pos = index
                .position(node)
                .ok_or(InstanceError::UnknownNode(node))?;
            time_windows[pos] = tw;
        }
        if let Some(pos) = time_windows.iter().position(TimeWindow::has_nan) {
            return Err(InstanceError::InvalidValue {
                field: "time window",
                node: index.node(pos),
            });
        }

        let mut paired_groups = Vec::with_capacity(self.paired_groups.len());
        for (g, members) in self.paired_groups.into_iter().enumerate() {
            let mut group: Vec<RequestId> = Vec::with_capacity(members.len());
            for r in members {
                if !request_positions.contains_key(&r) {
                    return Err(InstanceError::UnknownGroupMember {
                        group: g,
                        request: r,
                    });
                }
                if !group.contains(&r) {
                    group.push(r);
                }
            }
            if group.len() < 2 {
                return Err(InstanceError::GroupTooSmall(g));
            }
            paired_groups.push(group);
        }

        Ok(Instance {
            index,
            start: self.start,
            end: self.end,
            requests: self.requests,
            request_positions,
            distances,
            travel_times,
            service_times,
            time_windows,
            paired_groups,
        })
    }
}

fn check_matrix(
    matrix: &'static str,
    m: &DistanceMatrix,
    index: &NodeIndex,
) -> Result<(), InstanceError> {
    if m.size() != index.len() {
        return Err(InstanceError::MatrixSize {
            matrix,
            expected: index.len(),
            actual: m.size(),
        });
    }
    match m.first_invalid() {
        Some((row, _)) => Err(InstanceError::InvalidValue {
            field: matrix,
            node: index.node(row),
        }),
        None => Ok(()),
    }
}

/// A single-vehicle pickup-and-delivery instance with time windows and
/// paired precedence groups.
///
/// Immutable once built; every solver component borrows it.
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::DistanceMatrix;
/// use pdp_routing::models::{Instance, Request, TimeWindow};
///
/// let distances = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 3.0],
///     vec![2.0, 0.0, 4.0],
///     vec![3.0, 4.0, 0.0],
/// ])
/// .unwrap();
/// let instance = Instance::builder(vec![0, 1, 2], 0)
///     .with_end(0)
///     .with_distances(distances)
///     .with_request(Request::new(1, 1, 2))
///     .with_default_time_window(TimeWindow::new(0.0, 100.0))
///     .build()
///     .unwrap();
///
/// assert_eq!(instance.num_requests(), 1);
/// assert_eq!(instance.initial_route().nodes(), &[0, 0]);
/// assert_eq!(instance.total_distance(&[0, 1, 2, 0]), 9.0);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "InstanceBuilder")]
pub struct Instance {
    index: NodeIndex,
    start: NodeId,
    end: Option<NodeId>,
    requests: Vec<Request>,
    request_positions: HashMap<RequestId, usize>,
    distances: DistanceMatrix,
    travel_times: DistanceMatrix,
    service_times: Vec<f64>,
    time_windows: Vec<TimeWindow>,
    paired_groups: Vec<Vec<RequestId>>,
}

impl Instance {
    /// Starts building an instance over `nodes` with the given start depot.
    pub fn builder(nodes: Vec<NodeId>, start: NodeId) -> InstanceBuilder {
        InstanceBuilder {
            nodes,
            start,
            ..InstanceBuilder::default()
        }
    }

    /// Ordered node list.
    pub fn nodes(&self) -> &[NodeId] {
        self.index.nodes()
    }

    /// Node-ID → matrix-position index.
    pub fn node_index(&self) -> &NodeIndex {
        &self.index
    }

    /// Matrix position of `node`.
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.index.position(node)
    }

    /// Start depot.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// End depot, or `None` for an open route.
    pub fn end(&self) -> Option<NodeId> {
        self.end
    }

    /// Requests in instance order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Number of requests.
    pub fn num_requests(&self) -> usize {
        self.requests.len()
    }

    /// Position of a request in [`requests`](Self::requests).
    pub fn request_position(&self, id: RequestId) -> Option<usize> {
        self.request_positions.get(&id).copied()
    }

    /// Travel distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Travel time matrix.
    pub fn travel_times(&self) -> &DistanceMatrix {
        &self.travel_times
    }

    /// Service duration at `node`, or `None` if it is not part of the instance.
    pub fn service_time(&self, node: NodeId) -> Option<f64> {
        self.position(node).map(|p| self.service_times[p])
    }

    /// Time window at `node`, or `None` if it is not part of the instance.
    pub fn time_window(&self, node: NodeId) -> Option<TimeWindow> {
        self.position(node).map(|p| self.time_windows[p])
    }

    /// Service durations by node position.
    pub(crate) fn service_times(&self) -> &[f64] {
        &self.service_times
    }

    /// Time windows by node position.
    pub(crate) fn time_windows(&self) -> &[TimeWindow] {
        &self.time_windows
    }

    /// Paired groups as lists of distinct request IDs.
    pub fn paired_groups(&self) -> &[Vec<RequestId>] {
        &self.paired_groups
    }

    /// Starting route for construction: `[start]` or `[start, end]`.
    pub fn initial_route(&self) -> Route {
        let mut nodes = vec![self.start];
        nodes.extend(self.end);
        Route::from(nodes)
    }

    /// Total distance of a route over this instance's distance matrix.
    ///
    /// # Panics
    ///
    /// Panics if the route contains a node that is not part of the instance.
    pub fn total_distance(&self, route: &[NodeId]) -> f64 {
        total_distance(route, &self.distances, Some(&self.index))
    }
}

impl TryFrom<InstanceBuilder> for Instance {
    type Error = InstanceError;

    fn try_from(builder: InstanceBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
