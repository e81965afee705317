//! Route feasibility evaluator: time windows, precedence and pairing.

use fixedbitset::FixedBitSet;

use crate::models::{Instance, NodeId, Route, Violation, ViolationType, Visit};

/// Reusable per-walk state: which requests are picked up and delivered.
///
/// Hot loops keep one of these per worker and pass it to
/// [`FeasibilityEvaluator::check_with`] to avoid allocating on every check.
#[derive(Debug, Clone)]
pub struct EvaluationScratch {
    picked: FixedBitSet,
    delivered: FixedBitSet,
}

impl EvaluationScratch {
    /// Creates scratch state for an instance with `num_requests` requests.
    pub fn new(num_requests: usize) -> Self {
        Self {
            picked: FixedBitSet::with_capacity(num_requests),
            delivered: FixedBitSet::with_capacity(num_requests),
        }
    }

    fn reset(&mut self) {
        self.picked.clear();
        self.delivered.clear();
    }
}

/// Decides whether a complete or partial route is admissible.
///
/// The walk is a single left-to-right pass that propagates the service clock
/// (`time = max(time + service[prev] + travel[prev][cur], open[cur])`, starting
/// from `max(0, open[route[0]])`) and stops at the first violation:
///
/// 1. service starts after the node's window closes;
/// 2. a delivery is visited before its pickup;
/// 3. a delivery is visited while another member of one of its paired groups
///    has not been picked up.
///
/// Visiting a node picks up every request whose pickup is that node. Visiting
/// a delivery node serves one request: the first (in instance order) that is
/// picked, undelivered and has all paired partners picked. Further visits to a
/// delivery node whose requests are all delivered pass through unchecked.
///
/// All lookups go through dense tables built once in [`new`](Self::new).
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::DistanceMatrix;
/// use pdp_routing::evaluation::FeasibilityEvaluator;
/// use pdp_routing::models::{Instance, Request};
///
/// let instance = Instance::builder(vec![0, 1, 2], 0)
///     .with_distances(DistanceMatrix::new(3))
///     .with_request(Request::new(1, 1, 2))
///     .build()
///     .unwrap();
/// let evaluator = FeasibilityEvaluator::new(&instance);
///
/// assert!(evaluator.is_feasible(&[0, 1, 2]));
/// assert!(!evaluator.is_feasible(&[0, 2, 1])); // delivery before pickup
/// ```
#[derive(Debug)]
pub struct FeasibilityEvaluator<'a> {
    instance: &'a Instance,
    /// Requests picked up at each node position.
    pickups_at: Vec<Vec<usize>>,
    /// Requests delivered at each node position, in instance order.
    deliveries_at: Vec<Vec<usize>>,
    /// Paired groups each request belongs to.
    groups_of: Vec<Vec<usize>>,
    /// Members of each paired group, as request positions.
    groups: Vec<FixedBitSet>,
}

impl<'a> FeasibilityEvaluator<'a> {
    /// Precomputes lookup tables for the instance.
    pub fn new(instance: &'a Instance) -> Self {
        let n = instance.nodes().len();
        let num_requests = instance.num_requests();
        let mut pickups_at = vec![Vec::new(); n];
        let mut deliveries_at = vec![Vec::new(); n];

        for (r, req) in instance.requests().iter().enumerate() {
            // Validated at build time: both nodes are members.
            if let Some(p) = instance.position(req.pickup()) {
                pickups_at[p].push(r);
            }
            if let Some(d) = instance.position(req.delivery()) {
                deliveries_at[d].push(r);
            }
        }

        let mut groups_of = vec![Vec::new(); num_requests];
        let mut groups = Vec::with_capacity(instance.paired_groups().len());
        for (g, members) in instance.paired_groups().iter().enumerate() {
            let mut set = FixedBitSet::with_capacity(num_requests);
            for r in members
                .iter()
                .filter_map(|&id| instance.request_position(id))
            {
                set.insert(r);
                groups_of[r].push(g);
            }
            groups.push(set);
        }

        Self {
            instance,
            pickups_at,
            deliveries_at,
            groups_of,
            groups,
        }
    }

    /// The instance this evaluator was built for.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Creates scratch state sized for this instance.
    pub fn scratch(&self) -> EvaluationScratch {
        EvaluationScratch::new(self.instance.num_requests())
    }

    /// Returns `true` if the route violates no constraint.
    pub fn is_feasible(&self, route: &[NodeId]) -> bool {
        self.check(route).is_ok()
    }

    /// Returns the first violation of the route, if any.
    pub fn check(&self, route: &[NodeId]) -> Result<(), Violation> {
        self.check_with(route, &mut self.scratch())
    }

    /// Like [`check`](Self::check), reusing caller-owned scratch state.
    pub fn check_with(
        &self,
        route: &[NodeId],
        scratch: &mut EvaluationScratch,
    ) -> Result<(), Violation> {
        self.walk(route, scratch, true, |_| {})
    }

    /// Like [`check`](Self::check), but paired groups are not enforced.
    ///
    /// Used to decide whether a request can be served on its own.
    pub(crate) fn check_ignoring_groups(&self, route: &[NodeId]) -> Result<(), Violation> {
        self.walk(route, &mut self.scratch(), false, |_| {})
    }

    /// Computes arrival and service times for every stop of a feasible route.
    pub fn schedule(&self, route: &Route) -> Result<Vec<Visit>, Violation> {
        let mut visits = Vec::with_capacity(route.len());
        self.walk(route.nodes(), &mut self.scratch(), true, |v| visits.push(v))?;
        Ok(visits)
    }

    fn walk<F: FnMut(Visit)>(
        &self,
        route: &[NodeId],
        scratch: &mut EvaluationScratch,
        enforce_groups: bool,
        mut on_visit: F,
    ) -> Result<(), Violation> {
        scratch.reset();
        let windows = self.instance.time_windows();
        let service = self.instance.service_times();
        let travel = self.instance.travel_times();

        let mut time = 0.0_f64;
        let mut prev: Option<usize> = None;

        for (k, &node) in route.iter().enumerate() {
            let cur = self
                .instance
                .position(node)
                .ok_or_else(|| Violation::new(k, ViolationType::UnknownNode { node }))?;

            let arrival = match prev {
                None => 0.0,
                Some(p) => time + service[p] + travel.get(p, cur),
            };
            let window = windows[cur];
            time = arrival.max(window.open());

            if window.is_violated(time) {
                return Err(Violation::new(
                    k,
                    ViolationType::TimeWindowViolated {
                        node,
                        time,
                        close: window.close(),
                    },
                ));
            }

            for &r in &self.pickups_at[cur] {
                scratch.picked.insert(r);
            }
            self.deliver(k, node, cur, scratch, enforce_groups)?;

            on_visit(Visit {
                node,
                arrival_time: arrival,
                service_start: time,
                departure_time: time + service[cur],
            });
            prev = Some(cur);
        }

        Ok(())
    }

    /// Serves one request at a delivery node, or reports why none can be served.
    fn deliver(
        &self,
        k: usize,
        node: NodeId,
        cur: usize,
        scratch: &mut EvaluationScratch,
        enforce_groups: bool,
    ) -> Result<(), Violation> {
        let mut blocked: Option<(usize, usize)> = None;
        let mut unpicked: Option<usize> = None;

        for &r in &self.deliveries_at[cur] {
            if scratch.delivered.contains(r) {
                continue;
            }
            if !scratch.picked.contains(r) {
                unpicked.get_or_insert(r);
                continue;
            }
            let missing = if enforce_groups {
                self.missing_partner(r, &scratch.picked)
            } else {
                None
            };
            match missing {
                None => {
                    scratch.delivered.insert(r);
                    return Ok(());
                }
                Some(missing) => {
                    blocked.get_or_insert((r, missing));
                }
            }
        }

        let requests = self.instance.requests();
        let kind = match (blocked, unpicked) {
            (Some((r, missing)), _) => ViolationType::PairingViolated {
                node,
                request: requests[r].id(),
                missing: requests[missing].id(),
            },
            (None, Some(r)) => ViolationType::PrecedenceViolated {
                node,
                request: requests[r].id(),
            },
            (None, None) => return Ok(()),
        };
        Err(Violation::new(k, kind))
    }

    /// First member of a group of `r` whose pickup has not been visited.
    fn missing_partner(&self, r: usize, picked: &FixedBitSet) -> Option<usize> {
        self.groups_of[r]
            .iter()
            .find_map(|&g| self.groups[g].difference(picked).next())
    }
}
