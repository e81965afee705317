//! Best-improvement greedy insertion for pickup and delivery.
//!
//! # Algorithm
//!
//! Starting from `[start]` (or `[start, end]`), every iteration enumerates all
//! feasible actions on the current partial route and commits the one with the
//! smallest distance increase:
//!
//! - **full**: insert an unplaced request's pickup and, later, its delivery;
//! - **pickup-only**: insert an unplaced request's pickup, deferring its delivery;
//! - **delivery-only**: insert the delivery of a request whose pickup is placed.
//!
//! The search is global across requests and modes. Ties go to the first
//! candidate in enumeration order: requests in instance order, then pickup
//! position, then mode (full before pickup-only), then delivery position.
//!
//! If no action is feasible the instance is reported infeasible; there is no
//! backtracking.
//!
//! # Complexity
//!
//! O(R·n²) candidate routes per iteration, each checked in O(n); at most 2R
//! iterations. Intended for instances of tens of nodes.

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use super::diagnosis::diagnose;
use crate::evaluation::{EvaluationScratch, FeasibilityEvaluator};
use crate::models::{Instance, NodeId, Phase, Route, SolveError};
use crate::solver::{Budget, SolverConfig};

/// A construction step on the current partial route.
///
/// `request` is a position in [`Instance::requests`]; `*_after` are route
/// indices the new node is inserted immediately after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionAction {
    /// Insert pickup after `pickup_after`, then delivery after `delivery_after`
    /// (an index into the pickup-extended route).
    Full {
        /// Request position.
        request: usize,
        /// Pickup insertion index.
        pickup_after: usize,
        /// Delivery insertion index in the extended route.
        delivery_after: usize,
    },
    /// Insert only the pickup.
    PickupOnly {
        /// Request position.
        request: usize,
        /// Pickup insertion index.
        after: usize,
    },
    /// Insert only the delivery of a request whose pickup is already placed.
    DeliveryOnly {
        /// Request position.
        request: usize,
        /// Delivery insertion index.
        after: usize,
    },
}

impl InsertionAction {
    /// Request position the action belongs to.
    pub fn request(&self) -> usize {
        match *self {
            Self::Full { request, .. }
            | Self::PickupOnly { request, .. }
            | Self::DeliveryOnly { request, .. } => request,
        }
    }

    /// Writes the route resulting from applying this action to `route` into `out`.
    pub fn apply(&self, instance: &Instance, route: &[NodeId], out: &mut Vec<NodeId>) {
        let req = instance.requests()[self.request()];
        match *self {
            Self::Full {
                pickup_after,
                delivery_after,
                ..
            } => {
                let mut extended = Vec::with_capacity(route.len() + 1);
                insert_after(route, pickup_after, req.pickup(), &mut extended);
                insert_after(&extended, delivery_after, req.delivery(), out);
            }
            Self::PickupOnly { after, .. } => insert_after(route, after, req.pickup(), out),
            Self::DeliveryOnly { after, .. } => insert_after(route, after, req.delivery(), out),
        }
    }
}

/// Placement state of a request during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Unplaced,
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    action: InsertionAction,
    delta: f64,
}

/// Per-worker buffers reused across every candidate of one iteration.
struct SearchScratch {
    extended: Vec<NodeId>,
    candidate: Vec<NodeId>,
    eval: EvaluationScratch,
}

impl SearchScratch {
    fn new(evaluator: &FeasibilityEvaluator<'_>, route_len: usize) -> Self {
        Self {
            extended: Vec::with_capacity(route_len + 2),
            candidate: Vec::with_capacity(route_len + 2),
            eval: evaluator.scratch(),
        }
    }
}

/// Best candidate seen so far for one request.
struct RequestSearch<'e, 'a> {
    evaluator: &'e FeasibilityEvaluator<'a>,
    base_cost: f64,
    best: Option<Candidate>,
    tried: usize,
}

impl RequestSearch<'_, '_> {
    fn consider(
        &mut self,
        nodes: &[NodeId],
        action: InsertionAction,
        eval: &mut EvaluationScratch,
    ) {
        self.tried += 1;
        let delta = self.evaluator.instance().total_distance(nodes) - self.base_cost;
        // An earlier candidate with an equal delta keeps the tie.
        if self.best.is_some_and(|b| delta >= b.delta) {
            return;
        }
        if self.evaluator.check_with(nodes, eval).is_ok() {
            self.best = Some(Candidate { action, delta });
        }
    }
}

/// Builds a complete route by greedy best-improvement insertion.
///
/// Returns [`SolveError::Infeasible`] if at some iteration no action is
/// feasible, and [`SolveError::Interrupted`] if the budget runs out first.
///
/// # Examples
///
/// ```
/// use pdp_routing::constructive::greedy_insertion;
/// use pdp_routing::distance::DistanceMatrix;
/// use pdp_routing::evaluation::FeasibilityEvaluator;
/// use pdp_routing::models::{Instance, Request};
/// use pdp_routing::solver::{Budget, SolverConfig};
///
/// let distances = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])
/// .unwrap();
/// let instance = Instance::builder(vec![0, 1, 2], 0)
///     .with_end(0)
///     .with_distances(distances)
///     .with_request(Request::new(1, 1, 2))
///     .build()
///     .unwrap();
/// let evaluator = FeasibilityEvaluator::new(&instance);
/// let config = SolverConfig::default();
///
/// let route = greedy_insertion(&evaluator, &config, &Budget::new(&config)).unwrap();
/// assert_eq!(route.nodes(), &[0, 1, 2, 0]);
/// ```
pub fn greedy_insertion(
    evaluator: &FeasibilityEvaluator<'_>,
    config: &SolverConfig,
    budget: &Budget,
) -> Result<Route, SolveError> {
    let instance = evaluator.instance();
    let mut route = instance.initial_route().into_nodes();
    let mut placement = vec![Placement::Unplaced; instance.num_requests()];
    let mut next = Vec::with_capacity(route.len() + 2 * instance.num_requests());
    let mut iteration = 0;

    while placement.iter().any(|&p| p != Placement::Done) {
        if let Some(reason) = budget.check(iteration, config.max_construction_iterations) {
            warn!(iteration, %reason, "construction stopped before completing the route");
            return Err(SolveError::Interrupted {
                phase: Phase::Construction,
                reason,
            });
        }

        let base_cost = instance.total_distance(&route);
        let (best, tried) = best_candidate(
            evaluator,
            &route,
            &placement,
            base_cost,
            config.parallel,
        );

        let Some(Candidate { action, delta }) = best else {
            let unserved: Vec<usize> = (0..placement.len())
                .filter(|&r| placement[r] != Placement::Done)
                .collect();
            let infeasibility = diagnose(evaluator, iteration, &unserved, tried);
            warn!(
                iteration,
                candidates = tried,
                structural = infeasibility.is_structural(),
                "{infeasibility}"
            );
            return Err(SolveError::Infeasible(infeasibility));
        };

        action.apply(instance, &route, &mut next);
        std::mem::swap(&mut route, &mut next);

        let r = action.request();
        placement[r] = match action {
            InsertionAction::PickupOnly { .. } => Placement::Pending,
            InsertionAction::Full { .. } | InsertionAction::DeliveryOnly { .. } => Placement::Done,
        };
        debug!(
            iteration,
            request = instance.requests()[r].id(),
            ?action,
            delta,
            candidates = tried,
            "committed insertion"
        );
        iteration += 1;
    }

    info!(
        iterations = iteration,
        distance = instance.total_distance(&route),
        "construction finished"
    );
    Ok(Route::from(route))
}

/// Finds the globally best feasible action and the number of candidates tried.
///
/// Per-request bests are reduced in request order with a strict comparison,
/// so the parallel and sequential paths agree on ties.
fn best_candidate(
    evaluator: &FeasibilityEvaluator<'_>,
    route: &[NodeId],
    placement: &[Placement],
    base_cost: f64,
    parallel: bool,
) -> (Option<Candidate>, usize) {
    let open: Vec<usize> = (0..placement.len())
        .filter(|&r| placement[r] != Placement::Done)
        .collect();

    let search = |scratch: &mut SearchScratch, r: usize| {
        best_for_request(evaluator, route, r, placement[r], base_cost, scratch)
    };

    let per_request: Vec<(Option<Candidate>, usize)> = if parallel {
        open.par_iter()
            .map_init(
                || SearchScratch::new(evaluator, route.len()),
                |s, &r| search(s, r),
            )
            .collect()
    } else {
        let mut scratch = SearchScratch::new(evaluator, route.len());
        open.iter().map(|&r| search(&mut scratch, r)).collect()
    };

    trace!(requests = open.len(), "evaluated insertion candidates");

    per_request
        .into_iter()
        .fold((None, 0), |(best, tried), (candidate, n)| {
            let best = match (best, candidate) {
                (Some(b), Some(c)) if c.delta < b.delta => Some(c),
                (None, c) => c,
                (b, _) => b,
            };
            (best, tried + n)
        })
}

fn best_for_request(
    evaluator: &FeasibilityEvaluator<'_>,
    route: &[NodeId],
    request: usize,
    placement: Placement,
    base_cost: f64,
    scratch: &mut SearchScratch,
) -> (Option<Candidate>, usize) {
    let instance = evaluator.instance();
    let req = instance.requests()[request];
    let closed = instance.end().is_some();
    let mut search = RequestSearch {
        evaluator,
        base_cost,
        best: None,
        tried: 0,
    };
    let SearchScratch {
        extended,
        candidate,
        eval,
    } = scratch;

    match placement {
        Placement::Unplaced => {
            for pickup_after in slots(route.len(), closed) {
                insert_after(route, pickup_after, req.pickup(), extended);

                for delivery_after in (pickup_after + 1)..slots(extended.len(), closed).end {
                    insert_after(extended, delivery_after, req.delivery(), candidate);
                    let action = InsertionAction::Full {
                        request,
                        pickup_after,
                        delivery_after,
                    };
                    search.consider(candidate, action, eval);
                }

                let action = InsertionAction::PickupOnly {
                    request,
                    after: pickup_after,
                };
                search.consider(extended, action, eval);
            }
        }
        Placement::Pending => {
            for after in slots(route.len(), closed) {
                insert_after(route, after, req.delivery(), candidate);
                let action = InsertionAction::DeliveryOnly { request, after };
                search.consider(candidate, action, eval);
            }
        }
        Placement::Done => {}
    }

    (search.best, search.tried)
}

/// Route indices a node may be inserted after: never after the end depot.
fn slots(len: usize, closed: bool) -> std::ops::Range<usize> {
    0..if closed { len.saturating_sub(1) } else { len }
}

fn insert_after(route: &[NodeId], after: usize, node: NodeId, out: &mut Vec<NodeId>) {
    out.clear();
    out.extend_from_slice(&route[..=after]);
    out.push(node);
    out.extend_from_slice(&route[after + 1..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{InfeasibilityCause, Request, TimeWindow};

    fn run(instance: &Instance, config: &SolverConfig) -> Result<Route, SolveError> {
        let evaluator = FeasibilityEvaluator::new(instance);
        greedy_insertion(&evaluator, config, &Budget::new(config))
    }

    fn symmetric(rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::from_rows(rows).expect("square")
    }

    /// Two requests with generous windows.
    fn two_requests() -> Instance {
        Instance::builder(vec![0, 1, 2, 3, 4], 0)
            .with_distances(symmetric(vec![
                vec![0.0, 2.0, 3.0, 6.0, 8.0],
                vec![2.0, 0.0, 4.0, 7.0, 3.0],
                vec![3.0, 4.0, 0.0, 5.0, 6.0],
                vec![6.0, 7.0, 5.0, 0.0, 2.0],
                vec![8.0, 3.0, 6.0, 2.0, 0.0],
            ]))
            .with_request(Request::new(1, 1, 3))
            .with_request(Request::new(2, 2, 4))
            .with_default_time_window(TimeWindow::new(0.0, 100.0))
            .build()
            .expect("valid")
    }

    #[test]
    fn test_slots() {
        assert_eq!(slots(1, false), 0..1);
        assert_eq!(slots(2, true), 0..1);
        assert_eq!(slots(4, false), 0..4);
        assert_eq!(slots(4, true), 0..3);
    }

    #[test]
    fn test_insert_after() {
        let mut out = Vec::new();
        insert_after(&[0, 1, 2], 0, 9, &mut out);
        assert_eq!(out, vec![0, 9, 1, 2]);
        insert_after(&[0, 1, 2], 2, 9, &mut out);
        assert_eq!(out, vec![0, 1, 2, 9]);
    }

    #[test]
    fn test_action_apply() {
        let inst = two_requests();
        let mut out = Vec::new();
        let full = InsertionAction::Full {
            request: 1,
            pickup_after: 0,
            delivery_after: 2,
        };
        full.apply(&inst, &[0, 1, 3], &mut out);
        assert_eq!(out, vec![0, 2, 1, 4, 3]);

        let deliver = InsertionAction::DeliveryOnly {
            request: 0,
            after: 1,
        };
        deliver.apply(&inst, &[0, 1], &mut out);
        assert_eq!(out, vec![0, 1, 3]);
    }

    #[test]
    fn test_no_requests() {
        let inst = Instance::builder(vec![0, 1], 0)
            .with_end(1)
            .with_distances(DistanceMatrix::new(2))
            .build()
            .expect("valid");
        let route = run(&inst, &SolverConfig::default()).expect("trivially feasible");
        assert_eq!(route.nodes(), &[0, 1]);
    }

    #[test]
    fn test_single_request_closed_route() {
        let inst = Instance::builder(vec![0, 1, 2], 0)
            .with_end(0)
            .with_distances(symmetric(vec![
                vec![0.0, 3.0, 4.0],
                vec![3.0, 0.0, 5.0],
                vec![4.0, 5.0, 0.0],
            ]))
            .with_request(Request::new(7, 1, 2))
            .build()
            .expect("valid");
        let route = run(&inst, &SolverConfig::default()).expect("feasible");
        assert_eq!(route.nodes(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_single_request_open_route() {
        let inst = Instance::builder(vec![0, 1, 2], 0)
            .with_distances(symmetric(vec![
                vec![0.0, 3.0, 4.0],
                vec![3.0, 0.0, 5.0],
                vec![4.0, 5.0, 0.0],
            ]))
            .with_request(Request::new(7, 1, 2))
            .build()
            .expect("valid");
        let route = run(&inst, &SolverConfig::default()).expect("feasible");
        assert_eq!(route.nodes(), &[0, 1, 2]);
    }

    #[test]
    fn test_complete_and_feasible() {
        let inst = two_requests();
        let route = run(&inst, &SolverConfig::default()).expect("feasible");
        let evaluator = FeasibilityEvaluator::new(&inst);
        assert!(evaluator.is_feasible(route.nodes()));
        assert_eq!(route.len(), 5);
        assert_eq!(route.first(), Some(0));
        for r in inst.requests() {
            let p = route.position_of(r.pickup()).expect("pickup visited");
            let d = route.position_of(r.delivery()).expect("delivery visited");
            assert!(p < d);
        }
    }

    #[test]
    fn test_greedy_choice_sequence() {
        // [0] -> [0,1] (pickup r1, +2) -> [0,1,2] (pickup r2, +4)
        //     -> [0,1,2,3] (deliver r1, +5, wins the tie with r2) -> [0,1,2,3,4] (+2)
        let inst = two_requests();
        let route = run(&inst, &SolverConfig::default()).expect("feasible");
        assert_eq!(route.nodes(), &[0, 1, 2, 3, 4]);
        assert_eq!(inst.total_distance(route.nodes()), 13.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inst = two_requests();
        let seq = run(&inst, &SolverConfig::default()).expect("feasible");
        let parallel = SolverConfig::default().with_parallel(true);
        let par = run(&inst, &parallel).expect("feasible");
        assert_eq!(seq, par);
    }

    #[test]
    fn test_deterministic() {
        let inst = two_requests();
        let a = run(&inst, &SolverConfig::default()).expect("feasible");
        let b = run(&inst, &SolverConfig::default()).expect("feasible");
        assert_eq!(a, b);
    }

    #[test]
    fn test_tie_goes_to_first_request() {
        // All distances equal: every first action costs the same.
        let mut dm = DistanceMatrix::new(5);
        for i in 0..5 {
            for j in 0..5 {
                if i != j {
                    dm.set(i, j, 1.0);
                }
            }
        }
        let inst = Instance::builder(vec![0, 1, 2, 3, 4], 0)
            .with_distances(dm)
            .with_request(Request::new(1, 1, 3))
            .with_request(Request::new(2, 2, 4))
            .build()
            .expect("valid");
        let route = run(&inst, &SolverConfig::default()).expect("feasible");
        // r1 pickup, r1 delivery (ties r2's pickup), r2 pickup after the
        // depot (ties later slots), r2 delivery at its first feasible slot.
        assert_eq!(route.nodes(), &[0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_tie_within_iteration() {
        let mut dm = DistanceMatrix::new(5);
        for i in 0..5 {
            for j in 0..5 {
                if i != j {
                    dm.set(i, j, 1.0);
                }
            }
        }
        let build = |requests: [Request; 2]| {
            let mut b = Instance::builder(vec![0, 1, 2, 3, 4], 0)
                .with_distances(dm.clone());
            for r in requests {
                b = b.with_request(r);
            }
            b.build().expect("valid")
        };

        let inst = build([Request::new(1, 1, 3), Request::new(2, 2, 4)]);
        let evaluator = FeasibilityEvaluator::new(&inst);
        let placement = [Placement::Unplaced, Placement::Unplaced];
        for parallel in [false, true] {
            let (best, tried) = best_candidate(&evaluator, &[0], &placement, 0.0, parallel);
            let best = best.expect("candidate");
            // Both pickup-only insertions cost 1; the first request wins.
            let first_pickup = InsertionAction::PickupOnly {
                request: 0,
                after: 0,
            };
            assert_eq!(best.action, first_pickup);
            assert_eq!(best.delta, 1.0);
            assert_eq!(tried, 4);
        }

        // Listing the requests the other way round flips the outcome.
        let swapped = build([Request::new(2, 2, 4), Request::new(1, 1, 3)]);
        let route = run(&swapped, &SolverConfig::default()).expect("feasible");
        assert_eq!(route.nodes(), &[0, 1, 3, 2, 4]);
    }

    #[test]
    fn test_infeasible_structural() {
        let inst = Instance::builder(vec![0, 1, 2], 0)
            .with_distances(DistanceMatrix::new(3))
            .with_request(Request::new(1, 1, 2))
            .with_time_window(1, TimeWindow::new(10.0, 15.0))
            .with_time_window(2, TimeWindow::new(0.0, 2.0))
            .build()
            .expect("valid");
        let err = run(&inst, &SolverConfig::default()).unwrap_err();
        match err {
            SolveError::Infeasible(inf) => {
                assert!(inf.is_structural());
                assert_eq!(inf.unserved, vec![1]);
                assert_eq!(inf.iteration, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_infeasible_no_insertion() {
        // Each request alone is fine; together the two deliveries cannot both
        // make their deadline.
        let mut dm = DistanceMatrix::new(5);
        for i in 0..5 {
            for j in 0..5 {
                if i != j {
                    dm.set(i, j, 5.0);
                }
            }
        }
        dm.set(0, 1, 1.0);
        dm.set(0, 2, 1.0);
        let inst = Instance::builder(vec![0, 1, 2, 3, 4], 0)
            .with_distances(dm)
            .with_request(Request::new(1, 1, 3))
            .with_request(Request::new(2, 2, 4))
            .with_time_window(3, TimeWindow::new(0.0, 6.0))
            .with_time_window(4, TimeWindow::new(0.0, 6.0))
            .build()
            .expect("valid");
        let err = run(&inst, &SolverConfig::default()).unwrap_err();
        match err {
            SolveError::Infeasible(inf) => {
                assert_eq!(inf.cause, InfeasibilityCause::NoFeasibleInsertion);
                assert!(inf.candidates_tried > 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_paired_dead_end_is_not_structural() {
        // Served one at a time both requests fit; the group forces both
        // pickups first, after which neither delivery meets its deadline.
        let mut dm = DistanceMatrix::new(5);
        for i in 0..5 {
            for j in 0..5 {
                if i != j {
                    dm.set(i, j, 5.0);
                }
            }
        }
        dm.set(0, 1, 1.0);
        dm.set(0, 2, 1.0);
        let inst = Instance::builder(vec![0, 1, 2, 3, 4], 0)
            .with_distances(dm)
            .with_request(Request::new(1, 1, 3))
            .with_request(Request::new(2, 2, 4))
            .with_time_window(3, TimeWindow::new(0.0, 7.0))
            .with_time_window(4, TimeWindow::new(0.0, 7.0))
            .with_paired_group([1, 2])
            .build()
            .expect("valid");
        let err = run(&inst, &SolverConfig::default()).unwrap_err();
        match err {
            SolveError::Infeasible(inf) => {
                assert_eq!(inf.cause, InfeasibilityCause::NoFeasibleInsertion);
                assert_eq!(inf.iteration, 2);
                assert_eq!(inf.unserved, vec![1, 2]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_iteration_limit_interrupts() {
        let inst = two_requests();
        let config = SolverConfig::default().with_max_construction_iterations(1);
        let err = run(&inst, &config).unwrap_err();
        assert_eq!(
            err,
            SolveError::Interrupted {
                phase: Phase::Construction,
                reason: crate::models::StopReason::IterationLimit
            }
        );
    }
}
