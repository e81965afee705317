//! Feasibility-preserving 2-opt improvement of a complete route.
//!
//! # Algorithm
//!
//! For each pair of edges (i, i+1) and (j, j+1) with the depot endpoints
//! fixed, reverse the segment `route[i+1..=j]`:
//!
//! ```text
//! before: ... r[i] → r[i+1] → ... → r[j] → r[j+1] ...
//! after:  ... r[i] → r[j] → ... → r[i+1] → r[j+1] ...
//! ```
//!
//! The candidate is accepted if it is feasible and strictly shorter
//! (first-improvement), after which the scan restarts. The search stops when a
//! full pass finds nothing.
//!
//! Reversal changes the order of pickups and deliveries inside the segment and
//! the timing of everything after it, so every candidate goes through the full
//! feasibility walk; a shorter but infeasible reversal is rejected outright.
//! Total distance is recomputed from scratch because the matrix may be
//! asymmetric.
//!
//! # Complexity
//!
//! O(n²) candidates per pass, O(n) each.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use tracing::{debug, info};

use crate::evaluation::FeasibilityEvaluator;
use crate::models::{ImprovementStats, NodeId, Route};
use crate::solver::{Budget, SolverConfig};

/// Applies 2-opt to a complete, feasible route.
///
/// Returns the improved route and the search counters. If the budget runs out
/// the current (feasible) route is returned with `stopped_early` set.
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::DistanceMatrix;
/// use pdp_routing::evaluation::FeasibilityEvaluator;
/// use pdp_routing::local_search::two_opt_improve;
/// use pdp_routing::models::{Instance, Request, Route};
/// use pdp_routing::solver::{Budget, SolverConfig};
///
/// // Points on a line at x = id; the route starts with a detour.
/// let mut dm = DistanceMatrix::new(5);
/// for i in 0..5 {
///     for j in 0..5 {
///         dm.set(i, j, (i as f64 - j as f64).abs());
///     }
/// }
/// let instance = Instance::builder(vec![0, 1, 2, 3, 4], 0)
///     .with_distances(dm)
///     .with_request(Request::new(1, 1, 3))
///     .with_request(Request::new(2, 2, 4))
///     .build()
///     .unwrap();
/// let evaluator = FeasibilityEvaluator::new(&instance);
/// let config = SolverConfig::default();
///
/// let start = Route::from(vec![0, 2, 1, 3, 4]);
/// let (improved, stats) = two_opt_improve(&start, &evaluator, &config, &Budget::new(&config));
/// assert_eq!(improved.nodes(), &[0, 1, 2, 3, 4]);
/// assert_eq!(stats.final_distance, 4.0);
/// assert!(evaluator.is_feasible(improved.nodes()));
/// ```
pub fn two_opt_improve(
    route: &Route,
    evaluator: &FeasibilityEvaluator<'_>,
    config: &SolverConfig,
    budget: &Budget,
) -> (Route, ImprovementStats) {
    let instance = evaluator.instance();
    let mut current = route.nodes().to_vec();
    let mut candidate: Vec<NodeId> = Vec::with_capacity(current.len());
    let mut scratch = evaluator.scratch();

    let initial_distance = instance.total_distance(&current);
    let mut current_cost = initial_distance;
    let mut stats = ImprovementStats {
        initial_distance,
        final_distance: initial_distance,
        ..ImprovementStats::default()
    };

    let n = current.len();
    if n < 4 {
        return (route.clone(), stats);
    }

    'search: loop {
        if let Some(reason) = budget.check(stats.passes, config.max_improvement_passes) {
            debug!(passes = stats.passes, %reason, "2-opt stopped early");
            stats.stopped_early = true;
            break;
        }
        stats.passes += 1;

        for i in 0..=n - 4 {
            for j in (i + 2)..=n - 2 {
                candidate.clear();
                candidate.extend_from_slice(&current);
                candidate[i + 1..=j].reverse();

                let cost = instance.total_distance(&candidate);
                if cost < current_cost && evaluator.check_with(&candidate, &mut scratch).is_ok() {
                    debug!(i, j, from = current_cost, to = cost, "2-opt move accepted");
                    std::mem::swap(&mut current, &mut candidate);
                    current_cost = cost;
                    stats.moves += 1;
                    continue 'search;
                }
            }
        }
        break;
    }

    stats.final_distance = current_cost;
    info!(
        passes = stats.passes,
        moves = stats.moves,
        from = initial_distance,
        to = current_cost,
        "2-opt finished"
    );
    (Route::from(current), stats)
}
