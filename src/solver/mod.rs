//! Solve orchestration: construct, then improve.
//!
//! [`Solver`] runs the phases in order, `Initializing → Constructing →
//! (Infeasible | Interrupted | Improving) → Done`, and returns both the
//! constructed and the improved route. An infeasible construction ends the
//! solve; there is no retry, relaxation or multi-start.

mod budget;
mod config;

pub use budget::{Budget, CancellationToken};
pub use config::SolverConfig;

use tracing::{info, warn};

use crate::constructive::greedy_insertion;
use crate::evaluation::FeasibilityEvaluator;
use crate::local_search::two_opt_improve;
use crate::models::{Instance, Solution, SolveError};

/// Lifecycle of a [`Solver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Created, nothing run yet.
    Initializing,
    /// Greedy insertion is running.
    Constructing,
    /// 2-opt is running on the constructed route.
    Improving,
    /// Construction found no feasible insertion.
    Infeasible,
    /// A budget or cancellation stopped construction.
    Interrupted,
    /// Both routes are available.
    Done,
}

/// Runs greedy insertion followed by 2-opt on one instance.
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::DistanceMatrix;
/// use pdp_routing::models::{Instance, Request};
/// use pdp_routing::solver::{Solver, SolverConfig, SolverState};
///
/// let instance = Instance::builder(vec![0, 1, 2], 0)
///     .with_end(0)
///     .with_distances(DistanceMatrix::from_rows(vec![
///         vec![0.0, 1.0, 1.0],
///         vec![1.0, 0.0, 1.0],
///         vec![1.0, 1.0, 0.0],
///     ]).unwrap())
///     .with_request(Request::new(1, 1, 2))
///     .build()
///     .unwrap();
///
/// let mut solver = Solver::new(&instance, SolverConfig::default());
/// let solution = solver.solve().unwrap();
/// assert_eq!(solver.state(), SolverState::Done);
/// assert_eq!(solution.improved().nodes(), &[0, 1, 2, 0]);
/// ```
#[derive(Debug)]
pub struct Solver<'a> {
    instance: &'a Instance,
    config: SolverConfig,
    state: SolverState,
}

impl<'a> Solver<'a> {
    /// Creates a solver for the instance.
    pub fn new(instance: &'a Instance, config: SolverConfig) -> Self {
        Self {
            instance,
            config,
            state: SolverState::Initializing,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Runs construction and improvement.
    ///
    /// On success the returned [`Solution`] holds both routes; callers that
    /// only need the answer use [`Solution::improved`].
    pub fn solve(&mut self) -> Result<Solution, SolveError> {
        self.state = SolverState::Initializing;
        let budget = Budget::new(&self.config);
        let evaluator = FeasibilityEvaluator::new(self.instance);
        info!(
            nodes = self.instance.nodes().len(),
            requests = self.instance.num_requests(),
            groups = self.instance.paired_groups().len(),
            closed = self.instance.end().is_some(),
            "solve started"
        );

        self.transition(SolverState::Constructing);
        let constructed = match greedy_insertion(&evaluator, &self.config, &budget) {
            Ok(route) => route,
            Err(err) => {
                self.transition(match err {
                    SolveError::Infeasible(_) => SolverState::Infeasible,
                    SolveError::Interrupted { .. } => SolverState::Interrupted,
                });
                warn!(error = %err, "solve failed");
                return Err(err);
            }
        };
        let constructed_distance = self.instance.total_distance(constructed.nodes());

        self.transition(SolverState::Improving);
        let (improved, stats) = two_opt_improve(&constructed, &evaluator, &self.config, &budget);
        let improved_distance = stats.final_distance;

        self.transition(SolverState::Done);
        info!(
            constructed = constructed_distance,
            improved = improved_distance,
            elapsed_ms = budget.elapsed().as_millis() as u64,
            "solve finished"
        );
        Ok(Solution::new(
            constructed,
            constructed_distance,
            improved,
            improved_distance,
            stats,
        ))
    }

    fn transition(&mut self, next: SolverState) {
        info!(from = ?self.state, to = ?next, "solver state");
        self.state = next;
    }
}

/// Solves an instance with the default configuration.
pub fn solve(instance: &Instance) -> Result<Solution, SolveError> {
    Solver::new(instance, SolverConfig::default()).solve()
}
