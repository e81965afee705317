//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::CancellationToken;

/// Limits and switches for a solve.
///
/// All limits default to "none": the search runs to its natural end, exactly
/// one deterministic pass per instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pdp_routing::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_max_improvement_passes(50)
///     .with_time_limit(Duration::from_secs(2))
///     .with_parallel(true);
/// assert_eq!(config.max_improvement_passes, Some(50));
/// assert!(config.parallel);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum construction iterations (one committed action each).
    pub max_construction_iterations: Option<usize>,
    /// Maximum 2-opt passes (one scan over all segment pairs each).
    pub max_improvement_passes: Option<usize>,
    /// Wall-clock limit for the whole solve.
    pub time_limit: Option<Duration>,
    /// Evaluate construction candidates on the rayon thread pool.
    ///
    /// The result is identical to the sequential run.
    pub parallel: bool,
    /// Cooperative cancellation flag, polled at each loop head.
    #[serde(skip)]
    pub cancellation: Option<CancellationToken>,
}

impl SolverConfig {
    /// Sets the construction iteration limit.
    pub fn with_max_construction_iterations(mut self, n: usize) -> Self {
        self.max_construction_iterations = Some(n);
        self
    }

    /// Sets the 2-opt pass limit.
    pub fn with_max_improvement_passes(mut self, n: usize) -> Self {
        self.max_improvement_passes = Some(n);
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Enables or disables parallel candidate evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
