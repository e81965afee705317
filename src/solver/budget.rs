//! Iteration, time and cancellation budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::SolverConfig;
use crate::models::StopReason;

/// A cloneable flag for cooperative cancellation.
///
/// # Examples
///
/// ```
/// use pdp_routing::solver::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Budget shared by the phases of one solve.
///
/// The clock starts when the budget is created.
#[derive(Debug, Clone)]
pub struct Budget {
    started: Instant,
    time_limit: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl Budget {
    /// Starts a budget from the config's time limit and cancellation token.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            started: Instant::now(),
            time_limit: config.time_limit,
            cancellation: config.cancellation.clone(),
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            time_limit: None,
            cancellation: None,
        }
    }

    /// Time since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns why a loop that has done `done` rounds out of `limit` must stop.
    pub fn check(&self, done: usize, limit: Option<usize>) -> Option<StopReason> {
        if matches!(&self.cancellation, Some(token) if token.is_cancelled()) {
            return Some(StopReason::Cancelled);
        }
        if limit.is_some_and(|limit| done >= limit) {
            return Some(StopReason::IterationLimit);
        }
        if self.time_limit.is_some_and(|limit| self.elapsed() >= limit) {
            return Some(StopReason::TimeLimit);
        }
        None
    }
}
