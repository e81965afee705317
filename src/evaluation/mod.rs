//! Route feasibility checking.
//!
//! [`FeasibilityEvaluator`] is the oracle both construction and local search
//! consult on every trial route.

mod evaluator;

pub use evaluator::{EvaluationScratch, FeasibilityEvaluator};
