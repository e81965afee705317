//! Constructive heuristic for building the initial route.
//!
//! - [`greedy_insertion`] — best-improvement pickup/delivery insertion, O(R·n³) per iteration

mod diagnosis;
mod greedy_insertion;

pub use greedy_insertion::{greedy_insertion, InsertionAction};
