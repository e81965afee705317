//! Local search operators for improving a complete route.
//!
//! - [`two_opt_improve`] — feasibility-preserving 2-opt segment reversal

mod two_opt;

pub use two_opt::two_opt_improve;
