//! Domain model types for single-vehicle pickup and delivery.
//!
//! Provides the instance (nodes, depots, requests, matrices, time windows,
//! paired groups), routes as ordered node sequences, solutions, constraint
//! violations, and the error taxonomy.

mod error;
mod instance;
mod request;
mod route;
mod solution;
mod time_window;

pub use error::{
    Infeasibility, InfeasibilityCause, InstanceError, Phase, SolveError, StopReason,
    StructuralDefect,
};
pub use instance::{Instance, InstanceBuilder};
pub use request::Request;
pub use route::{Route, Visit};
pub use solution::{ImprovementStats, Solution, Violation, ViolationType};
pub use time_window::TimeWindow;

/// Node identifier. Need not be contiguous; see [`crate::distance::NodeIndex`].
pub type NodeId = usize;

/// Request identifier.
pub type RequestId = usize;
