//! # pdp-routing
//!
//! Single-vehicle pickup and delivery routing with time windows, pickup-before-
//! delivery precedence, and paired groups (every pickup of a group before any
//! of its deliveries).
//!
//! ## Modules
//!
//! - [`models`] — Instance, route, solution, violation and error types
//! - [`distance`] — Distance/travel-time matrix, sparse node index, route cost
//! - [`evaluation`] — Route feasibility checking
//! - [`constructive`] — Greedy best-improvement insertion
//! - [`local_search`] — Feasibility-preserving 2-opt
//! - [`solver`] — Construct-then-improve orchestration, configuration, budgets
//!
//! ## Example
//!
//! ```
//! use pdp_routing::distance::DistanceMatrix;
//! use pdp_routing::models::{Instance, Request, TimeWindow};
//!
//! let distances = DistanceMatrix::from_rows(vec![
//!     vec![0.0, 2.0, 3.0, 6.0, 8.0],
//!     vec![2.0, 0.0, 4.0, 7.0, 3.0],
//!     vec![3.0, 4.0, 0.0, 5.0, 6.0],
//!     vec![6.0, 7.0, 5.0, 0.0, 2.0],
//!     vec![8.0, 3.0, 6.0, 2.0, 0.0],
//! ])
//! .unwrap();
//! let instance = Instance::builder(vec![0, 1, 2, 3, 4], 0)
//!     .with_distances(distances)
//!     .with_request(Request::new(1, 1, 3))
//!     .with_request(Request::new(2, 2, 4))
//!     .with_default_time_window(TimeWindow::new(0.0, 100.0))
//!     .build()
//!     .unwrap();
//!
//! let solution = pdp_routing::solve(&instance).unwrap();
//! assert_eq!(solution.improved().len(), 5);
//! assert!(solution.improved_distance() <= solution.constructed_distance());
//! ```

pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod solver;

pub use solver::solve;
