//! Distance and travel time matrices.
//!
//! Provides a dense matrix indexed by node position, the node-ID → position
//! index for sparse identifiers, and route cost evaluation.

mod cost;
mod index;
mod matrix;

pub use cost::total_distance;
pub use index::NodeIndex;
pub use matrix::DistanceMatrix;
