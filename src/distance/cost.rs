//! Route cost evaluation.

use super::{DistanceMatrix, NodeIndex};
use crate::models::NodeId;

/// Computes the total distance of a route: the sum of `c[route[k]][route[k+1]]`.
///
/// When `index` is given, node IDs are mapped to matrix positions through it;
/// otherwise node IDs are used directly as matrix indices. Empty and
/// single-node routes cost zero.
///
/// # Panics
///
/// Panics if the route contains a node that is not in `index` (or, without an
/// index, an ID outside the matrix).
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::{total_distance, DistanceMatrix, NodeIndex};
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 3.0],
///     vec![2.0, 0.0, 4.0],
///     vec![3.0, 4.0, 0.0],
/// ])
/// .unwrap();
/// assert_eq!(total_distance(&[0, 1, 2], &dm, None), 6.0);
///
/// // Sparse IDs: node 9 lives at position 2.
/// let index = NodeIndex::new(&[0, 1, 9]).unwrap();
/// assert_eq!(total_distance(&[0, 9, 1], &dm, Some(&index)), 7.0);
/// ```
pub fn total_distance(
    route: &[NodeId],
    distances: &DistanceMatrix,
    index: Option<&NodeIndex>,
) -> f64 {
    let pos = |node: NodeId| match index {
        Some(index) => index
            .position(node)
            .unwrap_or_else(|| panic!("node {node} is not part of the instance")),
        None => node,
    };
    route
        .windows(2)
        .map(|w| distances.get(pos(w[0]), pos(w[1])))
        .sum()
}
