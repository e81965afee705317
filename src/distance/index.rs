//! Mapping from (possibly sparse) node IDs to dense matrix positions.

use std::collections::HashMap;

use crate::models::{InstanceError, NodeId};

/// Sparse lookups beyond this many slots per node fall back to hashing.
const DENSE_SLOTS_PER_NODE: usize = 8;

#[derive(Debug, Clone)]
enum Lookup {
    /// IDs are exactly `0..n`.
    Identity,
    /// Direct table indexed by node ID.
    Table(Vec<Option<usize>>),
    /// IDs too spread out for a table.
    Map(HashMap<NodeId, usize>),
}

/// Maps node IDs to their position in the instance node list.
///
/// Matrices and per-node arrays are indexed by position, so an instance with
/// IDs `[0, 1, 2, 5, 6, 7, 8]` reads row 3 for node 5.
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::NodeIndex;
///
/// let index = NodeIndex::new(&[0, 1, 2, 5, 6]).unwrap();
/// assert_eq!(index.position(5), Some(3));
/// assert_eq!(index.position(3), None);
/// assert_eq!(index.node(4), 6);
/// ```
#[derive(Debug, Clone)]
pub struct NodeIndex {
    nodes: Vec<NodeId>,
    lookup: Lookup,
}

impl NodeIndex {
    /// Builds the index for an ordered node list.
    ///
    /// Fails with [`InstanceError::DuplicateNode`] if an ID repeats.
    pub fn new(nodes: &[NodeId]) -> Result<Self, InstanceError> {
        let n = nodes.len();
        let max = nodes.iter().copied().max().unwrap_or(0);

        let lookup = if nodes.iter().enumerate().all(|(i, &id)| i == id) {
            Lookup::Identity
        } else if max < n.saturating_mul(DENSE_SLOTS_PER_NODE).saturating_add(64) {
            let mut table = vec![None; max + 1];
            for (pos, &id) in nodes.iter().enumerate() {
                if table[id].replace(pos).is_some() {
                    return Err(InstanceError::DuplicateNode(id));
                }
            }
            Lookup::Table(table)
        } else {
            let mut map = HashMap::with_capacity(n);
            for (pos, &id) in nodes.iter().enumerate() {
                if map.insert(id, pos).is_some() {
                    return Err(InstanceError::DuplicateNode(id));
                }
            }
            Lookup::Map(map)
        };

        Ok(Self {
            nodes: nodes.to_vec(),
            lookup,
        })
    }

    /// Position of `node` in the node list, or `None` if it is not a member.
    #[inline]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        match &self.lookup {
            Lookup::Identity => (node < self.nodes.len()).then_some(node),
            Lookup::Table(table) => table.get(node).copied().flatten(),
            Lookup::Map(map) => map.get(&node).copied(),
        }
    }

    /// Node ID at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn node(&self, position: usize) -> NodeId {
        self.nodes[position]
    }

    /// Returns `true` if `node` is in the node list.
    pub fn contains(&self, node: NodeId) -> bool {
        self.position(node).is_some()
    }

    /// Ordered node list.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
