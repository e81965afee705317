//! Pickup-delivery request.

use serde::{Deserialize, Serialize};

use super::{NodeId, RequestId};

/// A transport request: load at `pickup`, unload at `delivery`.
///
/// # Examples
///
/// ```
/// use pdp_routing::models::Request;
///
/// let r = Request::new(1, 3, 7);
/// assert_eq!(r.pickup(), 3);
/// assert_eq!(r.delivery(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    pickup: NodeId,
    delivery: NodeId,
}

impl Request {
    /// Creates a request.
    pub fn new(id: RequestId, pickup: NodeId, delivery: NodeId) -> Self {
        Self {
            id,
            pickup,
            delivery,
        }
    }

    /// Request ID.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Pickup node.
    pub fn pickup(&self) -> NodeId {
        self.pickup
    }

    /// Delivery node.
    pub fn delivery(&self) -> NodeId {
        self.delivery
    }
}
