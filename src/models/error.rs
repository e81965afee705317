//! Error types: instance validation and solve outcomes.

use std::fmt;

use super::{NodeId, RequestId, Violation};

/// A contract violation detected while building an [`Instance`](super::Instance).
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// The node list is empty.
    NoNodes,
    /// A node ID appears more than once in the node list.
    DuplicateNode(NodeId),
    /// A depot is not in the node list.
    UnknownDepot(NodeId),
    /// A request, service time or time window names a node outside the node list.
    UnknownNode(NodeId),
    /// A request ID appears more than once.
    DuplicateRequest(RequestId),
    /// A request picks up and delivers at the same node.
    SamePickupDelivery(RequestId),
    /// No distance matrix was supplied.
    MissingDistances,
    /// A matrix does not match the node count.
    MatrixSize {
        /// Which matrix.
        matrix: &'static str,
        /// Expected side length.
        expected: usize,
        /// Actual side length.
        actual: usize,
    },
    /// A matrix or service time holds a negative or non-finite value, or a
    /// time window bound is NaN.
    InvalidValue {
        /// Where the value was found.
        field: &'static str,
        /// Node the value belongs to.
        node: NodeId,
    },
    /// A paired group has fewer than two distinct members.
    GroupTooSmall(usize),
    /// A paired group names a request that does not exist.
    UnknownGroupMember {
        /// Group index.
        group: usize,
        /// Unknown request ID.
        request: RequestId,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNodes => write!(f, "instance has no nodes"),
            Self::DuplicateNode(n) => write!(f, "node {n} is listed more than once"),
            Self::UnknownDepot(n) => write!(f, "depot {n} is not in the node list"),
            Self::UnknownNode(n) => write!(f, "node {n} is not in the node list"),
            Self::DuplicateRequest(r) => write!(f, "request {r} is defined more than once"),
            Self::SamePickupDelivery(r) => {
                write!(f, "request {r} has identical pickup and delivery nodes")
            }
            Self::MissingDistances => write!(f, "no distance matrix supplied"),
            Self::MatrixSize {
                matrix,
                expected,
                actual,
            } => write!(
                f,
                "{matrix} matrix is {actual}x{actual}, expected {expected}x{expected}"
            ),
            Self::InvalidValue { field, node } => {
                write!(f, "invalid {field} at node {node}")
            }
            Self::GroupTooSmall(g) => {
                write!(f, "paired group {g} has fewer than two distinct requests")
            }
            Self::UnknownGroupMember { group, request } => {
                write!(f, "paired group {group} names unknown request {request}")
            }
        }
    }
}

impl std::error::Error for InstanceError {}

/// A defect that makes an instance unservable regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralDefect {
    /// A node whose window closes before it opens.
    InvertedTimeWindow {
        /// Node with the inverted window.
        node: NodeId,
    },
    /// A request that cannot be served even on its own (`start, p, d, end`).
    UnservableRequest {
        /// Request ID.
        request: RequestId,
        /// First violation of the standalone route.
        violation: Violation,
    },
}

impl fmt::Display for StructuralDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedTimeWindow { node } => {
                write!(f, "time window of node {node} closes before it opens")
            }
            Self::UnservableRequest { request, violation } => {
                write!(f, "request {request} cannot be served alone: {violation}")
            }
        }
    }
}

/// Why construction found no feasible action.
#[derive(Debug, Clone, PartialEq)]
pub enum InfeasibilityCause {
    /// Every request is servable alone, but no insertion fits the partial route.
    NoFeasibleInsertion,
    /// The instance carries defects that no insertion order can overcome.
    StructurallyInvalid(Vec<StructuralDefect>),
}

/// Diagnostic context for a failed construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Infeasibility {
    /// Construction iteration at which no candidate was feasible.
    pub iteration: usize,
    /// Requests not fully served at that point.
    pub unserved: Vec<RequestId>,
    /// Number of candidate routes evaluated in the failing iteration.
    pub candidates_tried: usize,
    /// Classified cause.
    pub cause: InfeasibilityCause,
}

impl Infeasibility {
    /// Returns `true` if the cause is a structural defect of the instance.
    pub fn is_structural(&self) -> bool {
        matches!(self.cause, InfeasibilityCause::StructurallyInvalid(_))
    }
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            InfeasibilityCause::NoFeasibleInsertion => write!(
                f,
                "no feasible insertion found at iteration {} ({} candidates tried, unserved requests {:?})",
                self.iteration, self.candidates_tried, self.unserved
            ),
            InfeasibilityCause::StructurallyInvalid(defects) => {
                write!(f, "structurally invalid instance")?;
                for (i, d) in defects.iter().enumerate() {
                    write!(f, "{} {d}", if i == 0 { ":" } else { ";" })?;
                }
                Ok(())
            }
        }
    }
}

/// Solver phase, used to report where a run was interrupted.
///
/// Only construction can be interrupted without a result; an exhausted
/// improvement budget returns the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Greedy insertion.
    Construction,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construction => write!(f, "construction"),
        }
    }
}

/// Why a budgeted loop stopped before its natural end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured iteration or pass limit was reached.
    IterationLimit,
    /// The configured wall-clock limit elapsed.
    TimeLimit,
    /// The cancellation token was triggered.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationLimit => write!(f, "iteration limit reached"),
            Self::TimeLimit => write!(f, "time limit reached"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A solve that produced no route.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Construction found no feasible action.
    Infeasible(Infeasibility),
    /// A budget stopped a phase that cannot return a partial result.
    Interrupted {
        /// Phase that was running.
        phase: Phase,
        /// Which budget ran out.
        reason: StopReason,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infeasible(inf) => write!(f, "instance infeasible: {inf}"),
            Self::Interrupted { phase, reason } => write!(f, "{phase} interrupted: {reason}"),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<Infeasibility> for SolveError {
    fn from(inf: Infeasibility) -> Self {
        Self::Infeasible(inf)
    }
}
