//! Classifies a failed construction as a dead end or a defective instance.

use crate::evaluation::FeasibilityEvaluator;
use crate::models::{Infeasibility, InfeasibilityCause, StructuralDefect};

/// Builds the diagnostic for a construction that found no feasible action.
///
/// `unserved` holds request positions. A defect is either an inverted window
/// on a node the route must visit or an unserved request whose standalone
/// route `[start, pickup, delivery(, end)]` is already infeasible. Paired
/// groups are not enforced on the standalone route.
pub(crate) fn diagnose(
    evaluator: &FeasibilityEvaluator<'_>,
    iteration: usize,
    unserved: &[usize],
    candidates_tried: usize,
) -> Infeasibility {
    let instance = evaluator.instance();
    let requests = instance.requests();
    let mut defects = Vec::new();

    let mut required: Vec<_> = std::iter::once(instance.start())
        .chain(instance.end())
        .chain(requests.iter().flat_map(|r| [r.pickup(), r.delivery()]))
        .collect();
    required.sort_unstable();
    required.dedup();
    for node in required {
        if matches!(instance.time_window(node), Some(tw) if !tw.is_well_formed()) {
            defects.push(StructuralDefect::InvertedTimeWindow { node });
        }
    }

    for &r in unserved {
        let req = requests[r];
        let mut standalone = vec![instance.start(), req.pickup(), req.delivery()];
        standalone.extend(instance.end());
        if let Err(violation) = evaluator.check_ignoring_groups(&standalone) {
            defects.push(StructuralDefect::UnservableRequest {
                request: req.id(),
                violation,
            });
        }
    }

    let cause = if defects.is_empty() {
        InfeasibilityCause::NoFeasibleInsertion
    } else {
        InfeasibilityCause::StructurallyInvalid(defects)
    };

    Infeasibility {
        iteration,
        unserved: unserved.iter().map(|&r| requests[r].id()).collect(),
        candidates_tried,
        cause,
    }
}
