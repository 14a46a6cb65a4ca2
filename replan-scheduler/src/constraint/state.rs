use log::warn;

use super::SatConstraint;
use crate::error::SchedulerError;
use crate::problem::ReconfigurationProblem;

/// The VM states are decided when the action models are built; this only checks that the
/// problem was built with them.
pub(super) fn inject_vm_state(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let Some((state, vms)) = constraint.requested_state() else {
        return Ok(true);
    };

    for &vm in vms.iter() {
        let transition = problem
            .vm_transition(vm)
            .ok_or(SchedulerError::UnknownVm(vm))?;
        if transition.future_state() != state {
            warn!(
                "{vm} goes to {} while {state} is requested",
                transition.future_state()
            );
            return Ok(false);
        }
    }

    Ok(!problem.is_infeasible())
}

pub(super) fn inject_node_state(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let (nodes, online) = match constraint {
        SatConstraint::Online(nodes) => (nodes, true),
        SatConstraint::Offline(nodes) => (nodes, false),
        _ => return Ok(true),
    };

    for &node in nodes.iter() {
        let state = problem
            .node_transition(node)
            .ok_or(SchedulerError::UnknownNode(node))?
            .state();
        let predicate = if online {
            state.get_true_predicate()
        } else {
            state.get_false_predicate()
        };
        if problem.solver_mut().post(predicate).is_err() {
            return Ok(false);
        }
    }

    Ok(true)
}
