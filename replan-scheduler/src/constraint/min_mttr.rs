use log::debug;
use replan_core::branching::branchers::IndependentVariableValueBrancher;
use replan_core::branching::value_selection::InDomainMin;
use replan_core::branching::value_selection::PreferValue;
use replan_core::branching::variable_selection::InputOrder;
use replan_core::constraints;
use replan_core::variables::DomainId;
use replan_core::variables::TransformableVariable;

use super::OptConstraint;
use super::WorstFit;
use crate::error::SchedulerError;
use crate::model::Vm;
use crate::model::VmState;
use crate::problem::ReconfigurationProblem;
use crate::transition::VmTransitionKind;

/// Minimises the sum of the ends of the actions.
///
/// The heuristic first places the VMs which cannot stay where they are (worst fit), then the
/// other VMs (on their current host when possible), then decides the node states and the
/// moments of the actions, earliest first.
pub(super) fn inject(
    _objective: &OptConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let ends = problem
        .vm_transitions()
        .filter(|transition| transition.kind() != VmTransitionKind::Stay)
        .map(|transition| transition.end())
        .chain(
            problem
                .node_transitions()
                .iter()
                .map(|transition| transition.end()),
        )
        .collect::<Vec<_>>();

    let upper_bound = (ends.len() as i64 * i64::from(problem.horizon())).min(i64::from(i32::MAX));
    let cost = if problem.parameters().verbosity > 0 {
        problem
            .solver_mut()
            .new_named_bounded_integer(0, upper_bound as i32, "cost")
    } else {
        problem
            .solver_mut()
            .new_bounded_integer(0, upper_bound as i32)
    };

    let terms = ends
        .iter()
        .map(|end| end.scaled(1))
        .chain(std::iter::once(cost.scaled(-1)))
        .collect::<Vec<_>>();
    if !problem.post(constraints::equals(terms, 0)) {
        return Ok(false);
    }

    let (misplaced, placed): (Vec<_>, Vec<_>) = problem
        .future_hosts()
        .partition(|&(vm, host)| must_move(problem, vm, host));
    debug!(
        "{} VM(s) need a new host, {} may stay",
        misplaced.len(),
        placed.len()
    );

    let hosts = misplaced
        .into_iter()
        .chain(placed)
        .map(|(_, host)| host)
        .collect();
    let host_selector = PreferValue::new(problem.current_hosts(), WorstFit::new(problem));
    let mut brancher = problem.scheduling_brancher(hosts, host_selector);
    brancher.add_brancher(Box::new(IndependentVariableValueBrancher::new(
        InputOrder::new(&[cost]),
        InDomainMin,
    )));

    problem.set_objective(cost, brancher);
    Ok(true)
}

/// Whether the VM is not running yet, or cannot stay on its current host anymore.
fn must_move(problem: &ReconfigurationProblem, vm: Vm, host: DomainId) -> bool {
    let Some(transition) = problem.vm_transition(vm) else {
        return false;
    };
    if transition.source_state() != VmState::Running {
        return true;
    }
    match transition
        .source_host()
        .and_then(|node| problem.node_index(node))
    {
        Some(index) => !problem.solver().contains(&host, index),
        None => true,
    }
}
