use log::debug;
use replan_core::results::Solution;

use super::Action;
use super::Operation;
use super::ReconfigurationPlan;
use crate::model::Node;
use crate::problem::ReconfigurationProblem;
use crate::transition::NodeTransitionKind;
use crate::transition::VmTransition;
use crate::transition::VmTransitionKind;

/// Turns a solution of `problem` into the plan it stands for.
pub(crate) fn extract(
    problem: &ReconfigurationProblem,
    solution: &Solution,
) -> ReconfigurationPlan {
    let mut plan = ReconfigurationPlan::new(problem.source_model().clone());

    for transition in problem.node_transitions() {
        let online = solution.get_integer_value(transition.state()) == 1;
        let start = solution.get_value(transition.start());
        let end = solution.get_value(transition.end());
        let node = transition.node();

        match (transition.kind(), online) {
            (NodeTransitionKind::Bootable, true) => {
                plan.add(Action::new(start, end, Operation::BootNode { node }));
            }
            (NodeTransitionKind::Shutdownable, false) => {
                plan.add(Action::new(start, end, Operation::ShutdownNode { node }));
            }
            _ => {}
        }
    }

    for transition in problem.vm_transitions() {
        if let Some(action) = vm_action(problem, transition, solution) {
            plan.add(action);
        }
    }

    debug!("Extracted a plan of {} actions", plan.size());
    plan
}

fn vm_action(
    problem: &ReconfigurationProblem,
    transition: &VmTransition,
    solution: &Solution,
) -> Option<Action> {
    let vm = transition.vm();
    let start = solution.get_value(transition.start());
    let end = solution.get_value(transition.end());
    let source = transition.source_host();
    let destination = transition
        .future_host()
        .and_then(|host| problem.node_at(solution.get_value(host)));

    let operation = match transition.kind() {
        VmTransitionKind::Stay => return None,
        VmTransitionKind::Forge => Operation::ForgeVm { vm },
        VmTransitionKind::Boot => Operation::BootVm {
            vm,
            node: destination?,
        },
        VmTransitionKind::Shutdown => Operation::ShutdownVm { vm, node: source? },
        VmTransitionKind::Suspend => Operation::SuspendVm { vm, node: source? },
        VmTransitionKind::Resume => Operation::ResumeVm {
            vm,
            source: source?,
            destination: destination?,
        },
        VmTransitionKind::Kill => Operation::KillVm { vm, host: source },
        VmTransitionKind::Relocatable => {
            return relocation(transition, start, end, source?, destination?);
        }
    };

    Some(Action::new(start, end, operation))
}

/// A migration carrying the new allocations, an in-place allocation, or nothing.
fn relocation(
    transition: &VmTransition,
    start: i32,
    end: i32,
    source: Node,
    destination: Node,
) -> Option<Action> {
    let vm = transition.vm();
    let mut allocations = transition.allocations.clone();

    if source != destination {
        let mut action = Action::new(
            start,
            end,
            Operation::MigrateVm {
                vm,
                source,
                destination,
            },
        );
        action.post_allocations = allocations;
        return Some(action);
    }

    if allocations.is_empty() {
        return None;
    }
    let allocation = allocations.remove(0);
    let mut action = Action::new(
        start,
        end,
        Operation::Allocate {
            vm,
            node: source,
            allocation,
        },
    );
    action.post_allocations = allocations;
    Some(action)
}
