use std::collections::BTreeSet;

use itertools::Itertools;
use replan_core::constraints;
use replan_core::predicate;
use replan_core::variables::DomainId;

use super::SatConstraint;
use crate::error::SchedulerError;
use crate::model::Node;
use crate::model::Vm;
use crate::model::VmState;
use crate::problem::ReconfigurationProblem;
use crate::propagators::DisjointConstructor;

/// The host variables of the VMs among `vms` which run at the end of the plan.
fn future_hosts(problem: &ReconfigurationProblem, vms: &BTreeSet<Vm>) -> Vec<DomainId> {
    vms.iter()
        .filter_map(|&vm| problem.future_host(vm))
        .collect()
}

fn node_indices(
    problem: &ReconfigurationProblem,
    nodes: &BTreeSet<Node>,
) -> Result<BTreeSet<i32>, SchedulerError> {
    nodes
        .iter()
        .map(|&node| problem.node_index(node).ok_or(SchedulerError::UnknownNode(node)))
        .collect()
}

/// Removes from `host` the nodes for which `allowed` is false.
fn restrict_host(
    problem: &mut ReconfigurationProblem,
    host: DomainId,
    allowed: impl Fn(i32) -> bool,
) -> bool {
    let forbidden = (0..problem.nodes().len() as i32)
        .filter(|&index| !allowed(index))
        .collect::<Vec<_>>();
    forbidden
        .into_iter()
        .all(|index| problem.solver_mut().post(predicate!(host != index)).is_ok())
}

/// Fence, Ban and Root, which restrict the hosts of each VM on its own.
pub(super) fn inject_host_restriction(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    match constraint {
        SatConstraint::Fence { vms, nodes } => {
            let allowed = node_indices(problem, nodes)?;
            Ok(future_hosts(problem, vms)
                .into_iter()
                .all(|host| restrict_host(problem, host, |index| allowed.contains(&index))))
        }
        SatConstraint::Ban { vms, nodes } => {
            let banned = node_indices(problem, nodes)?;
            Ok(future_hosts(problem, vms)
                .into_iter()
                .all(|host| restrict_host(problem, host, |index| !banned.contains(&index))))
        }
        SatConstraint::Root(vms) => Ok(vms.iter().all(|&vm| stay(problem, vm))),
        _ => Ok(true),
    }
}

/// Keeps a running VM on its current host.
fn stay(problem: &mut ReconfigurationProblem, vm: Vm) -> bool {
    let Some(transition) = problem.vm_transition(vm) else {
        return true;
    };
    if transition.source_state() != VmState::Running {
        return true;
    }
    let (Some(host), Some(source)) = (transition.future_host(), transition.source_host()) else {
        return true;
    };
    let Some(index) = problem.node_index(source) else {
        return true;
    };
    problem.solver_mut().post(predicate!(host == index)).is_ok()
}

pub(super) fn inject_spread(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Spread(vms) = constraint else {
        return Ok(true);
    };

    let hosts = future_hosts(problem, vms);
    if hosts.len() < 2 {
        return Ok(true);
    }
    Ok(problem.post(constraints::all_different(hosts)))
}

pub(super) fn inject_gather(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Gather(vms) = constraint else {
        return Ok(true);
    };

    let hosts = future_hosts(problem, vms);
    Ok(hosts
        .iter()
        .tuple_windows()
        .all(|(&first, &second)| problem.post(constraints::binary_equals(first, second))))
}

pub(super) fn inject_lonely(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Lonely(vms) = constraint else {
        return Ok(true);
    };

    let (lonely, others): (Vec<_>, Vec<_>) = problem
        .future_hosts()
        .partition(|(vm, _)| vms.contains(vm));
    if lonely.is_empty() || others.is_empty() {
        return Ok(true);
    }

    Ok(problem.post(DisjointConstructor {
        first: lonely.into_iter().map(|(_, host)| host).collect(),
        second: others.into_iter().map(|(_, host)| host).collect(),
    }))
}

pub(super) fn inject_among(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Among { vms, groups } = constraint else {
        return Ok(true);
    };

    let mut group_of = vec![-1; problem.nodes().len()];
    for (group, nodes) in groups.iter().enumerate() {
        for index in node_indices(problem, nodes)? {
            if group_of[index as usize] != -1 {
                return Err(SchedulerError::InvalidParameters(format!(
                    "the groups of an among constraint overlap on {}",
                    problem.nodes()[index as usize]
                )));
            }
            group_of[index as usize] = group as i32;
        }
    }

    let hosts = future_hosts(problem, vms);
    if hosts.is_empty() {
        return Ok(true);
    }
    if groups.is_empty() {
        return Ok(false);
    }

    let solver = problem.solver_mut();
    let selected = solver.new_bounded_integer(0, groups.len() as i32 - 1);
    let array = group_of
        .iter()
        .map(|&group| solver.new_constant(group))
        .collect::<Vec<_>>();

    for host in hosts {
        if !restrict_host(problem, host, |index| group_of[index as usize] != -1) {
            return Ok(false);
        }
        if !problem.post(constraints::element(host, array.clone(), selected)) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(super) fn inject_split(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Split(groups) = constraint else {
        return Ok(true);
    };

    let hosts = groups
        .iter()
        .map(|group| future_hosts(problem, group))
        .filter(|hosts| !hosts.is_empty())
        .collect::<Vec<_>>();

    Ok(hosts.iter().tuple_combinations().all(|(first, second)| {
        problem.post(DisjointConstructor {
            first: first.clone(),
            second: second.clone(),
        })
    }))
}

/// The running VMs of the nodes stay there and the other VMs cannot come in.
pub(super) fn inject_quarantine(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Quarantine(nodes) = constraint else {
        return Ok(true);
    };

    let quarantined = node_indices(problem, nodes)?;
    let mapping = problem.source_model().mapping();
    let (inside, outside): (Vec<_>, Vec<_>) = problem.future_hosts().partition(|&(vm, _)| {
        mapping.vm_state(vm) == Some(VmState::Running)
            && mapping.vm_location(vm).is_some_and(|node| nodes.contains(&node))
    });

    for (vm, _) in inside {
        if !stay(problem, vm) {
            return Ok(false);
        }
    }
    Ok(outside
        .into_iter()
        .all(|(_, host)| restrict_host(problem, host, |index| !quarantined.contains(&index))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::problem::host_of;
    use crate::problem::ReconfigurationProblemBuilder;

    fn three_nodes_two_vms() -> (Model, [Node; 3], [Vm; 2]) {
        let mut model = Model::default();
        let nodes = [model.new_node(), model.new_node(), model.new_node()];
        let vms = [model.new_vm(), model.new_vm()];
        for node in nodes {
            model.mapping_mut().add_online_node(node);
        }
        assert!(model.mapping_mut().add_running_vm(vms[0], nodes[0]));
        assert!(model.mapping_mut().add_running_vm(vms[1], nodes[0]));
        (model, nodes, vms)
    }

    fn build(model: &Model) -> ReconfigurationProblem {
        ReconfigurationProblemBuilder::new(model)
            .build()
            .expect("valid model")
    }

    #[test]
    fn fence_removes_the_other_nodes() {
        let (model, nodes, vms) = three_nodes_two_vms();
        let mut problem = build(&model);

        let fence = SatConstraint::Fence {
            vms: BTreeSet::from([vms[0]]),
            nodes: BTreeSet::from([nodes[1], nodes[2]]),
        };

        assert_eq!(Ok(true), inject_host_restriction(&fence, &mut problem));
        let host = host_of(&problem, vms[0]);
        assert!(!problem.solver().contains(&host, 0));
        assert!(problem.solver().contains(&host, 1));
    }

    #[test]
    fn spread_separates_a_fixed_vm_from_the_others() {
        let (model, _, vms) = three_nodes_two_vms();
        let mut problem = build(&model);
        let spread = SatConstraint::Spread(vms.into_iter().collect());
        assert_eq!(Ok(true), inject_spread(&spread, &mut problem));

        let first = host_of(&problem, vms[0]);
        let second = host_of(&problem, vms[1]);
        problem
            .solver_mut()
            .post(predicate!(first == 0))
            .expect("feasible");

        assert!(!problem.solver().contains(&second, 0));
    }

    #[test]
    fn among_rejects_overlapping_groups() {
        let (model, nodes, vms) = three_nodes_two_vms();
        let mut problem = build(&model);

        let among = SatConstraint::Among {
            vms: vms.into_iter().collect(),
            groups: vec![
                BTreeSet::from([nodes[0], nodes[1]]),
                BTreeSet::from([nodes[1], nodes[2]]),
            ],
        };

        assert!(matches!(
            inject_among(&among, &mut problem),
            Err(SchedulerError::InvalidParameters(_))
        ));
    }

    #[test]
    fn quarantine_keeps_the_vms_inside_and_the_others_outside() {
        let (mut model, nodes, vms) = three_nodes_two_vms();
        let outsider = model.new_vm();
        assert!(model.mapping_mut().add_running_vm(outsider, nodes[1]));
        let mut problem = build(&model);

        let quarantine = SatConstraint::Quarantine(BTreeSet::from([nodes[0]]));

        assert_eq!(Ok(true), inject_quarantine(&quarantine, &mut problem));
        assert!(problem.solver().is_fixed(&host_of(&problem, vms[0])));
        assert!(!problem.solver().contains(&host_of(&problem, outsider), 0));
    }
}
