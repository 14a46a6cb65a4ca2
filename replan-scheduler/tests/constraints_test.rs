#![cfg(test)]
mod helpers;

use helpers::check_capacities;
use helpers::init_logging;
use helpers::set;
use helpers::solve;
use helpers::Datacenter;
use helpers::CPU;
use replan_scheduler::constraint::OptConstraint;
use replan_scheduler::constraint::SatConstraint;
use replan_scheduler::model::NodeState;
use replan_scheduler::model::ResourceView;
use replan_scheduler::model::VmState;
use replan_scheduler::plan::ActionKind;
use replan_scheduler::plan::Allocation;
use replan_scheduler::plan::Operation;
use replan_scheduler::Instance;
use replan_scheduler::Parameters;

#[test]
fn spread_vms_end_on_distinct_nodes() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let n1 = datacenter.nodes[0];
    let first = datacenter.running_vm(n1, 1);
    let second = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Spread(set([first, second]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("the second node is free");
    assert_eq!(1, plan.size());
    assert_eq!(ActionKind::MigrateVm, plan.actions()[0].kind());
    let reached = plan.apply().expect("the plan is applyable");
    assert_ne!(
        reached.mapping().vm_location(first),
        reached.mapping().vm_location(second)
    );
}

#[test]
fn gathered_vms_share_a_node() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let first = datacenter.running_vm(n1, 1);
    let second = datacenter.running_vm(n2, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Gather(set([first, second]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("one VM can join the other");
    assert_eq!(1, plan.size());
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(
        reached.mapping().vm_location(first),
        reached.mapping().vm_location(second)
    );
}

#[test]
fn fenced_vms_leave_the_other_nodes() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let (n1, n3) = (datacenter.nodes[0], datacenter.nodes[2]);
    let vm = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Fence {
            vms: set([vm]),
            nodes: set([n3]),
        }],
    );

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n3 is free");
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(n3), reached.mapping().vm_location(vm));
}

#[test]
fn rooted_vms_cannot_escape_an_offline_request() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let n1 = datacenter.nodes[0];
    let vm = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![
            SatConstraint::Root(set([vm])),
            SatConstraint::Offline(set([n1])),
        ],
    );

    let result = solve(&instance, Parameters::default());

    assert!(result.is_infeasible());
}

#[test]
fn lonely_vms_get_their_own_node() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let n1 = datacenter.nodes[0];
    let lonely = datacenter.running_vm(n1, 1);
    let other = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Lonely(set([lonely]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 is free");
    assert_eq!(1, plan.size());
    let reached = plan.apply().expect("the plan is applyable");
    assert_ne!(
        reached.mapping().vm_location(lonely),
        reached.mapping().vm_location(other)
    );
}

#[test]
fn split_groups_do_not_share_nodes() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let n1 = datacenter.nodes[0];
    let red = datacenter.running_vm(n1, 1);
    let blue = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Split(vec![set([red]), set([blue])])],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 is free");
    let reached = plan.apply().expect("the plan is applyable");
    assert_ne!(
        reached.mapping().vm_location(red),
        reached.mapping().vm_location(blue)
    );
}

#[test]
fn among_vms_end_in_a_single_group() {
    init_logging();
    let mut datacenter = Datacenter::new(4, 4);
    let nodes = datacenter.nodes.clone();
    let first = datacenter.running_vm(nodes[0], 1);
    let second = datacenter.running_vm(nodes[2], 1);
    let groups = vec![set([nodes[0], nodes[1]]), set([nodes[2], nodes[3]])];
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Among {
            vms: set([first, second]),
            groups: groups.clone(),
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("either group can host both VMs");
    assert_eq!(1, plan.size());
    let reached = plan.apply().expect("the plan is applyable");
    let hosts = [first, second].map(|vm| reached.mapping().vm_location(vm).expect("running"));
    assert!(groups
        .iter()
        .any(|group| hosts.iter().all(|host| group.contains(host))));
}

#[test]
fn quarantined_nodes_accept_no_newcomer() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let _ = datacenter.running_vm(n1, 1);
    let vm = datacenter.ready_vm(1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![
            SatConstraint::Quarantine(set([n1])),
            SatConstraint::Running(set([vm])),
        ],
    );

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 is free");
    assert_eq!(
        vec![&Operation::BootVm { vm, node: n2 }],
        plan.actions()
            .iter()
            .map(|action| &action.operation)
            .collect::<Vec<_>>()
    );
}

#[test]
fn idle_nodes_are_shut_down_to_respect_max_online() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let nodes = datacenter.nodes.clone();
    let _ = datacenter.running_vm(nodes[0], 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::MaxOnline {
            nodes: set(nodes.clone()),
            amount: 1,
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("the idle nodes can be shut down");
    assert_eq!(2, plan.size());
    assert!(plan
        .actions()
        .iter()
        .all(|action| action.kind() == ActionKind::ShutdownNode));
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(NodeState::Online), reached.mapping().node_state(nodes[0]));
}

#[test]
fn running_capacity_caps_the_number_of_vms() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let _ = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::RunningCapacity {
            nodes: set([n1]),
            amount: 1,
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 is free");
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(1, reached.mapping().running_vms_on(n1).count());
    assert_eq!(1, reached.mapping().running_vms_on(n2).count());
}

#[test]
fn resource_capacity_caps_the_consumption() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 8);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let _ = datacenter.running_vm(n1, 3);
    let _ = datacenter.running_vm(n1, 3);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::ResourceCapacity {
            resource: CPU.to_owned(),
            nodes: set([n1]),
            amount: 4,
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 is free");
    check_capacities(&plan, CPU);
    let reached = plan.apply().expect("the plan is applyable");
    let cpu = reached.resource(CPU).expect("attached");
    assert!(cpu.sum_consumptions(reached.mapping().running_vms_on(n1)) <= 4);
    assert_eq!(1, reached.mapping().running_vms_on(n2).count());
}

#[test]
fn preserved_resources_are_allocated_in_place() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 8);
    let vm = datacenter.running_vm(datacenter.nodes[0], 2);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Preserve {
            vms: set([vm]),
            resource: CPU.to_owned(),
            amount: 5,
        }],
    );

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("the node has room");
    assert_eq!(1, plan.size());
    let action = plan.actions()[0];
    assert_eq!(ActionKind::Allocate, action.kind());
    let Operation::Allocate { allocation, .. } = &action.operation else {
        panic!("expected an allocation, got {action}");
    };
    assert_eq!(
        &Allocation {
            resource: CPU.to_owned(),
            amount: 5
        },
        allocation
    );
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(5, reached.resource(CPU).expect("attached").consumption(vm));
}

#[test]
fn vms_are_suspended_and_killed() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 4);
    let n1 = datacenter.nodes[0];
    let sleeper = datacenter.running_vm(n1, 1);
    let victim = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![
            SatConstraint::Sleeping(set([sleeper])),
            SatConstraint::Killed(set([victim])),
        ],
    );

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("both actions are always possible");
    let mut kinds = plan
        .actions()
        .iter()
        .map(|action| action.kind())
        .collect::<Vec<_>>();
    kinds.sort_by_key(|kind| format!("{kind:?}"));
    assert_eq!(vec![ActionKind::KillVm, ActionKind::SuspendVm], kinds);
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(VmState::Sleeping), reached.vm_state(sleeper));
    assert_eq!(Some(VmState::Killed), reached.vm_state(victim));
}
