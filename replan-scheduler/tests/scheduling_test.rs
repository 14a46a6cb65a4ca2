#![cfg(test)]
mod helpers;

use std::time::Duration;

use helpers::check_capacities;
use helpers::check_plan;
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
use replan_scheduler::plan::Operation;
use replan_scheduler::plan::ReconfigurationPlan;
use replan_scheduler::Instance;
use replan_scheduler::Parameters;

#[test]
fn a_node_is_emptied_before_it_is_shut_down() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let vm = datacenter.running_vm(n1, 2);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Offline(set([n1]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 can host the VM");
    let actions = plan.actions();
    assert_eq!(2, actions.len());
    assert_eq!(
        Operation::MigrateVm {
            vm,
            source: n1,
            destination: n2
        },
        actions[0].operation
    );
    assert_eq!(ActionKind::ShutdownNode, actions[1].kind());
    assert!(actions[1].start >= actions[0].end);

    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(NodeState::Offline), reached.mapping().node_state(n1));
    assert_eq!(Some(n2), reached.mapping().vm_location(vm));
}

#[test]
fn a_running_vm_is_shut_down() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 4);
    let vm = datacenter.running_vm(datacenter.nodes[0], 1);
    let instance = Instance::new(datacenter.into_model(), vec![SatConstraint::Ready(set([vm]))]);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("shutting down is always possible");
    assert_eq!(1, plan.size());
    let action = plan.actions()[0];
    assert_eq!(ActionKind::ShutdownVm, action.kind());
    assert_eq!(1, action.duration());
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(VmState::Ready), reached.vm_state(vm));
}

#[test]
fn a_satisfied_instance_gives_an_empty_plan() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let first = datacenter.running_vm(datacenter.nodes[0], 1);
    let second = datacenter.running_vm(datacenter.nodes[1], 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![
            SatConstraint::Running(set([first, second])),
            SatConstraint::Spread(set([first, second])),
        ],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("nothing to do");
    assert!(plan.is_empty());
    assert_eq!(0, plan.duration());
    assert!(result.statistics.completed);
}

#[test]
fn migrations_never_overload_a_node() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let (n1, n2, n3) = (datacenter.nodes[0], datacenter.nodes[1], datacenter.nodes[2]);
    let _ = datacenter.running_vm(n1, 2);
    let _ = datacenter.running_vm(n1, 2);
    let _ = datacenter.running_vm(n2, 2);
    let _ = datacenter.running_vm(n3, 2);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Offline(set([n1]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 and n3 can take one VM each");
    assert_eq!(3, plan.size());
    assert!(plan.check_overlaps().is_none());
    check_capacities(&plan, CPU);
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(0, reached.mapping().hosted_vms(n1).count());
    assert_eq!(2, reached.mapping().running_vms_on(n2).count());
    assert_eq!(2, reached.mapping().running_vms_on(n3).count());
}

#[test]
fn a_node_is_booted_to_host_a_new_vm() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 2);
    let n1 = datacenter.nodes[0];
    let _ = datacenter.running_vm(n1, 2);
    let n2 = datacenter.offline_node();
    let vm = datacenter.ready_vm(1);
    let instance = Instance::new(datacenter.into_model(), vec![SatConstraint::Running(set([vm]))])
        .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n2 can be booted");
    let actions = plan.actions();
    assert_eq!(2, actions.len());
    assert_eq!(Operation::BootNode { node: n2 }, actions[0].operation);
    assert_eq!(Operation::BootVm { vm, node: n2 }, actions[1].operation);
    assert!(actions[1].start >= actions[0].end);
    check_capacities(&plan, CPU);
}

#[test]
fn a_sleeping_vm_resumes_on_its_host() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let n1 = datacenter.nodes[0];
    let vm = datacenter.sleeping_vm(n1);
    let instance = Instance::new(datacenter.into_model(), vec![SatConstraint::Running(set([vm]))]);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("n1 has room");
    assert_eq!(1, plan.size());
    assert_eq!(ActionKind::ResumeVm, plan.actions()[0].kind());
    let reached = plan.apply().expect("the plan is applyable");
    assert_eq!(Some(VmState::Running), reached.vm_state(vm));
}

#[test]
fn repair_mode_only_moves_the_misplaced_vms() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let banned = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n2, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Ban {
            vms: set([banned]),
            nodes: set([n1]),
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default().with_repair(true));

    assert_eq!(1, result.statistics.num_managed_vms);
    let plan = result.plan.expect("n2 has room");
    assert_eq!(1, plan.size());
    assert_eq!(Some(banned), plan.actions()[0].vm());
}

#[test]
fn an_overloaded_datacenter_has_no_plan() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 2);
    let n1 = datacenter.nodes[0];
    let _ = datacenter.running_vm(n1, 2);
    let vm = datacenter.ready_vm(1);
    let instance = Instance::new(datacenter.into_model(), vec![SatConstraint::Running(set([vm]))]);

    let result = solve(&instance, Parameters::default());

    assert!(result.plan.is_none());
    assert!(result.is_infeasible());
}

#[test]
fn an_exhausted_budget_is_not_infeasibility() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let vm = datacenter.ready_vm(1);
    let instance = Instance::new(datacenter.into_model(), vec![SatConstraint::Running(set([vm]))]);

    let result = solve(&instance, Parameters::default().with_node_limit(0));

    assert!(result.plan.is_none());
    assert!(!result.statistics.completed);
    assert!(!result.is_infeasible());
}

#[test]
fn every_improving_plan_is_recorded() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let n1 = datacenter.nodes[0];
    let _ = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n1, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Offline(set([n1]))],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    assert!(result.plan.is_some());
    assert!(result.statistics.completed);
    let costs = result
        .statistics
        .solutions
        .iter()
        .map(|solution| solution.objective.expect("optimising"))
        .collect::<Vec<_>>();
    assert!(!costs.is_empty());
    assert!(costs.windows(2).all(|pair| pair[1] < pair[0]));
}

#[test]
fn a_vm_grows_in_place_when_its_node_has_room_for_the_difference() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 4);
    let n1 = datacenter.nodes[0];
    let vm = datacenter.running_vm(n1, 2);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Preserve {
            vms: set([vm]),
            resource: CPU.to_owned(),
            amount: 3,
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default());

    let plan = result.plan.expect("4 CPUs hold the grown VM");
    assert_eq!(1, plan.size());
    assert_eq!(ActionKind::Allocate, plan.actions()[0].kind());
    check_plan(&plan, CPU);
    let reached = plan.apply().expect("the plan is applyable");
    let cpu = reached.resource(CPU).expect("the resource is kept");
    assert_eq!(3, cpu.consumption(vm));
    assert_eq!(Some(n1), reached.mapping().vm_location(vm));
}

#[test]
fn a_vm_cannot_grow_beyond_the_capacity_of_its_only_node() {
    init_logging();
    let mut datacenter = Datacenter::new(1, 4);
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

    assert!(result.is_infeasible());
}

#[test]
fn repairing_a_satisfied_instance_changes_nothing() {
    init_logging();
    let mut datacenter = Datacenter::new(2, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let first = datacenter.running_vm(n1, 1);
    let second = datacenter.running_vm(n2, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![
            SatConstraint::Ban {
                vms: set([first]),
                nodes: set([n2]),
            },
            SatConstraint::Spread(set([first, second])),
        ],
    )
    .with_objective(OptConstraint::MinMttr);

    let result = solve(&instance, Parameters::default().with_repair(true));

    assert_eq!(0, result.statistics.num_managed_vms);
    assert_eq!(0, result.plan.expect("nothing to fix").size());
    assert!(result.statistics.completed);
}

#[test]
fn repair_mode_searches_less_than_the_full_problem() {
    init_logging();
    let mut datacenter = Datacenter::new(3, 4);
    let (n1, n2) = (datacenter.nodes[0], datacenter.nodes[1]);
    let banned = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n1, 1);
    let _ = datacenter.running_vm(n2, 1);
    let instance = Instance::new(
        datacenter.into_model(),
        vec![SatConstraint::Ban {
            vms: set([banned]),
            nodes: set([n1]),
        }],
    )
    .with_objective(OptConstraint::MinMttr);

    let full = solve(&instance, Parameters::default());
    let repaired = solve(&instance, Parameters::default().with_repair(true));

    assert!(full.statistics.completed);
    assert!(repaired.statistics.completed);
    assert_eq!(4, full.statistics.num_managed_vms);
    assert_eq!(1, repaired.statistics.num_managed_vms);
    assert!(repaired.statistics.num_search_nodes <= full.statistics.num_search_nodes);
    assert_eq!(
        full.plan.expect("a VM can leave n1").size(),
        repaired.plan.expect("the banned VM can leave n1").size()
    );
}

fn unsolved_boot() -> Instance {
    let mut datacenter = Datacenter::new(2, 4);
    let vm = datacenter.ready_vm(1);
    Instance::new(datacenter.into_model(), vec![SatConstraint::Running(set([vm]))])
}

#[test]
fn an_exhausted_backtrack_budget_is_not_infeasibility() {
    init_logging();

    let result = solve(&unsolved_boot(), Parameters::default().with_backtrack_limit(0));

    assert!(result.plan.is_none());
    assert!(!result.statistics.completed);
    assert!(!result.is_infeasible());
}

#[test]
fn an_expired_time_limit_is_not_infeasibility() {
    init_logging();

    let result = solve(
        &unsolved_boot(),
        Parameters::default().with_time_limit(Duration::from_nanos(1)),
    );

    assert!(result.plan.is_none());
    assert!(!result.statistics.completed);
    assert!(!result.is_infeasible());
}

fn solved_plan(instance: Instance) -> ReconfigurationPlan {
    let result = solve(&instance.with_objective(OptConstraint::MinMttr), Parameters::default());
    assert!(result.statistics.completed);
    result.plan.expect("the instance has a plan")
}

#[test]
fn computed_plans_apply_without_overlaps_or_overloads() {
    init_logging();

    let mut emptied = Datacenter::new(3, 4);
    let n1 = emptied.nodes[0];
    let _ = emptied.running_vm(n1, 2);
    let _ = emptied.running_vm(n1, 2);
    let emptied = Instance::new(emptied.into_model(), vec![SatConstraint::Offline(set([n1]))]);

    let mut crowded = Datacenter::new(2, 4);
    let n1 = crowded.nodes[0];
    let growing = crowded.running_vm(n1, 2);
    let _ = crowded.running_vm(n1, 2);
    let crowded = Instance::new(
        crowded.into_model(),
        vec![SatConstraint::Preserve {
            vms: set([growing]),
            resource: CPU.to_owned(),
            amount: 3,
        }],
    );

    let mut mixed = Datacenter::new(2, 2);
    let n1 = mixed.nodes[0];
    let suspended = mixed.running_vm(n1, 1);
    let killed = mixed.running_vm(n1, 1);
    let booted = mixed.ready_vm(2);
    let mixed = Instance::new(
        mixed.into_model(),
        vec![
            SatConstraint::Sleeping(set([suspended])),
            SatConstraint::Killed(set([killed])),
            SatConstraint::Running(set([booted])),
        ],
    );

    let mut spread = Datacenter::new(3, 2);
    let (n1, n2) = (spread.nodes[0], spread.nodes[1]);
    let first = spread.running_vm(n1, 1);
    let second = spread.running_vm(n1, 1);
    let third = spread.running_vm(n2, 2);
    let spread = Instance::new(
        spread.into_model(),
        vec![SatConstraint::Spread(set([first, second, third]))],
    );

    for instance in [emptied, crowded, mixed, spread] {
        let plan = solved_plan(instance);
        check_plan(&plan, CPU);
    }
}
