#![allow(dead_code, reason = "every test file uses a different subset of the helpers")]
use std::collections::BTreeSet;

use replan_scheduler::model::Model;
use replan_scheduler::model::Node;
use replan_scheduler::model::ResourceView;
use replan_scheduler::model::ShareableResource;
use replan_scheduler::model::Vm;
use replan_scheduler::plan::Action;
use replan_scheduler::plan::Operation;
use replan_scheduler::plan::ReconfigurationPlan;
use replan_scheduler::Instance;
use replan_scheduler::Parameters;
use replan_scheduler::ReconfigurationScheduler;
use replan_scheduler::SolveResult;

pub(crate) const CPU: &str = "cpu";

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A datacenter of online nodes offering `capacity` CPUs each; every VM consumes one CPU unless
/// stated otherwise.
pub(crate) struct Datacenter {
    pub(crate) model: Model,
    pub(crate) nodes: Vec<Node>,
    cpu: ShareableResource,
}

impl Datacenter {
    pub(crate) fn new(num_nodes: usize, capacity: i32) -> Datacenter {
        let mut model = Model::default();
        let nodes = (0..num_nodes)
            .map(|_| {
                let node = model.new_node();
                model.mapping_mut().add_online_node(node);
                node
            })
            .collect();
        Datacenter {
            model,
            nodes,
            cpu: ShareableResource::with_defaults(CPU, capacity, 1),
        }
    }

    pub(crate) fn offline_node(&mut self) -> Node {
        let node = self.model.new_node();
        assert!(self.model.mapping_mut().add_offline_node(node));
        self.nodes.push(node);
        node
    }

    pub(crate) fn running_vm(&mut self, host: Node, cpu: i32) -> Vm {
        let vm = self.model.new_vm();
        assert!(self.model.mapping_mut().add_running_vm(vm, host));
        let _ = self.cpu.set_consumption(vm, cpu);
        vm
    }

    pub(crate) fn ready_vm(&mut self, cpu: i32) -> Vm {
        let vm = self.model.new_vm();
        self.model.mapping_mut().add_ready_vm(vm);
        let _ = self.cpu.set_consumption(vm, cpu);
        vm
    }

    pub(crate) fn sleeping_vm(&mut self, host: Node) -> Vm {
        let vm = self.model.new_vm();
        assert!(self.model.mapping_mut().add_sleeping_vm(vm, host));
        vm
    }

    pub(crate) fn into_model(mut self) -> Model {
        self.model.attach(self.cpu);
        self.model
    }
}

pub(crate) fn set<T: Ord>(elements: impl IntoIterator<Item = T>) -> BTreeSet<T> {
    elements.into_iter().collect()
}

pub(crate) fn solve(instance: &Instance, parameters: Parameters) -> SolveResult {
    ReconfigurationScheduler::new(parameters)
        .solve(instance)
        .expect("the instance is well-formed")
}

/// A VM holding `amount` of a resource on `node` during `[from, to)`.
struct Occupation {
    vm: Vm,
    node: Node,
    amount: i32,
    from: i32,
    to: i32,
}

fn amount_after(action: &Action, resource: &str, default: i32) -> i32 {
    let allocated = match &action.operation {
        Operation::Allocate { allocation, .. } => Some(allocation),
        _ => None,
    };
    allocated
        .into_iter()
        .chain(action.post_allocations.iter())
        .filter(|allocation| allocation.resource == resource)
        .map(|allocation| allocation.amount)
        .last()
        .unwrap_or(default)
}

/// Checks that no node holds more of `resource` than its capacity at any moment of the plan,
/// counting a migrating VM on both of its hosts and a resized VM with its larger amount while
/// the allocation changes.
pub(crate) fn check_capacities(plan: &ReconfigurationPlan, resource: &str) {
    let origin = plan.origin();
    let view = origin.resource(resource).expect("the resource is attached");
    let mut occupations = origin
        .mapping()
        .running_vms()
        .filter_map(|vm| {
            Some(Occupation {
                vm,
                node: origin.mapping().vm_location(vm)?,
                amount: view.consumption(vm),
                from: 0,
                to: i32::MAX,
            })
        })
        .collect::<Vec<_>>();

    for action in plan.actions() {
        let Some(vm) = action.vm() else {
            continue;
        };
        let current = occupations
            .iter()
            .rev()
            .find(|occupation| occupation.vm == vm && occupation.to == i32::MAX)
            .map_or(view.consumption(vm), |occupation| occupation.amount);
        let future = amount_after(action, resource, current);
        // A shrinking VM keeps its amount until the end of the change, a growing one takes the
        // new amount from its start.
        let switch = if future > current { action.start } else { action.end };

        let (release, arrival) = match action.operation {
            Operation::MigrateVm { destination, .. } | Operation::ResumeVm { destination, .. } => {
                (Some(action.end), Some((destination, action.start)))
            }
            Operation::BootVm { node, .. } => (None, Some((node, action.start))),
            Operation::Allocate { node, .. } => (Some(switch), Some((node, switch))),
            Operation::ShutdownVm { .. }
            | Operation::SuspendVm { .. }
            | Operation::KillVm { .. } => (Some(action.end), None),
            _ => (None, None),
        };
        if let Some(release) = release {
            for occupation in occupations
                .iter_mut()
                .filter(|occupation| occupation.vm == vm && occupation.to == i32::MAX)
            {
                occupation.to = release;
            }
        }
        if let Some((node, from)) = arrival {
            occupations.push(Occupation {
                vm,
                node,
                amount: future,
                from,
                to: i32::MAX,
            });
        }
    }

    let moments = plan
        .actions()
        .iter()
        .flat_map(|action| [action.start, action.end])
        .chain(std::iter::once(0))
        .collect::<BTreeSet<_>>();
    for moment in moments {
        for node in origin.nodes() {
            let load = occupations
                .iter()
                .filter(|occupation| {
                    occupation.node == node && occupation.from <= moment && moment < occupation.to
                })
                .map(|occupation| occupation.amount)
                .sum::<i32>();
            assert!(
                load <= view.capacity(node),
                "node {node} holds {load} {resource} at {moment}:\n{plan}"
            );
        }
    }
}

/// Checks the properties every computed plan has: it applies to its origin, its actions do not
/// overlap on any element, and `resource` never exceeds a capacity.
pub(crate) fn check_plan(plan: &ReconfigurationPlan, resource: &str) {
    assert!(plan.is_applyable(), "the plan cannot be applied:\n{plan}");
    assert!(plan.check_overlaps().is_none(), "overlapping actions:\n{plan}");
    check_capacities(plan, resource);
}
