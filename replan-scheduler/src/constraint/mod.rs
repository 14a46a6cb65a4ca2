//! The constraints of an instance and their translation into the reconfiguration problem.
//!
//! A [`SatConstraint`] states a requirement over the VMs and the nodes; the [`ConstraintMapper`]
//! knows, for every [`ConstraintKind`], how to inject it into a
//! [`crate::problem::ReconfigurationProblem`]. Every constraint also reports the VMs which
//! currently violate it, which are the only VMs allowed to move in repair mode.
mod capacity;
mod mapper;
mod min_mttr;
mod placement;
mod state;
mod worst_fit;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use enum_map::Enum;
pub use mapper::ConstraintMapper;
pub use mapper::ObjectiveInjector;
pub use mapper::SatisfactionInjector;
pub use worst_fit::WorstFit;

use crate::model::Model;
use crate::model::Node;
use crate::model::ResourceView;
use crate::model::Vm;
use crate::model::VmState;

/// A requirement over the VMs and the nodes, which the plan satisfies at its end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SatConstraint {
    /// The VMs are running.
    Running(BTreeSet<Vm>),
    /// The VMs are ready: declared but not hosted.
    Ready(BTreeSet<Vm>),
    /// The VMs are sleeping on their current host.
    Sleeping(BTreeSet<Vm>),
    /// The VMs are killed.
    Killed(BTreeSet<Vm>),
    /// The nodes are online.
    Online(BTreeSet<Node>),
    /// The nodes are offline, and host no VM.
    Offline(BTreeSet<Node>),
    /// The running VMs are hosted on some of the nodes.
    Fence {
        vms: BTreeSet<Vm>,
        nodes: BTreeSet<Node>,
    },
    /// The running VMs are not hosted on any of the nodes.
    Ban {
        vms: BTreeSet<Vm>,
        nodes: BTreeSet<Node>,
    },
    /// The running VMs do not change host.
    Root(BTreeSet<Vm>),
    /// The running VMs are hosted on distinct nodes.
    Spread(BTreeSet<Vm>),
    /// The running VMs share a single node.
    Gather(BTreeSet<Vm>),
    /// The running VMs do not share their nodes with other VMs.
    Lonely(BTreeSet<Vm>),
    /// The running VMs are hosted within one of the groups of nodes. The groups are disjoint.
    Among {
        vms: BTreeSet<Vm>,
        groups: Vec<BTreeSet<Node>>,
    },
    /// The running VMs of distinct groups do not share nodes.
    Split(Vec<BTreeSet<Vm>>),
    /// The VMs on the nodes stay there and no other VM arrives.
    Quarantine(BTreeSet<Node>),
    /// At most `amount` of the nodes are online.
    MaxOnline {
        nodes: BTreeSet<Node>,
        amount: i32,
    },
    /// At most `amount` VMs run on the nodes altogether.
    RunningCapacity {
        nodes: BTreeSet<Node>,
        amount: i32,
    },
    /// The VMs running on the nodes consume at most `amount` of the resource altogether.
    ResourceCapacity {
        resource: String,
        nodes: BTreeSet<Node>,
        amount: i32,
    },
    /// At least `amount` of the resource is reserved for each of the VMs.
    Preserve {
        vms: BTreeSet<Vm>,
        resource: String,
        amount: i32,
    },
}

/// The kinds of [`SatConstraint`], used as keys of the [`ConstraintMapper`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum ConstraintKind {
    Running,
    Ready,
    Sleeping,
    Killed,
    Online,
    Offline,
    Fence,
    Ban,
    Root,
    Spread,
    Gather,
    Lonely,
    Among,
    Split,
    Quarantine,
    MaxOnline,
    RunningCapacity,
    ResourceCapacity,
    Preserve,
}

/// What the plan optimises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptConstraint {
    /// Minimises the sum of the ends of the actions; the mean time to repair.
    #[default]
    MinMttr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum ObjectiveKind {
    MinMttr,
}

impl OptConstraint {
    pub fn kind(&self) -> ObjectiveKind {
        match self {
            OptConstraint::MinMttr => ObjectiveKind::MinMttr,
        }
    }

    /// The objective alone does not ask any VM to move.
    pub fn misplaced_vms(&self, _model: &Model) -> BTreeSet<Vm> {
        BTreeSet::new()
    }
}

impl SatConstraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            SatConstraint::Running(_) => ConstraintKind::Running,
            SatConstraint::Ready(_) => ConstraintKind::Ready,
            SatConstraint::Sleeping(_) => ConstraintKind::Sleeping,
            SatConstraint::Killed(_) => ConstraintKind::Killed,
            SatConstraint::Online(_) => ConstraintKind::Online,
            SatConstraint::Offline(_) => ConstraintKind::Offline,
            SatConstraint::Fence { .. } => ConstraintKind::Fence,
            SatConstraint::Ban { .. } => ConstraintKind::Ban,
            SatConstraint::Root(_) => ConstraintKind::Root,
            SatConstraint::Spread(_) => ConstraintKind::Spread,
            SatConstraint::Gather(_) => ConstraintKind::Gather,
            SatConstraint::Lonely(_) => ConstraintKind::Lonely,
            SatConstraint::Among { .. } => ConstraintKind::Among,
            SatConstraint::Split(_) => ConstraintKind::Split,
            SatConstraint::Quarantine(_) => ConstraintKind::Quarantine,
            SatConstraint::MaxOnline { .. } => ConstraintKind::MaxOnline,
            SatConstraint::RunningCapacity { .. } => ConstraintKind::RunningCapacity,
            SatConstraint::ResourceCapacity { .. } => ConstraintKind::ResourceCapacity,
            SatConstraint::Preserve { .. } => ConstraintKind::Preserve,
        }
    }

    /// The VMs the constraint is about.
    pub fn involved_vms(&self) -> BTreeSet<Vm> {
        match self {
            SatConstraint::Running(vms)
            | SatConstraint::Ready(vms)
            | SatConstraint::Sleeping(vms)
            | SatConstraint::Killed(vms)
            | SatConstraint::Root(vms)
            | SatConstraint::Spread(vms)
            | SatConstraint::Gather(vms)
            | SatConstraint::Lonely(vms)
            | SatConstraint::Fence { vms, .. }
            | SatConstraint::Ban { vms, .. }
            | SatConstraint::Among { vms, .. }
            | SatConstraint::Preserve { vms, .. } => vms.clone(),
            SatConstraint::Split(groups) => groups.iter().flatten().copied().collect(),
            SatConstraint::Online(_)
            | SatConstraint::Offline(_)
            | SatConstraint::Quarantine(_)
            | SatConstraint::MaxOnline { .. }
            | SatConstraint::RunningCapacity { .. }
            | SatConstraint::ResourceCapacity { .. } => BTreeSet::new(),
        }
    }

    /// The nodes the constraint is about.
    pub fn involved_nodes(&self) -> BTreeSet<Node> {
        match self {
            SatConstraint::Online(nodes)
            | SatConstraint::Offline(nodes)
            | SatConstraint::Quarantine(nodes)
            | SatConstraint::Fence { nodes, .. }
            | SatConstraint::Ban { nodes, .. }
            | SatConstraint::MaxOnline { nodes, .. }
            | SatConstraint::RunningCapacity { nodes, .. }
            | SatConstraint::ResourceCapacity { nodes, .. } => nodes.clone(),
            SatConstraint::Among { groups, .. } => groups.iter().flatten().copied().collect(),
            SatConstraint::Running(_)
            | SatConstraint::Ready(_)
            | SatConstraint::Sleeping(_)
            | SatConstraint::Killed(_)
            | SatConstraint::Root(_)
            | SatConstraint::Spread(_)
            | SatConstraint::Gather(_)
            | SatConstraint::Lonely(_)
            | SatConstraint::Split(_)
            | SatConstraint::Preserve { .. } => BTreeSet::new(),
        }
    }

    /// The state the constraint requests for its VMs, if it is a state constraint.
    pub fn requested_state(&self) -> Option<(VmState, &BTreeSet<Vm>)> {
        match self {
            SatConstraint::Running(vms) => Some((VmState::Running, vms)),
            SatConstraint::Ready(vms) => Some((VmState::Ready, vms)),
            SatConstraint::Sleeping(vms) => Some((VmState::Sleeping, vms)),
            SatConstraint::Killed(vms) => Some((VmState::Killed, vms)),
            _ => None,
        }
    }

    /// The VMs which violate the constraint in `model`.
    pub fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        let mapping = model.mapping();
        let running = |vms: &BTreeSet<Vm>| {
            vms.iter()
                .copied()
                .filter(|&vm| model.vm_state(vm) == Some(VmState::Running))
                .collect::<Vec<_>>()
        };

        match self {
            SatConstraint::Running(_)
            | SatConstraint::Ready(_)
            | SatConstraint::Sleeping(_)
            | SatConstraint::Killed(_) => {
                let Some((state, vms)) = self.requested_state() else {
                    return BTreeSet::new();
                };
                vms.iter()
                    .copied()
                    .filter(|&vm| model.vm_state(vm) != Some(state))
                    .collect()
            }
            SatConstraint::Offline(nodes) => nodes
                .iter()
                .flat_map(|&node| mapping.hosted_vms(node))
                .collect(),
            SatConstraint::Fence { vms, nodes } => running(vms)
                .into_iter()
                .filter(|&vm| mapping.vm_location(vm).is_some_and(|n| !nodes.contains(&n)))
                .collect(),
            SatConstraint::Ban { vms, nodes } => running(vms)
                .into_iter()
                .filter(|&vm| mapping.vm_location(vm).is_some_and(|n| nodes.contains(&n)))
                .collect(),
            SatConstraint::Spread(vms) => {
                let hosts = hosts_of(model, running(vms));
                hosts
                    .into_values()
                    .filter(|shared| shared.len() > 1)
                    .flatten()
                    .collect()
            }
            SatConstraint::Gather(vms) => {
                let running = running(vms);
                if hosts_of(model, running.iter().copied()).len() > 1 {
                    running.into_iter().collect()
                } else {
                    BTreeSet::new()
                }
            }
            SatConstraint::Lonely(vms) => hosts_of(model, running(vms))
                .into_keys()
                .filter(|&node| mapping.running_vms_on(node).any(|vm| !vms.contains(&vm)))
                .flat_map(|node| mapping.running_vms_on(node))
                .collect(),
            SatConstraint::Among { vms, groups } => {
                let running = running(vms);
                let used_groups = running
                    .iter()
                    .filter_map(|&vm| mapping.vm_location(vm))
                    .map(|node| groups.iter().position(|group| group.contains(&node)))
                    .collect::<BTreeSet<_>>();
                if used_groups.len() > 1 || used_groups.contains(&None) {
                    running.into_iter().collect()
                } else {
                    BTreeSet::new()
                }
            }
            SatConstraint::Split(groups) => {
                let mut misplaced = BTreeSet::new();
                for node in model.nodes() {
                    let on_node = mapping.running_vms_on(node).collect::<BTreeSet<_>>();
                    let sharing = groups
                        .iter()
                        .filter(|group| !group.is_disjoint(&on_node))
                        .collect::<Vec<_>>();
                    if sharing.len() > 1 {
                        misplaced.extend(sharing.into_iter().flat_map(|g| g & &on_node));
                    }
                }
                misplaced
            }
            SatConstraint::RunningCapacity { nodes, amount } => {
                let hosted = running_on(model, nodes);
                if hosted.len() as i64 > i64::from(*amount) {
                    hosted
                } else {
                    BTreeSet::new()
                }
            }
            SatConstraint::ResourceCapacity {
                resource,
                nodes,
                amount,
            } => {
                let hosted = running_on(model, nodes);
                let Some(view) = model.resource(resource) else {
                    return BTreeSet::new();
                };
                if view.sum_consumptions(hosted.iter().copied()) > i64::from(*amount) {
                    hosted
                } else {
                    BTreeSet::new()
                }
            }
            SatConstraint::Preserve {
                vms,
                resource,
                amount,
            } => {
                let Some(view) = model.resource(resource) else {
                    return BTreeSet::new();
                };
                running(vms)
                    .into_iter()
                    .filter(|&vm| view.consumption(vm) < *amount)
                    .collect()
            }
            SatConstraint::Online(_)
            | SatConstraint::Root(_)
            | SatConstraint::Quarantine(_)
            | SatConstraint::MaxOnline { .. } => BTreeSet::new(),
        }
    }
}

fn hosts_of(model: &Model, vms: impl IntoIterator<Item = Vm>) -> BTreeMap<Node, Vec<Vm>> {
    let mut hosts: BTreeMap<Node, Vec<Vm>> = BTreeMap::new();
    for vm in vms {
        if let Some(node) = model.mapping().vm_location(vm) {
            hosts.entry(node).or_default().push(vm);
        }
    }
    hosts
}

fn running_on(model: &Model, nodes: &BTreeSet<Node>) -> BTreeSet<Vm> {
    nodes
        .iter()
        .flat_map(|&node| model.mapping().running_vms_on(node))
        .collect()
}
