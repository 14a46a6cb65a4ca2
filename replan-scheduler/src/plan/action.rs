use std::fmt::Display;
use std::fmt::Formatter;

use enum_map::Enum;

use crate::error::PlanApplicationError;
use crate::model::Model;
use crate::model::Node;
use crate::model::NodeState;
use crate::model::Vm;
use crate::model::VmState;

/// The kinds of actions a plan is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Enum)]
pub enum ActionKind {
    ForgeVm,
    BootVm,
    MigrateVm,
    ShutdownVm,
    SuspendVm,
    ResumeVm,
    KillVm,
    Allocate,
    BootNode,
    ShutdownNode,
}

impl ActionKind {
    /// The attribute which may hold the duration of this kind of action for an element.
    pub fn attribute_key(self) -> &'static str {
        match self {
            ActionKind::ForgeVm => "forge",
            ActionKind::BootVm | ActionKind::BootNode => "boot",
            ActionKind::MigrateVm => "migrate",
            ActionKind::ShutdownVm | ActionKind::ShutdownNode => "shutdown",
            ActionKind::SuspendVm => "suspend",
            ActionKind::ResumeVm => "resume",
            ActionKind::KillVm => "kill",
            ActionKind::Allocate => "allocate",
        }
    }
}

/// A new amount of a resource reserved for a VM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub resource: String,
    pub amount: i32,
}

/// What an [`Action`] does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    ForgeVm {
        vm: Vm,
    },
    BootVm {
        vm: Vm,
        node: Node,
    },
    MigrateVm {
        vm: Vm,
        source: Node,
        destination: Node,
    },
    ShutdownVm {
        vm: Vm,
        node: Node,
    },
    SuspendVm {
        vm: Vm,
        node: Node,
    },
    ResumeVm {
        vm: Vm,
        source: Node,
        destination: Node,
    },
    KillVm {
        vm: Vm,
        host: Option<Node>,
    },
    /// Changes the amount of a resource reserved for a running VM, in place.
    Allocate {
        vm: Vm,
        node: Node,
        allocation: Allocation,
    },
    BootNode {
        node: Node,
    },
    ShutdownNode {
        node: Node,
    },
}

/// An operation executed during `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub start: i32,
    pub end: i32,
    pub operation: Operation,
    /// Allocations which take effect once the operation has completed.
    pub post_allocations: Vec<Allocation>,
}

impl Action {
    pub fn new(start: i32, end: i32, operation: Operation) -> Action {
        Action {
            start,
            end,
            operation,
            post_allocations: vec![],
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self.operation {
            Operation::ForgeVm { .. } => ActionKind::ForgeVm,
            Operation::BootVm { .. } => ActionKind::BootVm,
            Operation::MigrateVm { .. } => ActionKind::MigrateVm,
            Operation::ShutdownVm { .. } => ActionKind::ShutdownVm,
            Operation::SuspendVm { .. } => ActionKind::SuspendVm,
            Operation::ResumeVm { .. } => ActionKind::ResumeVm,
            Operation::KillVm { .. } => ActionKind::KillVm,
            Operation::Allocate { .. } => ActionKind::Allocate,
            Operation::BootNode { .. } => ActionKind::BootNode,
            Operation::ShutdownNode { .. } => ActionKind::ShutdownNode,
        }
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }

    /// The VM this action manipulates, if any.
    pub fn vm(&self) -> Option<Vm> {
        match self.operation {
            Operation::ForgeVm { vm }
            | Operation::BootVm { vm, .. }
            | Operation::MigrateVm { vm, .. }
            | Operation::ShutdownVm { vm, .. }
            | Operation::SuspendVm { vm, .. }
            | Operation::ResumeVm { vm, .. }
            | Operation::KillVm { vm, .. }
            | Operation::Allocate { vm, .. } => Some(vm),
            Operation::BootNode { .. } | Operation::ShutdownNode { .. } => None,
        }
    }

    /// The node whose state this action changes, if any.
    pub fn managed_node(&self) -> Option<Node> {
        match self.operation {
            Operation::BootNode { node } | Operation::ShutdownNode { node } => Some(node),
            _ => None,
        }
    }

    /// The nodes a VM action takes place on.
    pub fn hosting_nodes(&self) -> Vec<Node> {
        match &self.operation {
            Operation::BootVm { node, .. }
            | Operation::ShutdownVm { node, .. }
            | Operation::SuspendVm { node, .. }
            | Operation::Allocate { node, .. } => vec![*node],
            Operation::MigrateVm {
                source,
                destination,
                ..
            }
            | Operation::ResumeVm {
                source,
                destination,
                ..
            } => {
                if source == destination {
                    vec![*source]
                } else {
                    vec![*source, *destination]
                }
            }
            Operation::KillVm { host, .. } => host.iter().copied().collect(),
            Operation::ForgeVm { .. }
            | Operation::BootNode { .. }
            | Operation::ShutdownNode { .. } => vec![],
        }
    }

    /// Whether the two actions are executed simultaneously at some instant.
    pub fn overlaps(&self, other: &Action) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Replays the action onto `model`, checking its preconditions.
    pub fn apply(&self, model: &mut Model) -> Result<(), PlanApplicationError> {
        match self.operation {
            Operation::ForgeVm { vm } => {
                self.expect_vm_state(model, vm, VmState::Init)?;
                model.mapping_mut().add_ready_vm(vm);
            }
            Operation::BootVm { vm, node } => {
                self.expect_vm_state(model, vm, VmState::Ready)?;
                self.expect_node_state(model, node, NodeState::Online)?;
                let _ = model.mapping_mut().add_running_vm(vm, node);
            }
            Operation::MigrateVm {
                vm,
                source,
                destination,
            } => {
                self.expect_vm_state(model, vm, VmState::Running)?;
                self.expect_host(model, vm, source)?;
                self.expect_node_state(model, destination, NodeState::Online)?;
                let _ = model.mapping_mut().add_running_vm(vm, destination);
            }
            Operation::ShutdownVm { vm, node } => {
                self.expect_vm_state(model, vm, VmState::Running)?;
                self.expect_host(model, vm, node)?;
                model.mapping_mut().add_ready_vm(vm);
            }
            Operation::SuspendVm { vm, node } => {
                self.expect_vm_state(model, vm, VmState::Running)?;
                self.expect_host(model, vm, node)?;
                let _ = model.mapping_mut().add_sleeping_vm(vm, node);
            }
            Operation::ResumeVm {
                vm,
                source,
                destination,
            } => {
                self.expect_vm_state(model, vm, VmState::Sleeping)?;
                self.expect_host(model, vm, source)?;
                self.expect_node_state(model, destination, NodeState::Online)?;
                let _ = model.mapping_mut().add_running_vm(vm, destination);
            }
            Operation::KillVm { vm, host } => {
                let state = model.vm_state(vm);
                if matches!(state, None | Some(VmState::Killed)) {
                    return Err(PlanApplicationError::UnexpectedVmState {
                        action: self.to_string(),
                        vm,
                        expected: VmState::Running,
                        actual: state,
                    });
                }
                if let Some(node) = host {
                    self.expect_host(model, vm, node)?;
                }
                model.kill(vm);
            }
            Operation::Allocate {
                vm,
                node,
                ref allocation,
            } => {
                self.expect_vm_state(model, vm, VmState::Running)?;
                self.expect_host(model, vm, node)?;
                self.allocate(model, vm, allocation)?;
            }
            Operation::BootNode { node } => {
                self.expect_node_state(model, node, NodeState::Offline)?;
                model.mapping_mut().add_online_node(node);
            }
            Operation::ShutdownNode { node } => {
                self.expect_node_state(model, node, NodeState::Online)?;
                if !model.mapping_mut().add_offline_node(node) {
                    return Err(PlanApplicationError::NodeNotEmpty {
                        action: self.to_string(),
                        node,
                    });
                }
            }
        }

        if let Some(vm) = self.vm() {
            for allocation in self.post_allocations.iter() {
                self.allocate(model, vm, allocation)?;
            }
        }

        Ok(())
    }

    fn allocate(
        &self,
        model: &mut Model,
        vm: Vm,
        allocation: &Allocation,
    ) -> Result<(), PlanApplicationError> {
        let resource = model.resource_mut(&allocation.resource).ok_or_else(|| {
            PlanApplicationError::UnknownResource {
                action: self.to_string(),
                resource: allocation.resource.clone(),
            }
        })?;
        let _ = resource.set_consumption(vm, allocation.amount);
        Ok(())
    }

    fn expect_vm_state(
        &self,
        model: &Model,
        vm: Vm,
        expected: VmState,
    ) -> Result<(), PlanApplicationError> {
        let actual = model.vm_state(vm);
        if actual == Some(expected) {
            Ok(())
        } else {
            Err(PlanApplicationError::UnexpectedVmState {
                action: self.to_string(),
                vm,
                expected,
                actual,
            })
        }
    }

    fn expect_host(&self, model: &Model, vm: Vm, node: Node) -> Result<(), PlanApplicationError> {
        if model.mapping().vm_location(vm) == Some(node) {
            Ok(())
        } else {
            Err(PlanApplicationError::UnexpectedHost {
                action: self.to_string(),
                vm,
                node,
            })
        }
    }

    fn expect_node_state(
        &self,
        model: &Model,
        node: Node,
        expected: NodeState,
    ) -> Result<(), PlanApplicationError> {
        if model.mapping().node_state(node) == Some(expected) {
            Ok(())
        } else {
            Err(PlanApplicationError::UnexpectedNodeState {
                action: self.to_string(),
                node,
                expected,
            })
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::ForgeVm { vm } => write!(f, "forge({vm})"),
            Operation::BootVm { vm, node } => write!(f, "boot({vm}, on={node})"),
            Operation::MigrateVm {
                vm,
                source,
                destination,
            } => write!(f, "migrate({vm}, from={source}, to={destination})"),
            Operation::ShutdownVm { vm, node } => write!(f, "shutdown({vm}, on={node})"),
            Operation::SuspendVm { vm, node } => write!(f, "suspend({vm}, on={node})"),
            Operation::ResumeVm {
                vm,
                source,
                destination,
            } => write!(f, "resume({vm}, from={source}, to={destination})"),
            Operation::KillVm { vm, host: Some(node) } => write!(f, "kill({vm}, on={node})"),
            Operation::KillVm { vm, host: None } => write!(f, "kill({vm})"),
            Operation::Allocate {
                vm,
                node,
                allocation,
            } => write!(
                f,
                "allocate({vm}, on={node}, {}={})",
                allocation.resource, allocation.amount
            ),
            Operation::BootNode { node } => write!(f, "boot({node})"),
            Operation::ShutdownNode { node } => write!(f, "shutdown({node})"),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {}", self.start, self.end, self.operation)?;
        for allocation in self.post_allocations.iter() {
            write!(f, " then {}={}", allocation.resource, allocation.amount)?;
        }
        Ok(())
    }
}
