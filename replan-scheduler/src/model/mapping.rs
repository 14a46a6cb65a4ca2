use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::Node;
use super::NodeState;
use super::Vm;
use super::VmState;

/// The state of every node, and the state and location of every instantiated VM.
///
/// A VM which is running or sleeping is hosted by an online node. A VM which is in none of the
/// sets of the mapping is either declared but not instantiated, or killed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    online: BTreeSet<Node>,
    offline: BTreeSet<Node>,
    ready: BTreeSet<Vm>,
    running: BTreeMap<Vm, Node>,
    sleeping: BTreeMap<Vm, Node>,
}

impl Mapping {
    pub fn add_online_node(&mut self, node: Node) {
        let _ = self.offline.remove(&node);
        let _ = self.online.insert(node);
    }

    /// Sets `node` offline. Fails if the node still hosts a VM.
    pub fn add_offline_node(&mut self, node: Node) -> bool {
        if self.hosted_vms(node).next().is_some() {
            return false;
        }

        let _ = self.online.remove(&node);
        let _ = self.offline.insert(node);
        true
    }

    pub fn add_ready_vm(&mut self, vm: Vm) {
        self.remove_vm(vm);
        let _ = self.ready.insert(vm);
    }

    /// Runs `vm` on `node`. Fails if the node is not online.
    pub fn add_running_vm(&mut self, vm: Vm, node: Node) -> bool {
        if !self.online.contains(&node) {
            return false;
        }

        self.remove_vm(vm);
        let _ = self.running.insert(vm, node);
        true
    }

    /// Puts `vm` to sleep on `node`. Fails if the node is not online.
    pub fn add_sleeping_vm(&mut self, vm: Vm, node: Node) -> bool {
        if !self.online.contains(&node) {
            return false;
        }

        self.remove_vm(vm);
        let _ = self.sleeping.insert(vm, node);
        true
    }

    /// Removes `vm` from the mapping.
    pub fn remove_vm(&mut self, vm: Vm) {
        let _ = self.ready.remove(&vm);
        let _ = self.running.remove(&vm);
        let _ = self.sleeping.remove(&vm);
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.online.contains(&node) || self.offline.contains(&node)
    }

    pub fn node_state(&self, node: Node) -> Option<NodeState> {
        if self.online.contains(&node) {
            Some(NodeState::Online)
        } else if self.offline.contains(&node) {
            Some(NodeState::Offline)
        } else {
            None
        }
    }

    /// The state of `vm`, or [`None`] if it is not in the mapping.
    pub fn vm_state(&self, vm: Vm) -> Option<VmState> {
        if self.ready.contains(&vm) {
            Some(VmState::Ready)
        } else if self.running.contains_key(&vm) {
            Some(VmState::Running)
        } else if self.sleeping.contains_key(&vm) {
            Some(VmState::Sleeping)
        } else {
            None
        }
    }

    /// The node hosting `vm` if it is running or sleeping.
    pub fn vm_location(&self, vm: Vm) -> Option<Node> {
        self.running
            .get(&vm)
            .or_else(|| self.sleeping.get(&vm))
            .copied()
    }

    pub fn online_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.online.iter().copied()
    }

    pub fn offline_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.offline.iter().copied()
    }

    /// All nodes; online nodes first.
    pub fn all_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.online_nodes().chain(self.offline_nodes())
    }

    pub fn ready_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.ready.iter().copied()
    }

    pub fn running_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.running.keys().copied()
    }

    pub fn sleeping_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.sleeping.keys().copied()
    }

    /// The VMs running on `node`.
    pub fn running_vms_on(&self, node: Node) -> impl Iterator<Item = Vm> + '_ {
        self.running
            .iter()
            .filter(move |(_, &host)| host == node)
            .map(|(&vm, _)| vm)
    }

    /// The VMs running or sleeping on `node`.
    pub fn hosted_vms(&self, node: Node) -> impl Iterator<Item = Vm> + '_ {
        self.running
            .iter()
            .chain(self.sleeping.iter())
            .filter(move |(_, &host)| host == node)
            .map(|(&vm, _)| vm)
    }

    pub fn num_nodes(&self) -> usize {
        self.online.len() + self.offline.len()
    }
}
