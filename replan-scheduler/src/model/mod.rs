//! The datacenter model: nodes and VMs, their states and placement, their attributes and the
//! resource views over them.
mod attributes;
mod element;
mod mapping;
mod shareable_resource;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

pub use attributes::Attributes;
pub use element::Element;
pub use element::Node;
pub use element::NodeState;
pub use element::Vm;
pub use element::VmState;
pub use mapping::Mapping;
pub use shareable_resource::ResourceView;
pub use shareable_resource::ShareableResource;

/// A snapshot of the datacenter.
///
/// Every VM is declared through [`Model::new_vm`]; a declared VM which is not in the [`Mapping`]
/// is in the [`VmState::Init`] state, unless it was killed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    mapping: Mapping,
    attributes: Attributes,
    resources: BTreeMap<String, ShareableResource>,
    declared_vms: BTreeSet<Vm>,
    killed_vms: BTreeSet<Vm>,
    next_node: u32,
    next_vm: u32,
}

impl Model {
    pub fn new_node(&mut self) -> Node {
        let node = Node(self.next_node);
        self.next_node += 1;
        node
    }

    pub fn new_vm(&mut self) -> Vm {
        let vm = Vm(self.next_vm);
        self.next_vm += 1;
        let _ = self.declared_vms.insert(vm);
        vm
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut Mapping {
        &mut self.mapping
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Attaches a resource view, replacing the view with the same name.
    pub fn attach(&mut self, resource: ShareableResource) {
        let _ = self.resources.insert(resource.name().to_owned(), resource);
    }

    pub fn resource(&self, name: &str) -> Option<&ShareableResource> {
        self.resources.get(name)
    }

    pub fn resource_mut(&mut self, name: &str) -> Option<&mut ShareableResource> {
        self.resources.get_mut(name)
    }

    /// The resource views ordered by name.
    pub fn resources(&self) -> impl Iterator<Item = &ShareableResource> + '_ {
        self.resources.values()
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.mapping.contains_node(node)
    }

    pub fn contains_vm(&self, vm: Vm) -> bool {
        self.declared_vms.contains(&vm)
    }

    /// The declared VMs in increasing order.
    pub fn vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.declared_vms.iter().copied()
    }

    /// The nodes of the mapping; online nodes first.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.mapping.all_nodes()
    }

    pub fn vm_state(&self, vm: Vm) -> Option<VmState> {
        if !self.declared_vms.contains(&vm) {
            return None;
        }

        if self.killed_vms.contains(&vm) {
            return Some(VmState::Killed);
        }

        Some(self.mapping.vm_state(vm).unwrap_or(VmState::Init))
    }

    /// Removes `vm` from the mapping and marks it killed.
    pub fn kill(&mut self, vm: Vm) {
        self.mapping.remove_vm(vm);
        let _ = self.killed_vms.insert(vm);
    }
}
