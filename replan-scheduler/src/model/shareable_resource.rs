use std::collections::BTreeMap;

use super::Node;
use super::Vm;

/// A view exposing one resource dimension: the capacity of each node and the consumption of
/// each VM.
pub trait ResourceView {
    /// The identifier of the resource dimension, e.g. `"cpu"`.
    fn name(&self) -> &str;

    fn capacity(&self, node: Node) -> i32;

    fn consumption(&self, vm: Vm) -> i32;

    /// The total consumption of `vms`.
    fn sum_consumptions(&self, vms: impl IntoIterator<Item = Vm>) -> i64
    where
        Self: Sized,
    {
        vms.into_iter()
            .map(|vm| i64::from(self.consumption(vm)))
            .sum()
    }
}

/// A [`ResourceView`] with explicit values and defaults for the elements without one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareableResource {
    name: String,
    default_capacity: i32,
    default_consumption: i32,
    capacities: BTreeMap<Node, i32>,
    consumptions: BTreeMap<Vm, i32>,
}

impl ShareableResource {
    pub fn new(name: impl Into<String>) -> ShareableResource {
        ShareableResource::with_defaults(name, 0, 0)
    }

    pub fn with_defaults(
        name: impl Into<String>,
        default_capacity: i32,
        default_consumption: i32,
    ) -> ShareableResource {
        ShareableResource {
            name: name.into(),
            default_capacity,
            default_consumption,
            capacities: BTreeMap::default(),
            consumptions: BTreeMap::default(),
        }
    }

    pub fn set_capacity(&mut self, node: Node, capacity: i32) -> &mut Self {
        let _ = self.capacities.insert(node, capacity);
        self
    }

    pub fn set_consumption(&mut self, vm: Vm, consumption: i32) -> &mut Self {
        let _ = self.consumptions.insert(vm, consumption);
        self
    }

    /// Whether `vm` has an explicit consumption.
    pub fn defines_consumption(&self, vm: Vm) -> bool {
        self.consumptions.contains_key(&vm)
    }
}

impl ResourceView for ShareableResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn capacity(&self, node: Node) -> i32 {
        self.capacities
            .get(&node)
            .copied()
            .unwrap_or(self.default_capacity)
    }

    fn consumption(&self, vm: Vm) -> i32 {
        self.consumptions
            .get(&vm)
            .copied()
            .unwrap_or(self.default_consumption)
    }
}
