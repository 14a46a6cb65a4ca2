use std::fmt::Display;
use std::fmt::Formatter;

/// A physical node of the datacenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node(pub u32);

/// A virtual machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vm(pub u32);

/// Either kind of element of a [`crate::model::Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Node(Node),
    Vm(Vm),
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl Display for Vm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "vm{}", self.0)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Node(node) => node.fmt(f),
            Element::Vm(vm) => vm.fmt(f),
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Vm> for Element {
    fn from(vm: Vm) -> Self {
        Element::Vm(vm)
    }
}

/// The state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    Online,
    Offline,
}

/// The state of a VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VmState {
    /// Declared, but not yet instantiated.
    Init,
    /// Instantiated and ready to be booted; not hosted.
    Ready,
    Running,
    Sleeping,
    Killed,
}

impl Display for NodeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Online => write!(f, "online"),
            NodeState::Offline => write!(f, "offline"),
        }
    }
}

impl Display for VmState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VmState::Init => write!(f, "init"),
            VmState::Ready => write!(f, "ready"),
            VmState::Running => write!(f, "running"),
            VmState::Sleeping => write!(f, "sleeping"),
            VmState::Killed => write!(f, "killed"),
        }
    }
}
