use thiserror::Error;

use crate::constraint::ConstraintKind;
use crate::constraint::ObjectiveKind;
use crate::model::Element;
use crate::model::Node;
use crate::model::NodeState;
use crate::model::Vm;
use crate::model::VmState;
use crate::plan::ActionKind;

/// The errors which prevent a reconfiguration problem from being solved.
///
/// A problem which is well-formed but has no solution is not an error; see
/// [`crate::SolveResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("unknown VM '{0}'")]
    UnknownVm(Vm),
    #[error("unknown node '{0}'")]
    UnknownNode(Node),
    #[error("VM '{vm}' cannot go from {from} to {to}")]
    IllegalTransition { vm: Vm, from: VmState, to: VmState },
    #[error("VM '{vm}' is requested to be both {first} and {second}")]
    ConflictingStateRequest {
        vm: Vm,
        first: VmState,
        second: VmState,
    },
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
    #[error("no duration evaluator for {0:?}")]
    MissingDurationEvaluator(ActionKind),
    #[error("the duration of {kind:?} on '{element}' must be positive, got {duration}")]
    NonPositiveDuration {
        kind: ActionKind,
        element: Element,
        duration: i32,
    },
    #[error("the duration computed for '{0}' does not fit in 32 bits")]
    DurationOverflow(Element),
    #[error("no injector is registered for {0:?} constraints")]
    UnmappedConstraint(ConstraintKind),
    #[error("no injector is registered for the {0:?} objective")]
    UnmappedObjective(ObjectiveKind),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// The reasons a plan cannot be replayed onto a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanApplicationError {
    #[error("{action}: VM '{vm}' is {actual:?}, expected {expected}")]
    UnexpectedVmState {
        action: String,
        vm: Vm,
        expected: VmState,
        actual: Option<VmState>,
    },
    #[error("{action}: VM '{vm}' is not hosted on '{node}'")]
    UnexpectedHost { action: String, vm: Vm, node: Node },
    #[error("{action}: node '{node}' is not {expected}")]
    UnexpectedNodeState {
        action: String,
        node: Node,
        expected: NodeState,
    },
    #[error("{action}: node '{node}' still hosts VMs")]
    NodeNotEmpty { action: String, node: Node },
    #[error("{action}: unknown resource '{resource}'")]
    UnknownResource { action: String, resource: String },
}
