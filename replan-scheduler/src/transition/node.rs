use replan_core::constraints;
use replan_core::variables::DomainId;
use replan_core::variables::Literal;
use replan_core::variables::TransformableVariable;

use super::TransitionContext;
use crate::error::SchedulerError;
use crate::model::Node;
use crate::model::NodeState;
use crate::plan::ActionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeTransitionKind {
    /// The node is offline and may boot.
    Bootable,
    /// The node is online and may shut down.
    Shutdownable,
}

/// The action model of a node.
///
/// `state` is true when the node is online at the end of the plan; the action only lasts when
/// the state changes.
#[derive(Clone, Debug)]
pub struct NodeTransition {
    pub(crate) node: Node,
    pub(crate) kind: NodeTransitionKind,
    pub(crate) state: Literal,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    pub(crate) duration: DomainId,
    /// The moment from which the node may host VMs.
    pub(crate) hosting_start: DomainId,
}

impl NodeTransition {
    pub(crate) fn new(
        context: &mut TransitionContext<'_>,
        node: Node,
    ) -> Result<NodeTransition, SchedulerError> {
        let kind = match context.model.mapping().node_state(node) {
            Some(NodeState::Online) => NodeTransitionKind::Shutdownable,
            Some(NodeState::Offline) => NodeTransitionKind::Bootable,
            None => return Err(SchedulerError::UnknownNode(node)),
        };

        let horizon = context.horizon;
        let state = context.literal(|| format!("{node}.state"));
        let start = context.interval(0, horizon, || format!("{node}.start"));
        let end = context.interval(0, horizon, || format!("{node}.end"));

        let state_value = state.get_integer_variable();
        let (duration, hosting_start) = match kind {
            NodeTransitionKind::Shutdownable => {
                let action = context.duration(ActionKind::ShutdownNode, node)?;
                let duration = context.interval(0, action, || format!("{node}.duration"));
                // Lasts `action` when the node goes offline, nothing otherwise.
                context.post(constraints::equals(
                    [duration.scaled(1), state_value.scaled(action)],
                    action,
                ));
                (duration, context.zero)
            }
            NodeTransitionKind::Bootable => {
                let action = context.duration(ActionKind::BootNode, node)?;
                let duration = context.interval(0, action, || format!("{node}.duration"));
                context.post(constraints::equals(
                    [duration.scaled(1), state_value.scaled(-action)],
                    0,
                ));
                (duration, end)
            }
        };
        context.post(constraints::plus(start, duration, end));

        Ok(NodeTransition {
            node,
            kind,
            state,
            start,
            end,
            duration,
            hosting_start,
        })
    }

    pub fn node(&self) -> Node {
        self.node
    }

    pub fn kind(&self) -> NodeTransitionKind {
        self.kind
    }

    /// True when the node is online at the end of the plan.
    pub fn state(&self) -> Literal {
        self.state
    }

    pub fn start(&self) -> DomainId {
        self.start
    }

    pub fn end(&self) -> DomainId {
        self.end
    }

    pub fn duration(&self) -> DomainId {
        self.duration
    }

    pub fn hosting_start(&self) -> DomainId {
        self.hosting_start
    }

    pub fn source_state(&self) -> NodeState {
        match self.kind {
            NodeTransitionKind::Bootable => NodeState::Offline,
            NodeTransitionKind::Shutdownable => NodeState::Online,
        }
    }
}
