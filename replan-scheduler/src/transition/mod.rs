//! The action models: one state transition per VM and per node, each exposing the variables
//! which decide when, and for VMs where, the transition happens.
mod node;
mod slice;
mod vm;

pub use node::NodeTransition;
pub use node::NodeTransitionKind;
use replan_core::constraints::Constraint;
use replan_core::predicate;
use replan_core::variables::DomainId;
use replan_core::variables::Literal;
use replan_core::Solver;
pub use slice::Slice;
pub use vm::VmTransition;
pub use vm::VmTransitionKind;

use crate::duration::DurationEvaluators;
use crate::error::SchedulerError;
use crate::model::Element;
use crate::model::Model;
use crate::model::Node;
use crate::plan::ActionKind;

/// What the transitions need from the problem under construction.
pub(crate) struct TransitionContext<'a> {
    pub(crate) solver: &'a mut Solver,
    pub(crate) model: &'a Model,
    pub(crate) durations: &'a DurationEvaluators,
    /// The nodes, the position of a node being the value denoting it in host variables.
    pub(crate) nodes: &'a [Node],
    pub(crate) horizon: i32,
    pub(crate) named: bool,
    pub(crate) zero: DomainId,
    pub(crate) one: DomainId,
    pub(crate) end_of_horizon: DomainId,
}

impl TransitionContext<'_> {
    pub(crate) fn duration(
        &self,
        kind: ActionKind,
        element: impl Into<Element>,
    ) -> Result<i32, SchedulerError> {
        self.durations.evaluate(self.model, kind, element)
    }

    pub(crate) fn node_index(&self, node: Node) -> Result<i32, SchedulerError> {
        self.nodes
            .iter()
            .position(|&candidate| candidate == node)
            .map(|index| index as i32)
            .ok_or(SchedulerError::UnknownNode(node))
    }

    /// A variable in `[lower_bound, upper_bound]`, named when the verbosity asks for it.
    pub(crate) fn interval(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl FnOnce() -> String,
    ) -> DomainId {
        if self.named {
            self.solver
                .new_named_bounded_integer(lower_bound, upper_bound, name())
        } else {
            self.solver.new_bounded_integer(lower_bound, upper_bound)
        }
    }

    pub(crate) fn literal(&mut self, name: impl FnOnce() -> String) -> Literal {
        if self.named {
            self.solver.new_named_literal(name())
        } else {
            self.solver.new_literal()
        }
    }

    /// A host variable which may take any node.
    pub(crate) fn free_host(&mut self, name: impl FnOnce() -> String) -> DomainId {
        if self.nodes.is_empty() {
            let host = self.solver.new_bounded_integer(0, 0);
            if self.solver.post(predicate!(host != 0)).is_err() {
                log::debug!("A VM must be hosted but there is no node");
            }
            return host;
        }

        let values = (0..self.nodes.len() as i32).collect::<Vec<_>>();
        if self.named {
            self.solver.new_named_sparse_integer(values, name())
        } else {
            self.solver.new_sparse_integer(values)
        }
    }

    /// A host variable fixed to `node`.
    pub(crate) fn pinned_host(&mut self, node: Node) -> Result<DomainId, SchedulerError> {
        let index = self.node_index(node)?;
        Ok(self.solver.new_sparse_integer(vec![index]))
    }

    pub(crate) fn post(&mut self, constraint: impl Constraint) {
        post(self.solver, constraint);
    }

    /// Posts `literal -> constraint`.
    pub(crate) fn post_implied(&mut self, constraint: impl Constraint, literal: Literal) {
        if self
            .solver
            .add_constraint(constraint)
            .implied_by(literal)
            .is_err()
        {
            log::debug!("The problem became infeasible while posting a constraint");
        }
    }
}

/// Posts `constraint`. A contradiction leaves the solver infeasible, which is reported once the
/// problem is built.
pub(crate) fn post(solver: &mut Solver, constraint: impl Constraint) {
    if solver.add_constraint(constraint).post().is_err() {
        log::debug!("The problem became infeasible while posting a constraint");
    }
}
