//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows setting
//! up specific scenarios under which to test the various operations of a propagator.
use super::State;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;

/// A container for variables and propagators, which can be used to test propagators.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    state: State,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lb: i32, ub: i32) -> DomainId {
        self.state.new_domain(lb, ub)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        self.state.new_sparse_domain(values)
    }

    pub(crate) fn new_literal(&mut self) -> Literal {
        Literal::new(self.new_variable(0, 1))
    }

    /// Adds the propagator and propagates to a fixpoint.
    pub(crate) fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, Inconsistency>
    where
        Constructor: PropagatorConstructor,
    {
        self.state.add_propagator(constructor)
    }

    pub(crate) fn contains<Var: IntegerVariable>(&self, var: Var, value: i32) -> bool {
        var.contains(self.state.assignments(), value)
    }

    pub(crate) fn lower_bound(&self, var: DomainId) -> i32 {
        self.state.assignments().get_lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: DomainId) -> i32 {
        self.state.assignments().get_upper_bound(var)
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lb: i32, ub: i32) {
        let actual_lb = self.lower_bound(var);
        let actual_ub = self.upper_bound(var);

        assert_eq!(
            (lb, ub),
            (actual_lb, actual_ub),
            "expected the bounds [{lb}..{ub}], found [{actual_lb}..{actual_ub}]"
        );
    }

    pub(crate) fn is_literal_true(&self, literal: Literal) -> bool {
        literal.is_true(self.state.assignments())
    }

    pub(crate) fn is_literal_false(&self, literal: Literal) -> bool {
        literal.is_false(self.state.assignments())
    }

    pub(crate) fn post(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        self.state.post(predicate)
    }

    pub(crate) fn set_literal(&mut self, literal: Literal, value: bool) -> Result<(), EmptyDomain> {
        let predicate = if value {
            literal.get_true_predicate()
        } else {
            literal.get_false_predicate()
        };
        self.post(predicate)
    }

    pub(crate) fn propagate(&mut self) -> PropagationStatus {
        self.state.propagate_to_fixpoint()
    }

    pub(crate) fn world_push(&mut self) {
        self.state.world_push();
    }

    pub(crate) fn world_pop(&mut self) {
        self.state.world_pop();
    }
}
