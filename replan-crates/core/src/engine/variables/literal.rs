use std::ops::Not;

use super::AffineView;
use super::DomainId;
use super::IntegerVariable;
use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Solution;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;
use crate::engine::Assignments;
use crate::engine::DomainEvents;
use crate::engine::Watchers;

/// A 0-1 variable which is either the underlying domain or its negation (`1 - x`).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Literal {
    integer_variable: AffineView<DomainId>,
}

impl Literal {
    /// Creates a literal over a domain which must be a subset of `{0, 1}`.
    pub fn new(domain_id: DomainId) -> Literal {
        Literal {
            integer_variable: domain_id.scaled(1),
        }
    }

    pub fn get_integer_variable(&self) -> AffineView<DomainId> {
        self.integer_variable
    }

    pub fn get_domain_id(&self) -> DomainId {
        *self.integer_variable.inner()
    }

    fn is_negated(&self) -> bool {
        self.integer_variable.scale() < 0
    }

    /// The predicate over the underlying domain which holds when the literal is true.
    pub fn get_true_predicate(&self) -> Predicate {
        if self.is_negated() {
            Predicate::new(self.get_domain_id(), PredicateType::UpperBound, 0)
        } else {
            Predicate::new(self.get_domain_id(), PredicateType::LowerBound, 1)
        }
    }

    /// The predicate over the underlying domain which holds when the literal is false.
    pub fn get_false_predicate(&self) -> Predicate {
        !self.get_true_predicate()
    }

    pub fn is_true(&self, assignments: &Assignments) -> bool {
        self.lower_bound(assignments) == 1
    }

    pub fn is_false(&self, assignments: &Assignments) -> bool {
        self.upper_bound(assignments) == 0
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            integer_variable: self.integer_variable.scaled(-1).offset(1),
        }
    }
}

impl IntegerVariable for Literal {
    type AffineView = AffineView<Self>;

    fn lower_bound(&self, assignment: &Assignments) -> i32 {
        self.integer_variable.lower_bound(assignment)
    }

    fn upper_bound(&self, assignment: &Assignments) -> i32 {
        self.integer_variable.upper_bound(assignment)
    }

    fn contains(&self, assignment: &Assignments, value: i32) -> bool {
        self.integer_variable.contains(assignment, value)
    }

    fn iterate_domain<'a>(&self, assignment: &'a Assignments) -> impl Iterator<Item = i32> + 'a {
        self.integer_variable.iterate_domain(assignment)
    }

    fn set_lower_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        self.integer_variable.set_lower_bound(assignment, value)
    }

    fn set_upper_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        self.integer_variable.set_upper_bound(assignment, value)
    }

    fn remove(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        self.integer_variable.remove(assignment, value)
    }

    fn value_in(&self, solution: &Solution) -> i32 {
        self.integer_variable.value_in(solution)
    }

    fn watch(&self, watchers: &mut Watchers<'_>, events: DomainEvents) {
        self.integer_variable.watch(watchers, events)
    }
}

impl TransformableVariable<AffineView<Literal>> for Literal {
    fn scaled(&self, scale: i32) -> AffineView<Literal> {
        AffineView::new(*self, scale, 0)
    }

    fn offset(&self, offset: i32) -> AffineView<Literal> {
        AffineView::new(*self, 1, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_literal_is_true_when_the_domain_is_zero() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow_enumerated(&[0, 1]);
        let literal = Literal::new(domain);

        assignments
            .tighten_upper_bound(domain, 0)
            .expect("non-empty domain");

        assert!(literal.is_false(&assignments));
        assert!((!literal).is_true(&assignments));
        assert_eq!(literal, !!literal);
    }
}
