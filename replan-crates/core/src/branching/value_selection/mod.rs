//! Strategies which turn the variable picked by a
//! [`VariableSelector`](crate::branching::variable_selection::VariableSelector) into a decision.
mod in_domain_random;
mod prefer_value;

pub use in_domain_random::InDomainRandom;
pub use prefer_value::PreferValue;

use crate::basic_types::Solution;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::predicate;

pub trait ValueSelector<Var> {
    /// The decision to take on `decision_variable`. Its negation is posted when the search
    /// backtracks over it.
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var)
        -> Predicate;

    fn on_solution(&mut self, _solution: &Solution) {}
}

/// Tries the smallest value first, by posting `[x <= lb]`.
#[derive(Clone, Copy, Debug)]
pub struct InDomainMin;

impl ValueSelector<DomainId> for InDomainMin {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: DomainId,
    ) -> Predicate {
        predicate!(decision_variable <= context.lower_bound(decision_variable))
    }
}

/// Tries the largest value first, by posting `[x >= ub]`.
#[derive(Clone, Copy, Debug)]
pub struct InDomainMax;

impl ValueSelector<DomainId> for InDomainMax {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: DomainId,
    ) -> Predicate {
        predicate!(decision_variable >= context.upper_bound(decision_variable))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::Assignments;

    #[test]
    fn the_bound_selectors_fix_the_matching_bound() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(3, 9);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        assert_eq!(predicate!(x <= 3), InDomainMin.select_value(&mut context, x));
        assert_eq!(predicate!(x >= 9), InDomainMax.select_value(&mut context, x));
    }
}
