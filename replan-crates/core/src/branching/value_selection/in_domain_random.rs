use rand::seq::SliceRandom;

use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::predicate;

/// Fixes the variable to a value drawn uniformly from its domain, holes excluded.
#[derive(Clone, Copy, Debug)]
pub struct InDomainRandom;

impl ValueSelector<DomainId> for InDomainRandom {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: DomainId,
    ) -> Predicate {
        let candidates = context
            .iterate_domain(decision_variable)
            .collect::<Vec<_>>();
        let value = candidates
            .choose(context.random())
            .copied()
            .unwrap_or_else(|| context.lower_bound(decision_variable));
        predicate!(decision_variable == value)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::Assignments;

    #[test]
    fn the_selected_value_is_in_the_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[1, 4, 9]);
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..20 {
            let mut context = SelectionContext::new(&assignments, &mut rng);
            let decision = InDomainRandom.select_value(&mut context, x);

            assert!(decision.is_equality_predicate());
            assert!(assignments.is_value_in_domain(x, decision.get_right_hand_side()));
        }
    }
}
