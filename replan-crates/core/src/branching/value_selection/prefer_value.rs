use super::ValueSelector;
use crate::basic_types::Solution;
use crate::branching::SelectionContext;
use crate::containers::HashMap;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::predicate;

/// [`ValueSelector`] which assigns a variable to its preferred value if that value is still in the
/// domain, and otherwise defers to another [`ValueSelector`].
#[derive(Debug, Clone)]
pub struct PreferValue<Fallback> {
    preferred: HashMap<DomainId, i32>,
    fallback: Fallback,
}

impl<Fallback> PreferValue<Fallback> {
    pub fn new(preferred: impl IntoIterator<Item = (DomainId, i32)>, fallback: Fallback) -> Self {
        PreferValue {
            preferred: preferred.into_iter().collect(),
            fallback,
        }
    }
}

impl<Fallback: ValueSelector<DomainId>> ValueSelector<DomainId> for PreferValue<Fallback> {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: DomainId,
    ) -> Predicate {
        match self.preferred.get(&decision_variable) {
            Some(&value) if context.contains(decision_variable, value) => {
                predicate!(decision_variable == value)
            }
            _ => self.fallback.select_value(context, decision_variable),
        }
    }

    fn on_solution(&mut self, solution: &Solution) {
        self.fallback.on_solution(solution);
    }
}
