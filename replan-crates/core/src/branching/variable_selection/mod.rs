//! Strategies which pick the next variable to branch on.

use log::warn;

use crate::branching::SelectionContext;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;

pub trait VariableSelector<Var> {
    /// The variable to branch on next, or [`None`] once every variable of the selector is fixed.
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var>;
}

fn own_variables<Var: Clone>(selector: &str, variables: &[Var]) -> Vec<Var> {
    if variables.is_empty() {
        warn!("The {selector} variable selector has no variables to branch on");
    }
    variables.to_vec()
}

/// The unfixed variable with the lowest score; ties go to the earliest variable.
fn lowest_scoring(
    variables: &[DomainId],
    context: &SelectionContext,
    score: impl Fn(&SelectionContext, DomainId) -> i32,
) -> Option<DomainId> {
    variables
        .iter()
        .copied()
        .filter(|&variable| !context.is_integer_fixed(variable))
        .min_by_key(|&variable| score(context, variable))
}

/// The first unfixed variable, in the order they were given.
#[derive(Clone, Debug)]
pub struct InputOrder<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> InputOrder<Var> {
    pub fn new(variables: &[Var]) -> Self {
        InputOrder {
            variables: own_variables("InputOrder", variables),
        }
    }
}

impl<Var: IntegerVariable> VariableSelector<Var> for InputOrder<Var> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        self.variables
            .iter()
            .find(|&variable| !context.is_integer_fixed(variable.clone()))
            .cloned()
    }
}

/// The unfixed variable with the narrowest bounds (holes are not counted).
#[derive(Clone, Debug)]
pub struct FirstFail<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> FirstFail<Var> {
    pub fn new(variables: &[Var]) -> Self {
        FirstFail {
            variables: own_variables("FirstFail", variables),
        }
    }
}

impl VariableSelector<DomainId> for FirstFail<DomainId> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<DomainId> {
        lowest_scoring(&self.variables, context, |context, variable| {
            context.get_size_of_domain(variable)
        })
    }
}

/// The unfixed variable with the smallest lower bound, e.g. the earliest start.
#[derive(Clone, Debug)]
pub struct Smallest<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> Smallest<Var> {
    pub fn new(variables: &[Var]) -> Self {
        Smallest {
            variables: own_variables("Smallest", variables),
        }
    }
}

impl VariableSelector<DomainId> for Smallest<DomainId> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<DomainId> {
        lowest_scoring(&self.variables, context, |context, variable| {
            context.lower_bound(variable)
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::Assignments;

    #[test]
    fn input_order_skips_fixed_variables() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(3, 3);
        let y = assignments.grow(0, 5);
        let z = assignments.grow(0, 1);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        assert_eq!(Some(y), InputOrder::new(&[x, y, z]).select_variable(&mut context));
    }

    #[test]
    fn first_fail_prefers_the_narrowest_unfixed_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);
        let y = assignments.grow(5, 7);
        let z = assignments.grow(2, 2);
        let w = assignments.grow(1, 3);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        assert_eq!(Some(y), FirstFail::new(&[x, y, z, w]).select_variable(&mut context));
    }

    #[test]
    fn smallest_follows_the_lower_bounds() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(11, 15);
        let y = assignments.grow(10, 20);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut selector = Smallest::new(&[x, y]);

        {
            let mut context = SelectionContext::new(&assignments, &mut rng);
            assert_eq!(Some(y), selector.select_variable(&mut context));
        }

        let _ = assignments.tighten_lower_bound(y, 15);
        let mut context = SelectionContext::new(&assignments, &mut rng);
        assert_eq!(Some(x), selector.select_variable(&mut context));
    }

    #[test]
    fn nothing_is_selected_once_everything_is_fixed() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(4, 4);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        assert_eq!(None, Smallest::new(&[x]).select_variable(&mut context));
    }
}
