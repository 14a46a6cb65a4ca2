use std::marker::PhantomData;

use crate::basic_types::Solution;
use crate::branching::value_selection::ValueSelector;
use crate::branching::variable_selection::VariableSelector;
use crate::branching::Brancher;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;

/// Picks the variable to branch on with a [`VariableSelector`], then the value with a
/// [`ValueSelector`] which does not know how the variable was chosen.
///
/// The brancher is done once the variable selector finds no unfixed variable.
#[derive(Debug)]
pub struct IndependentVariableValueBrancher<Var, Variables, Values> {
    variables: Variables,
    values: Values,
    variable_type: PhantomData<Var>,
}

impl<Var, Variables, Values> IndependentVariableValueBrancher<Var, Variables, Values>
where
    Variables: VariableSelector<Var>,
    Values: ValueSelector<Var>,
{
    pub fn new(variables: Variables, values: Values) -> Self {
        IndependentVariableValueBrancher {
            variables,
            values,
            variable_type: PhantomData,
        }
    }
}

impl<Var, Variables, Values> Brancher for IndependentVariableValueBrancher<Var, Variables, Values>
where
    Variables: VariableSelector<Var>,
    Values: ValueSelector<Var>,
{
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Predicate> {
        let variable = self.variables.select_variable(context)?;
        Some(self.values.select_value(context, variable))
    }

    fn on_solution(&mut self, solution: &Solution) {
        self.values.on_solution(solution);
    }
}
