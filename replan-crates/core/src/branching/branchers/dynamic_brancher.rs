use std::fmt::Debug;
use std::fmt::Formatter;

use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::statistics::StatisticLogger;

/// Chains boxed [`Brancher`]s: decisions come from the first stage that still has one, so a
/// stage only starts deciding once every earlier stage has fixed its variables.
///
/// A backtrack can unfix the variables of an earlier stage, so both a backtrack and a solution
/// send the chain back to its first stage.
pub struct DynamicBrancher {
    stages: Vec<Box<dyn Brancher>>,
    active: usize,
}

impl Debug for DynamicBrancher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DynamicBrancher(stage {} of {})", self.active, self.stages.len())
    }
}

impl DynamicBrancher {
    pub fn new(stages: Vec<Box<dyn Brancher>>) -> Self {
        DynamicBrancher { stages, active: 0 }
    }

    /// Appends a stage which decides after all the current ones.
    pub fn add_brancher(&mut self, stage: Box<dyn Brancher>) {
        self.stages.push(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn restart(&mut self) {
        self.active = 0;
    }
}

impl Brancher for DynamicBrancher {
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Predicate> {
        while let Some(stage) = self.stages.get_mut(self.active) {
            let decision = stage.next_decision(context);
            if decision.is_some() {
                return decision;
            }
            self.active += 1;
        }
        None
    }

    fn on_backtrack(&mut self) {
        self.restart();
        for stage in &mut self.stages {
            stage.on_backtrack();
        }
    }

    fn on_solution(&mut self, solution: &Solution) {
        self.restart();
        for stage in &mut self.stages {
            stage.on_solution(solution);
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        for (index, stage) in self.stages.iter().enumerate() {
            stage.log_statistics(statistic_logger.attach_to_prefix(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::branching::branchers::IndependentVariableValueBrancher;
    use crate::branching::value_selection::InDomainMin;
    use crate::branching::variable_selection::InputOrder;
    use crate::engine::Assignments;
    use crate::predicate;

    #[test]
    fn later_branchers_are_used_once_earlier_ones_are_exhausted() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 0);
        let y = assignments.grow(2, 5);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        let mut brancher = DynamicBrancher::new(vec![
            Box::new(IndependentVariableValueBrancher::new(
                InputOrder::new(&[x]),
                InDomainMin,
            )),
            Box::new(IndependentVariableValueBrancher::new(
                InputOrder::new(&[y]),
                InDomainMin,
            )),
        ]);

        assert_eq!(Some(predicate!(y <= 2)), brancher.next_decision(&mut context));
    }

    #[test]
    fn no_decision_when_every_brancher_is_exhausted() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(1, 1);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&assignments, &mut rng);

        let mut brancher = DynamicBrancher::new(vec![Box::new(
            IndependentVariableValueBrancher::new(InputOrder::new(&[x]), InDomainMin),
        )]);

        assert_eq!(None, brancher.next_decision(&mut context));
    }
}
