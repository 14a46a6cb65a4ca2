use crate::basic_types::Solution;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::statistics::StatisticLogger;

/// Drives the search by proposing the next decision at every node.
///
/// A decision must shrink at least one domain. The search posts the decision on the left branch
/// and its negation on the right branch.
pub trait Brancher {
    /// The decision for the current node, or [`None`] once all the variables this brancher is
    /// responsible for are fixed.
    ///
    /// The context only hands out the domains for reading; it is mutable for its random
    /// generator.
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Predicate>;

    /// The search returned to a parent node.
    fn on_backtrack(&mut self) {}

    fn on_solution(&mut self, _solution: &Solution) {}

    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

impl<Inner: Brancher + ?Sized> Brancher for Box<Inner> {
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Predicate> {
        self.as_mut().next_decision(context)
    }

    fn on_backtrack(&mut self) {
        self.as_mut().on_backtrack();
    }

    fn on_solution(&mut self, solution: &Solution) {
        self.as_mut().on_solution(solution);
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.as_ref().log_statistics(statistic_logger);
    }
}
