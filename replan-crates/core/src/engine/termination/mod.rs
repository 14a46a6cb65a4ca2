//! Conditions under which the search gives up before it has reached a conclusion.
//!
//! The search polls its [`TerminationCondition`] before every decision and reports every decision
//! and backtrack to it. A search that is stopped this way reports an unknown outcome, or the best
//! solution it found so far.

mod budgets;

pub use budgets::BacktrackBudget;
pub use budgets::DecisionBudget;
pub use budgets::TimeBudget;

pub trait TerminationCondition {
    /// Whether the search should stop now.
    fn should_stop(&mut self) -> bool;

    /// The search opened a new node.
    fn decision_has_been_made(&mut self) {}

    /// The search returned to a parent node.
    fn backtrack_has_occurred(&mut self) {}
}

/// An absent limit never stops the search.
impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().is_some_and(T::should_stop)
    }

    fn decision_has_been_made(&mut self) {
        if let Some(condition) = self {
            condition.decision_has_been_made();
        }
    }

    fn backtrack_has_occurred(&mut self) {
        if let Some(condition) = self {
            condition.backtrack_has_occurred();
        }
    }
}

/// Lets the search run until it has exhausted the search space.
#[derive(Clone, Copy, Debug)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops as soon as either of two conditions does. Both conditions observe every event.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<First, Second> {
    first: First,
    second: Second,
}

impl<First, Second> Combinator<First, Second> {
    pub fn new(first: First, second: Second) -> Self {
        Combinator { first, second }
    }
}

impl<First, Second> TerminationCondition for Combinator<First, Second>
where
    First: TerminationCondition,
    Second: TerminationCondition,
{
    fn should_stop(&mut self) -> bool {
        self.first.should_stop() | self.second.should_stop()
    }

    fn decision_has_been_made(&mut self) {
        self.first.decision_has_been_made();
        self.second.decision_has_been_made();
    }

    fn backtrack_has_occurred(&mut self) {
        self.first.backtrack_has_occurred();
        self.second.backtrack_has_occurred();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_missing_limit_never_stops() {
        let mut limit: Option<DecisionBudget> = None;
        limit.decision_has_been_made();

        assert!(!limit.should_stop());
    }

    #[test]
    fn the_combination_stops_when_either_limit_is_reached() {
        let mut limits = Combinator::new(Some(DecisionBudget::new(2)), BacktrackBudget::new(1));
        limits.decision_has_been_made();
        assert!(!limits.should_stop());

        limits.backtrack_has_occurred();
        assert!(limits.should_stop());
    }
}
