use std::time::Duration;
use std::time::Instant;

use super::TerminationCondition;

/// Counts events up to a limit.
#[derive(Clone, Copy, Debug)]
struct Allowance {
    limit: u64,
    used: u64,
}

impl Allowance {
    fn new(limit: u64) -> Self {
        Allowance { limit, used: 0 }
    }

    fn consume(&mut self) {
        self.used = self.used.saturating_add(1);
    }

    fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// Stops the search once it has opened `limit` nodes. A limit of 0 stops it before the first
/// decision.
#[derive(Clone, Copy, Debug)]
pub struct DecisionBudget(Allowance);

impl DecisionBudget {
    pub fn new(limit: u64) -> Self {
        DecisionBudget(Allowance::new(limit))
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.0.is_exhausted()
    }

    fn decision_has_been_made(&mut self) {
        self.0.consume();
    }
}

/// Stops the search once it has backtracked `limit` times.
#[derive(Clone, Copy, Debug)]
pub struct BacktrackBudget(Allowance);

impl BacktrackBudget {
    pub fn new(limit: u64) -> Self {
        BacktrackBudget(Allowance::new(limit))
    }
}

impl TerminationCondition for BacktrackBudget {
    fn should_stop(&mut self) -> bool {
        self.0.is_exhausted()
    }

    fn backtrack_has_occurred(&mut self) {
        self.0.consume();
    }
}

/// Stops the search once a wall-clock deadline has passed.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    /// A deadline `budget` from now. A budget too large to represent never expires.
    pub fn starting_now(budget: Duration) -> TimeBudget {
        let now = Instant::now();
        let deadline = now
            .checked_add(budget)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX.into()));

        TimeBudget { deadline }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtracks_do_not_count_against_the_node_limit() {
        let mut budget = DecisionBudget::new(1);
        budget.backtrack_has_occurred();
        assert!(!budget.should_stop());

        budget.decision_has_been_made();
        assert!(budget.should_stop());
    }

    #[test]
    fn decisions_do_not_count_against_the_backtrack_limit() {
        let mut budget = BacktrackBudget::new(1);
        budget.decision_has_been_made();
        assert!(!budget.should_stop());

        budget.backtrack_has_occurred();
        assert!(budget.should_stop());
    }

    #[test]
    fn an_empty_time_budget_stops_immediately() {
        let mut budget = TimeBudget::starting_now(Duration::ZERO);

        assert!(budget.should_stop());
    }
}
