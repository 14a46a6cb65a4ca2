use log::debug;
use rand::rngs::SmallRng;

use super::State;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::branching::SelectionContext;
use crate::statistics_counters;
use crate::engine::predicates::Predicate;
use crate::engine::termination::TerminationCondition;
use crate::predicate;
use crate::replan_assert_moderate;

statistics_counters!(
    /// Counters of a single run of the search.
    SearchStatistics {
        /// The number of nodes which were opened.
        num_decisions: u64,
        /// The number of times the search returned to a parent node.
        num_backtracks: u64,
        /// The number of nodes at which propagation failed.
        num_conflicts: u64,
        /// The number of solutions which were found.
        num_solutions: u64,
        /// The largest number of simultaneously open decisions.
        peak_depth: u64,
});

/// The result of looking for the next solution.
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    Solution(Solution),
    /// The remaining search space contains no solution.
    Exhausted,
    /// The termination condition triggered before the search space was exhausted.
    Stopped,
}

/// A chronological depth-first search over binary decisions.
///
/// Each decision opens a new world; refuting a decision pops its world and posts the negation
/// in the parent world. All changes made by the search live above the world which was current
/// when the search started, so [`DepthFirstSearch::finish`] restores the state it was started
/// from.
#[derive(Debug)]
pub(crate) struct DepthFirstSearch {
    decisions: Vec<Predicate>,
    /// A predicate which every remaining solution has to satisfy, e.g. an objective cut-off.
    bound: Option<Predicate>,
    must_backtrack: bool,
    root_world: usize,
    statistics: SearchStatistics,
}

impl DepthFirstSearch {
    pub(crate) fn start(state: &mut State) -> DepthFirstSearch {
        let root_world = state.current_world();
        state.world_push();

        DepthFirstSearch {
            decisions: vec![],
            bound: None,
            must_backtrack: false,
            root_world,
            statistics: SearchStatistics::default(),
        }
    }

    /// Restricts the remaining search to assignments satisfying `bound`. Replaces the previous
    /// bound, so bounds are expected to become stricter.
    pub(crate) fn restrict(&mut self, bound: Predicate) {
        self.bound = Some(bound);
    }

    pub(crate) fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    pub(crate) fn next_solution(
        &mut self,
        state: &mut State,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
        rng: &mut SmallRng,
    ) -> SearchOutcome {
        if self.must_backtrack {
            self.must_backtrack = false;
            if !self.backtrack(state, brancher, termination) {
                return SearchOutcome::Exhausted;
            }
        }

        let mut pending: PropagationStatus = Ok(());
        loop {
            let status = pending.and_then(|_| self.propagate(state));
            pending = Ok(());

            if status.is_err() {
                self.statistics.num_conflicts += 1;
                if !self.backtrack(state, brancher, termination) {
                    return SearchOutcome::Exhausted;
                }
                continue;
            }

            if termination.should_stop() {
                debug!(
                    "Search stopped after {} decisions",
                    self.statistics.num_decisions
                );
                return SearchOutcome::Stopped;
            }

            let decision = brancher
                .next_decision(&mut SelectionContext::new(state.assignments(), rng))
                .or_else(|| first_unfixed_domain(state));

            let Some(decision) = decision else {
                let solution = Solution::from_assignments(state.assignments());
                self.statistics.num_solutions += 1;
                brancher.on_solution(&solution);
                self.must_backtrack = true;
                return SearchOutcome::Solution(solution);
            };

            replan_assert_moderate!(
                state.assignments().evaluate_predicate(decision) != Some(true),
                "the decision {decision} already holds"
            );

            self.statistics.num_decisions += 1;
            termination.decision_has_been_made();

            state.world_push();
            self.decisions.push(decision);
            let depth = self.decisions.len() as u64;
            self.statistics.peak_depth = self.statistics.peak_depth.max(depth);

            pending = state.post(decision).map_err(Into::into);
        }
    }

    /// Pops the most recent decision and posts its negation, repeating while the negation itself
    /// fails. Returns `false` if there is no decision left to refute.
    fn backtrack(
        &mut self,
        state: &mut State,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> bool {
        while let Some(decision) = self.decisions.pop() {
            state.world_pop();
            self.statistics.num_backtracks += 1;
            termination.backtrack_has_occurred();
            brancher.on_backtrack();

            if state.post(!decision).is_ok() {
                return true;
            }
        }

        false
    }

    fn propagate(&mut self, state: &mut State) -> PropagationStatus {
        if let Some(bound) = self.bound {
            state.post(bound)?;
        }
        state.propagate_to_fixpoint()
    }

    /// Pops every world opened by the search.
    pub(crate) fn finish(self, state: &mut State) -> SearchStatistics {
        while state.current_world() > self.root_world {
            state.world_pop();
        }
        self.statistics
    }
}

/// Any unfixed domain; used once the brancher has no decisions left so that every solution is
/// complete.
fn first_unfixed_domain(state: &State) -> Option<Predicate> {
    let assignments = state.assignments();
    assignments
        .get_domains()
        .find(|&domain| !assignments.is_domain_assigned(domain))
        .map(|domain| predicate!(domain <= assignments.get_lower_bound(domain)))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::branching::branchers::IndependentVariableValueBrancher;
    use crate::branching::value_selection::InDomainMin;
    use crate::branching::variable_selection::InputOrder;
    use crate::engine::termination::DecisionBudget;
    use crate::engine::termination::Indefinite;
    use crate::engine::variables::TransformableVariable;
    use crate::propagators::LinearLessOrEqualConstructor;
    use crate::propagators::LinearNotEqualConstructor;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn solutions_are_enumerated_in_lexicographic_order() {
        let mut state = State::default();
        let x = state.new_domain(0, 1);
        let y = state.new_domain(0, 1);
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[x, y]), InDomainMin);
        let mut rng = rng();

        let mut search = DepthFirstSearch::start(&mut state);
        let mut found = vec![];
        while let SearchOutcome::Solution(solution) =
            search.next_solution(&mut state, &mut brancher, &mut Indefinite, &mut rng)
        {
            found.push((solution.get_value(x), solution.get_value(y)));
        }

        assert_eq!(vec![(0, 0), (0, 1), (1, 0), (1, 1)], found);
        let _ = search.finish(&mut state);
        assert_eq!(0, state.current_world());
    }

    #[test]
    fn refuted_decisions_leave_the_root_untouched() {
        let mut state = State::default();
        let x = state.new_domain(0, 3);
        let y = state.new_domain(0, 3);
        let _ = state
            .add_propagator(LinearNotEqualConstructor::new(
                vec![x.scaled(1), y.scaled(-1)].into(),
                0,
            ))
            .expect("feasible");
        let _ = state
            .add_propagator(LinearLessOrEqualConstructor::new(
                vec![x.scaled(1), y.scaled(1)].into(),
                1,
            ))
            .expect("feasible");
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[x, y]), InDomainMin);
        let mut rng = rng();

        let mut search = DepthFirstSearch::start(&mut state);
        let SearchOutcome::Solution(solution) =
            search.next_solution(&mut state, &mut brancher, &mut Indefinite, &mut rng)
        else {
            panic!("expected a solution");
        };
        assert_eq!((0, 1), (solution.get_value(x), solution.get_value(y)));

        let statistics = search.finish(&mut state);
        assert_eq!(1, statistics.num_decisions);
        assert_eq!(1, state.assignments().get_upper_bound(x));
        assert_eq!(0, state.assignments().get_lower_bound(y));
    }

    #[test]
    fn an_infeasible_problem_is_exhausted() {
        let mut state = State::default();
        let x = state.new_domain(0, 1);
        let y = state.new_domain(0, 1);
        let z = state.new_domain(0, 1);
        for (a, b) in [(x, y), (y, z), (x, z)] {
            let _ = state
                .add_propagator(LinearNotEqualConstructor::new(
                    vec![a.scaled(1), b.scaled(-1)].into(),
                    0,
                ))
                .expect("feasible at the root");
        }
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[x, y, z]), InDomainMin);
        let mut rng = rng();

        let mut search = DepthFirstSearch::start(&mut state);
        let outcome = search.next_solution(&mut state, &mut brancher, &mut Indefinite, &mut rng);

        assert!(matches!(outcome, SearchOutcome::Exhausted));
    }

    #[test]
    fn an_exhausted_budget_stops_the_search() {
        let mut state = State::default();
        let x = state.new_domain(0, 10);
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[x]), InDomainMin);
        let mut rng = rng();

        let mut search = DepthFirstSearch::start(&mut state);
        let outcome = search.next_solution(
            &mut state,
            &mut brancher,
            &mut DecisionBudget::new(0),
            &mut rng,
        );

        assert!(matches!(outcome, SearchOutcome::Stopped));
    }

    #[test]
    fn a_bound_prunes_the_remaining_search() {
        let mut state = State::default();
        let x = state.new_domain(0, 5);
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[x]), InDomainMin);
        let mut rng = rng();

        let mut search = DepthFirstSearch::start(&mut state);
        let _ = search.next_solution(&mut state, &mut brancher, &mut Indefinite, &mut rng);
        search.restrict(predicate!(x >= 4));

        let SearchOutcome::Solution(solution) =
            search.next_solution(&mut state, &mut brancher, &mut Indefinite, &mut rng)
        else {
            panic!("expected a solution");
        };
        assert_eq!(4, solution.get_value(x));
    }
}
