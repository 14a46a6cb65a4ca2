use std::fmt::Debug;
use std::fmt::Formatter;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::outputs::OptimisationDirection;
use super::outputs::OptimisationResult;
use super::outputs::SatisfactionResult;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::constraints::ConstraintPoster;
use crate::containers::HashMap;
use crate::engine::predicates::Predicate;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;
use crate::engine::DepthFirstSearch;
use crate::engine::SearchOutcome;
use crate::engine::SearchStatistics;
use crate::engine::State;
use crate::predicate;
use crate::propagation::PropagatorConstructor;
use crate::statistics::log_statistic;
use crate::statistics::log_statistic_postfix;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Options which influence the behaviour of the [`Solver`].
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// The seed of the random generator handed to the branchers.
    pub random_seed: u64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions { random_seed: 42 }
    }
}

/// The counters of the most recent call to [`Solver::satisfy`] or [`Solver::optimise`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    /// The number of search nodes which were opened.
    pub num_decisions: u64,
    /// The number of times the search returned to a parent node.
    pub num_backtracks: u64,
    /// The number of search nodes at which propagation failed.
    pub num_conflicts: u64,
    /// The number of propagator calls.
    pub num_propagations: u64,
    /// The number of solutions which were found.
    pub num_solutions: u64,
    /// The largest depth of the search tree.
    pub peak_depth: u64,
    /// The wall-clock time spent searching.
    pub time_spent: Duration,
}

impl SolverStatistics {
    fn from_search(
        statistics: SearchStatistics,
        num_propagations: u64,
        time_spent: Duration,
    ) -> Self {
        SolverStatistics {
            num_decisions: statistics.num_decisions,
            num_backtracks: statistics.num_backtracks,
            num_conflicts: statistics.num_conflicts,
            num_propagations,
            num_solutions: statistics.num_solutions,
            peak_depth: statistics.peak_depth,
            time_spent,
        }
    }

    /// Logs the counters using the provided [`StatisticLogger`].
    pub fn log(&self, statistic_logger: StatisticLogger) {
        self.num_decisions
            .log(statistic_logger.attach_to_prefix("numDecisions"));
        self.num_backtracks
            .log(statistic_logger.attach_to_prefix("numBacktracks"));
        self.num_conflicts
            .log(statistic_logger.attach_to_prefix("numConflicts"));
        self.num_propagations
            .log(statistic_logger.attach_to_prefix("numPropagations"));
        self.num_solutions
            .log(statistic_logger.attach_to_prefix("numSolutions"));
        self.peak_depth
            .log(statistic_logger.attach_to_prefix("peakDepth"));
        self.time_spent
            .as_millis()
            .log(statistic_logger.attach_to_prefix("timeSpentInMilliseconds"));
    }
}

/// The main interaction point which allows the creation of variables, the addition of constraints,
/// and solving problems.
///
/// # Creating Variables
/// ```rust
/// # use replan_core::Solver;
/// # use replan_core::variables::TransformableVariable;
/// let mut solver = Solver::default();
///
/// // We can create an integer variable with a domain in the range [0, 10]
/// let integer_between_bounds = solver.new_bounded_integer(0, 10);
///
/// // We can also create such a variable with a name
/// let named_integer_between_bounds = solver.new_named_bounded_integer(0, 10, "x");
///
/// // We can also create an integer variable with a non-continuous domain
/// let sparse_integer = solver.new_sparse_integer(vec![0, 3, 5]);
///
/// // An affine view over a variable applies both a scale and an offset
/// let view_over_integer = integer_between_bounds.scaled(-1).offset(15);
///
/// // A literal is a 0-1 variable
/// let literal = solver.new_literal();
/// ```
///
/// # Solving
/// ```rust
/// # use replan_core::constraints;
/// # use replan_core::branching::branchers::IndependentVariableValueBrancher;
/// # use replan_core::branching::value_selection::InDomainMin;
/// # use replan_core::branching::variable_selection::InputOrder;
/// # use replan_core::results::OptimisationResult;
/// # use replan_core::termination::Indefinite;
/// # use replan_core::Solver;
/// let mut solver = Solver::default();
/// let x = solver.new_bounded_integer(0, 5);
/// let y = solver.new_bounded_integer(0, 5);
/// let sum = solver.new_bounded_integer(0, 10);
///
/// solver.add_constraint(constraints::plus(x, y, sum)).post().unwrap();
/// solver.add_constraint(constraints::binary_not_equals(x, y)).post().unwrap();
///
/// let mut brancher =
///     IndependentVariableValueBrancher::new(InputOrder::new(&[x, y]), InDomainMin);
/// let result = solver.minimise(&mut brancher, &mut Indefinite, sum);
///
/// let OptimisationResult::Optimal(solution) = result else {
///     panic!("the problem is feasible");
/// };
/// assert_eq!(1, solution.get_value(sum));
/// ```
pub struct Solver {
    state: State,
    /// Set once a constraint led to a conflict at the root.
    is_infeasible: bool,
    random_generator: SmallRng,
    /// Names given to variables at creation, used in logs.
    variable_names: HashMap<DomainId, String>,
    statistics: SolverStatistics,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::with_options(SolverOptions::default())
    }
}

impl Debug for Solver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("state", &self.state)
            .field("is_infeasible", &self.is_infeasible)
            .field("statistics", &self.statistics)
            .finish()
    }
}

impl Solver {
    pub fn with_options(solver_options: SolverOptions) -> Self {
        Solver {
            state: State::default(),
            is_infeasible: false,
            random_generator: SmallRng::seed_from_u64(solver_options.random_seed),
            variable_names: HashMap::default(),
            statistics: SolverStatistics::default(),
        }
    }

    /// The counters of the most recent search.
    pub fn statistics(&self) -> SolverStatistics {
        self.statistics
    }

    /// Logs the statistics of the most recent search followed by those of the propagators.
    pub fn log_statistics(&self) {
        self.statistics.log(StatisticLogger::new(["solver"]));
        self.state.log_statistics(StatisticLogger::new(["engine"]));
        log_statistic("numPropagators", self.state.num_propagators());
        log_statistic_postfix();
    }

    /// Logs the statistics of the solver together with those of the provided [`Brancher`].
    pub fn log_statistics_with_brancher(&self, brancher: &impl Brancher) {
        brancher.log_statistics(StatisticLogger::new(["brancher"]));
        self.log_statistics();
    }

    /// Returns whether the solver is in an infeasible state at the root.
    pub fn is_infeasible(&self) -> bool {
        self.is_infeasible
    }

    /// The name given to `domain` when it was created, if any.
    pub fn get_name(&self, domain: DomainId) -> Option<&str> {
        self.variable_names.get(&domain).map(String::as_str)
    }

    pub fn lower_bound(&self, variable: &impl IntegerVariable) -> i32 {
        variable.lower_bound(self.state.assignments())
    }

    pub fn upper_bound(&self, variable: &impl IntegerVariable) -> i32 {
        variable.upper_bound(self.state.assignments())
    }

    pub fn contains(&self, variable: &impl IntegerVariable, value: i32) -> bool {
        variable.contains(self.state.assignments(), value)
    }

    pub fn is_fixed(&self, variable: &impl IntegerVariable) -> bool {
        variable.is_fixed(self.state.assignments())
    }

    /// The number of integer variables, including those underlying literals.
    pub fn num_domains(&self) -> usize {
        self.state.assignments().num_domains() as usize
    }

    /// Returns the number of propagators which were added to the solver.
    pub fn num_propagators(&self) -> usize {
        self.state.num_propagators()
    }
}

/// Functions to create and retrieve integer and propositional variables.
impl Solver {
    /// Create a fresh [`Literal`], which is a 0-1 variable.
    pub fn new_literal(&mut self) -> Literal {
        Literal::new(self.new_bounded_integer(0, 1))
    }

    /// Create a fresh [`Literal`] with a name.
    pub fn new_named_literal(&mut self, name: impl Into<String>) -> Literal {
        Literal::new(self.new_named_bounded_integer(0, 1, name))
    }

    /// Create a new integer variable with the given bounds.
    pub fn new_bounded_integer(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.state.new_domain(lower_bound, upper_bound)
    }

    /// Create a new named integer variable with the given bounds.
    pub fn new_named_bounded_integer(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl Into<String>,
    ) -> DomainId {
        let domain = self.new_bounded_integer(lower_bound, upper_bound);
        let _ = self.variable_names.insert(domain, name.into());
        domain
    }

    /// Create a new integer variable which has a domain of predefined values. We remove duplicates
    /// by converting to a hash set.
    pub fn new_sparse_integer(&mut self, values: impl Into<Vec<i32>>) -> DomainId {
        self.state.new_sparse_domain(&values.into())
    }

    /// Create a new named integer variable which has a domain of predefined values.
    pub fn new_named_sparse_integer(
        &mut self,
        values: impl Into<Vec<i32>>,
        name: impl Into<String>,
    ) -> DomainId {
        let domain = self.new_sparse_integer(values);
        let _ = self.variable_names.insert(domain, name.into());
        domain
    }

    /// Create an integer variable which is fixed to `value`.
    pub fn new_constant(&mut self, value: i32) -> DomainId {
        self.new_bounded_integer(value, value)
    }
}

/// Functions for adding new constraints to the solver.
impl Solver {
    /// Add a constraint to the solver. This returns a [`ConstraintPoster`] which enables control
    /// on whether to add the constraint as-is, or whether to (half) reify it.
    ///
    /// If none of the methods on [`ConstraintPoster`] are used, the constraint _is not_ actually
    /// added to the solver. In this case, a warning is emitted.
    pub fn add_constraint<Constraint>(
        &mut self,
        constraint: Constraint,
    ) -> ConstraintPoster<'_, Constraint> {
        ConstraintPoster::new(self, constraint)
    }

    /// Adds a propagator and propagates the root until a fixpoint is reached.
    ///
    /// Propagators can only be added at the root world.
    pub fn add_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), ConstraintOperationError> {
        self.check_root()?;

        match self.state.add_propagator(constructor) {
            Ok(_) => Ok(()),
            Err(_) => {
                self.is_infeasible = true;
                Err(ConstraintOperationError::InfeasiblePropagator)
            }
        }
    }

    /// Applies `predicate` at the root and propagates it.
    pub fn post(&mut self, predicate: Predicate) -> Result<(), ConstraintOperationError> {
        self.check_root()?;

        let status = self
            .state
            .post(predicate)
            .map_err(Into::into)
            .and_then(|_| self.state.propagate_to_fixpoint());

        status.map_err(|_| {
            self.is_infeasible = true;
            ConstraintOperationError::InfeasiblePropagator
        })
    }

    fn check_root(&self) -> Result<(), ConstraintOperationError> {
        if self.is_infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        if self.state.current_world() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }

        Ok(())
    }
}

/// Functions which manage the worlds of the solver.
///
/// Every change made to the domains after [`Solver::world_push`] is undone by the matching
/// [`Solver::world_pop`].
impl Solver {
    pub fn current_world(&self) -> usize {
        self.state.current_world()
    }

    pub fn world_push(&mut self) {
        self.state.world_push();
    }

    pub fn world_pop(&mut self) {
        self.state.world_pop();
    }

    /// Merges the current world into its parent, keeping the current values.
    ///
    /// # Panics
    /// If the current world is the root world.
    pub fn world_commit(&mut self) {
        self.state.world_commit();
    }

    /// Applies `predicate` in the current world and propagates it. Unlike [`Solver::post`] this
    /// is undone by popping the world.
    pub fn post_in_world(&mut self, predicate: Predicate) -> Result<(), ConstraintOperationError> {
        if self.is_infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        self.state
            .post(predicate)
            .map_err(Into::into)
            .and_then(|_| self.state.propagate_to_fixpoint())
            .map_err(|_| ConstraintOperationError::InfeasiblePropagator)
    }
}

/// Functions which solve the problem.
impl Solver {
    /// Searches for a single solution.
    ///
    /// Whatever the outcome, the domains are restored to the world which was current when the
    /// search started.
    pub fn satisfy<B: Brancher, T: TerminationCondition>(
        &mut self,
        brancher: &mut B,
        termination: &mut T,
    ) -> SatisfactionResult {
        if self.is_infeasible {
            return SatisfactionResult::Unsatisfiable;
        }

        let started = Instant::now();
        let num_propagations = self.state.num_propagator_calls();

        let mut search = DepthFirstSearch::start(&mut self.state);
        let outcome = search.next_solution(
            &mut self.state,
            brancher,
            termination,
            &mut self.random_generator,
        );
        self.finish_search(search, num_propagations, started);

        match outcome {
            SearchOutcome::Solution(solution) => SatisfactionResult::Satisfiable(solution),
            SearchOutcome::Exhausted => SatisfactionResult::Unsatisfiable,
            SearchOutcome::Stopped => SatisfactionResult::Unknown,
        }
    }

    /// Minimises `objective` by branch-and-bound.
    pub fn minimise<B: Brancher, T: TerminationCondition>(
        &mut self,
        brancher: &mut B,
        termination: &mut T,
        objective: DomainId,
    ) -> OptimisationResult {
        self.optimise(
            brancher,
            termination,
            OptimisationDirection::Minimise,
            objective,
            |_, _| {},
        )
    }

    /// Maximises `objective` by branch-and-bound.
    pub fn maximise<B: Brancher, T: TerminationCondition>(
        &mut self,
        brancher: &mut B,
        termination: &mut T,
        objective: DomainId,
    ) -> OptimisationResult {
        self.optimise(
            brancher,
            termination,
            OptimisationDirection::Maximise,
            objective,
            |_, _| {},
        )
    }

    /// Optimises `objective` by branch-and-bound.
    ///
    /// Each time a solution is found, `on_solution` is called with it and the counters of the
    /// search so far; the remaining search is then restricted to strictly better solutions. The
    /// search continues in place until the space is exhausted or `termination` triggers.
    pub fn optimise<B: Brancher, T: TerminationCondition>(
        &mut self,
        brancher: &mut B,
        termination: &mut T,
        direction: OptimisationDirection,
        objective: DomainId,
        mut on_solution: impl FnMut(&Solution, &SolverStatistics),
    ) -> OptimisationResult {
        if self.is_infeasible {
            return OptimisationResult::Unsatisfiable;
        }

        let started = Instant::now();
        let num_propagations = self.state.num_propagator_calls();

        let mut best: Option<Solution> = None;
        let mut search = DepthFirstSearch::start(&mut self.state);
        let exhausted = loop {
            match search.next_solution(
                &mut self.state,
                brancher,
                termination,
                &mut self.random_generator,
            ) {
                SearchOutcome::Solution(solution) => {
                    let value = solution.get_value(objective);
                    debug!("Found a solution with objective value {value}");

                    let statistics = SolverStatistics::from_search(
                        search.statistics(),
                        self.state.num_propagator_calls() - num_propagations,
                        started.elapsed(),
                    );
                    on_solution(&solution, &statistics);

                    search.restrict(match direction {
                        OptimisationDirection::Minimise => predicate!(objective <= value - 1),
                        OptimisationDirection::Maximise => predicate!(objective >= value + 1),
                    });
                    best = Some(solution);
                }
                SearchOutcome::Exhausted => break true,
                SearchOutcome::Stopped => break false,
            }
        };
        self.finish_search(search, num_propagations, started);

        match (best, exhausted) {
            (Some(solution), true) => OptimisationResult::Optimal(solution),
            (Some(solution), false) => OptimisationResult::Satisfiable(solution),
            (None, true) => OptimisationResult::Unsatisfiable,
            (None, false) => OptimisationResult::Unknown,
        }
    }

    fn finish_search(&mut self, search: DepthFirstSearch, num_propagations: u64, started: Instant) {
        let statistics = search.finish(&mut self.state);
        self.statistics = SolverStatistics::from_search(
            statistics,
            self.state.num_propagator_calls() - num_propagations,
            started.elapsed(),
        );
    }
}
