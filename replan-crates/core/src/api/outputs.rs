use crate::basic_types::Solution;

/// The result of [`crate::Solver::satisfy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatisfactionResult {
    /// A solution was found.
    Satisfiable(Solution),
    /// The search space was exhausted without finding a solution.
    Unsatisfiable,
    /// The search was stopped by its termination condition before a conclusion was reached.
    Unknown,
}

/// The result of [`crate::Solver::optimise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimisationResult {
    /// The search space was exhausted; the solution is optimal.
    Optimal(Solution),
    /// The search was stopped after finding at least one solution; this is the best one.
    Satisfiable(Solution),
    /// The search space was exhausted without finding a solution.
    Unsatisfiable,
    /// The search was stopped before any solution was found.
    Unknown,
}

impl OptimisationResult {
    /// The best solution which was found, if any.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            OptimisationResult::Optimal(solution) | OptimisationResult::Satisfiable(solution) => {
                Some(solution)
            }
            OptimisationResult::Unsatisfiable | OptimisationResult::Unknown => None,
        }
    }
}

/// Whether the objective is minimised or maximised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimisationDirection {
    Minimise,
    Maximise,
}
