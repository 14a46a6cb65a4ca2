mod outputs;
pub(crate) mod solver;

pub mod results {
    //! What a call to the [`Solver`] returns.
    //!
    //! A search which ran out of its termination budget reports so separately from one which
    //! exhausted the search space, for satisfaction and optimisation alike.
    pub use crate::api::outputs::OptimisationDirection;
    pub use crate::api::outputs::OptimisationResult;
    pub use crate::api::outputs::SatisfactionResult;
    pub use crate::api::solver::SolverStatistics;
    pub use crate::basic_types::Solution;
    #[cfg(doc)]
    use crate::Solver;
}

pub mod options {
    //! Settings of the [`Solver`] which are fixed when it is created.
    pub use crate::api::solver::SolverOptions;
    #[cfg(doc)]
    use crate::Solver;
}
