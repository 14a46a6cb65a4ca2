use thiserror::Error;

/// Errors related to adding constraints to the solver.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// Error which indicates that adding a propagator led to infeasibility at the root.
    #[error("Adding propagator led to infeasibility at the root")]
    InfeasiblePropagator,
    /// Error which indicates that a constraint was attempted to be added while the solver was in
    /// an infeasible state.
    #[error("Attempted to add a constraint to an infeasible solver")]
    InfeasibleState,
    /// Error which indicates that a constraint was posted below the root world.
    #[error("Constraints can only be added at the root world")]
    NotAtRoot,
}
