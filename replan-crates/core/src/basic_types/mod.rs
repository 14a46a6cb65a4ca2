mod constraint_operation_error;
mod propagation_status;
mod solution;
mod trail;

pub use constraint_operation_error::ConstraintOperationError;
pub use propagation_status::EmptyDomain;
pub use propagation_status::Inconsistency;
pub use propagation_status::PropagationStatus;
pub use solution::Solution;
pub(crate) use trail::Trail;
