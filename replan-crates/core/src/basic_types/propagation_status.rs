/// The result of a propagation; [`Err`] when the current domains admit no solution.
pub type PropagationStatus = Result<(), Inconsistency>;

/// Returned when an operation on a domain removes its last value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The reason a propagation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A domain became empty while it was being tightened.
    EmptyDomain,
    /// A propagator determined that its constraint cannot be satisfied under the current domains.
    Propagator,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}
