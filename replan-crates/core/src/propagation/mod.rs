//! Contains the main building blocks for propagators.
//!
//! A propagator takes the domains of its variables and removes the values which cannot be part
//! of any solution of its constraint, or reports that the constraint cannot be satisfied at all.
//! Propagators are not required to be idempotent; the solver calls a propagator again as long as
//! one of the variables it watches changes.
//!
//! Each concrete propagator implements [`Propagator`], and is created by a
//! [`PropagatorConstructor`] which registers the [`DomainEvents`] the propagator is interested in
//! through the [`PropagatorConstructorContext`].
//!
//! See the [`crate::propagators`] module for the propagators shipped with the engine.

mod constructor;
mod contexts;
mod propagator;

pub use constructor::PropagatorConstructor;
pub use constructor::PropagatorConstructorContext;
pub use contexts::Domains;
pub use contexts::PropagationContext;
pub use contexts::ReadDomains;
pub use propagator::Priority;
pub use propagator::Propagator;

pub use crate::engine::DomainEvent;
pub use crate::engine::DomainEvents;

crate::containers::storage_key! {
    /// The handle the solver gives a propagator when it is added.
    pub struct PropagatorId;
}

impl std::fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
