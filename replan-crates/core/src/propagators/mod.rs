//! Contains propagator implementations that are used in the solver.
//!
//! See the [`crate::propagation`] for info on propagators.

pub(crate) mod arithmetic;
mod element;
mod reified_propagator;

pub use arithmetic::LinearLessOrEqualConstructor;
pub use arithmetic::LinearLessOrEqualPropagator;
pub use arithmetic::LinearNotEqualConstructor;
pub use arithmetic::LinearNotEqualPropagator;
pub use element::ElementConstructor;
pub use element::ElementPropagator;
pub use reified_propagator::ReifiedPropagator;
pub use reified_propagator::ReifiedPropagatorConstructor;
