//! The constraints the engine supports out of the box.
//!
//! A constraint is posted through [`Solver::add_constraint`], either unconditionally or guarded
//! by a literal (`literal -> constraint`).
//!
//! # Example
//! ```
//! # use replan_core::constraints;
//! # use replan_core::Solver;
//! let mut solver = Solver::default();
//! let start = solver.new_bounded_integer(0, 10);
//! let end = solver.new_bounded_integer(0, 4);
//!
//! solver
//!     .add_constraint(constraints::binary_less_than_or_equals(start, end))
//!     .post()
//!     .expect("start can precede end");
//! assert_eq!(4, solver.upper_bound(&start));
//! ```
mod constraint_poster;
mod linear;

pub use constraint_poster::ConstraintPoster;
pub use linear::*;

use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;
use crate::propagation::PropagatorConstructor;
use crate::propagators::ElementConstructor;
use crate::propagators::ReifiedPropagatorConstructor;
use crate::ConstraintOperationError;
use crate::Solver;

/// A relation over variables, enforced by one or more propagators.
pub trait Constraint {
    /// Adds the constraint to `solver`. Fails if that empties a domain at the root.
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError>;

    /// Adds `guard -> constraint` to `solver`. Fails if that empties a domain at the root.
    fn implied_by(
        self,
        solver: &mut Solver,
        guard: Literal,
    ) -> Result<(), ConstraintOperationError>;
}

impl<Constructor: PropagatorConstructor> Constraint for Constructor {
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        solver.add_propagator(self)
    }

    fn implied_by(
        self,
        solver: &mut Solver,
        guard: Literal,
    ) -> Result<(), ConstraintOperationError> {
        solver.add_propagator(ReifiedPropagatorConstructor {
            inner: self,
            guard,
        })
    }
}

/// A conjunction; posting stops at the first constraint which fails.
impl<C: Constraint> Constraint for Vec<C> {
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        self.into_iter()
            .try_for_each(|constraint| constraint.post(solver))
    }

    fn implied_by(
        self,
        solver: &mut Solver,
        guard: Literal,
    ) -> Result<(), ConstraintOperationError> {
        self.into_iter()
            .try_for_each(|constraint| constraint.implied_by(solver, guard))
    }
}

/// `array[index] = rhs`.
pub fn element<ElementVar: IntegerVariable>(
    index: impl IntegerVariable,
    array: impl Into<Box<[ElementVar]>>,
    rhs: impl IntegerVariable,
) -> impl Constraint {
    ElementConstructor {
        index,
        array: array.into(),
        rhs,
    }
}

/// Pairwise distinct values, decomposed into a disequality per pair.
pub fn all_different<Var: IntegerVariable>(variables: impl Into<Box<[Var]>>) -> impl Constraint {
    let variables: Box<[Var]> = variables.into();

    variables
        .iter()
        .enumerate()
        .flat_map(|(i, first)| {
            variables[i + 1..]
                .iter()
                .map(move |second| binary_not_equals(first.clone(), second.clone()))
        })
        .collect::<Vec<_>>()
}
