use log::warn;

use super::Constraint;
use crate::engine::variables::Literal;
use crate::ConstraintOperationError;
use crate::Solver;

/// A constraint on its way into a [`Solver`], returned by [`Solver::add_constraint`]. Nothing
/// happens until [`ConstraintPoster::post`] or [`ConstraintPoster::implied_by`] is called.
#[derive(Debug)]
#[must_use = "a constraint is only added once it is posted"]
pub struct ConstraintPoster<'solver, C> {
    solver: &'solver mut Solver,
    constraint: Option<C>,
}

impl<'solver, C> ConstraintPoster<'solver, C> {
    pub(crate) fn new(solver: &'solver mut Solver, constraint: C) -> Self {
        ConstraintPoster {
            solver,
            constraint: Some(constraint),
        }
    }
}

impl<C: Constraint> ConstraintPoster<'_, C> {
    pub fn post(mut self) -> Result<(), ConstraintOperationError> {
        self.constraint
            .take()
            .map_or(Ok(()), |constraint| constraint.post(self.solver))
    }

    /// Posts `guard -> constraint`.
    pub fn implied_by(mut self, guard: Literal) -> Result<(), ConstraintOperationError> {
        self.constraint.take().map_or(Ok(()), |constraint| {
            constraint.implied_by(self.solver, guard)
        })
    }
}

impl<C> Drop for ConstraintPoster<'_, C> {
    fn drop(&mut self) {
        if self.constraint.is_some() {
            warn!("A constraint was dropped without being posted");
        }
    }
}
