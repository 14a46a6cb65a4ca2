use crate::basic_types::PropagationStatus;
use crate::engine::variables::Literal;
use crate::engine::DomainEvents;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// Constructor for [`ReifiedPropagator`]: `guard -> inner`.
#[derive(Clone, Debug)]
pub struct ReifiedPropagatorConstructor<Inner> {
    pub inner: Inner,
    pub guard: Literal,
}

impl<Inner: PropagatorConstructor> PropagatorConstructor for ReifiedPropagatorConstructor<Inner> {
    type PropagatorImpl = ReifiedPropagator<Inner::PropagatorImpl>;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let inner = self.inner.create(context);
        // The guard becomes true when its lower bound moves.
        context.register(&self.guard, DomainEvents::BOUNDS);

        ReifiedPropagator {
            name: format!("Reified({})", inner.name()),
            inner,
            guard: self.guard,
        }
    }
}

/// Half-reification of a propagator: the inner propagator only runs once `guard` is true.
///
/// Before that, an inner propagator which can tell that its constraint is already violated
/// (see [`Propagator::detect_inconsistency`]) makes the guard false.
#[derive(Clone, Debug)]
pub struct ReifiedPropagator<Inner> {
    inner: Inner,
    guard: Literal,
    name: String,
}

impl<Inner: Propagator> Propagator for ReifiedPropagator<Inner> {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.inner.priority()
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        if context.is_literal_true(self.guard) {
            return self.inner.propagate(context);
        }

        let undecided = !context.is_literal_false(self.guard);
        if undecided && self.inner.detect_inconsistency(context.as_readonly()) {
            context.assign_literal(self.guard, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;
    use crate::predicate;
    use crate::propagators::LinearLessOrEqualConstructor;

    #[test]
    fn the_wrapped_propagator_is_silent_until_the_literal_is_true() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let literal = solver.new_literal();

        let _ = solver
            .new_propagator(ReifiedPropagatorConstructor {
                inner: LinearLessOrEqualConstructor::new([x].into(), 4),
                guard: literal,
            })
            .expect("no empty domains");
        solver.assert_bounds(x, 0, 10);

        solver.set_literal(literal, true).expect("non-empty");
        solver.propagate().expect("no empty domains");
        solver.assert_bounds(x, 0, 4);
    }

    #[test]
    fn an_inconsistent_constraint_falsifies_the_literal() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let literal = solver.new_literal();

        let _ = solver
            .new_propagator(ReifiedPropagatorConstructor {
                inner: LinearLessOrEqualConstructor::new([x].into(), 4),
                guard: literal,
            })
            .expect("no empty domains");

        solver.post(predicate![x >= 6]).expect("non-empty");
        solver.propagate().expect("the literal can be false");

        assert!(solver.is_literal_false(literal));
    }
}
