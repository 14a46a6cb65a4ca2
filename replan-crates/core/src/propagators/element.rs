use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntegerVariable;
use crate::engine::DomainEvents;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// Constructor for [`ElementPropagator`].
#[derive(Clone, Debug)]
pub struct ElementConstructor<VX, VI, VE> {
    pub array: Box<[VX]>,
    pub index: VI,
    pub rhs: VE,
}

impl<VX, VI, VE> PropagatorConstructor for ElementConstructor<VX, VI, VE>
where
    VX: IntegerVariable,
    VI: IntegerVariable,
    VE: IntegerVariable,
{
    type PropagatorImpl = ElementPropagator<VX, VI, VE>;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for x_i in self.array.iter() {
            context.register(x_i, DomainEvents::BOUNDS);
        }
        context.register(&self.index, DomainEvents::ANY_INT);
        context.register(&self.rhs, DomainEvents::BOUNDS);

        ElementPropagator {
            array: self.array,
            index: self.index,
            rhs: self.rhs,
        }
    }
}

/// Bounds-consistent propagator for the constraint `array[index] = rhs`.
///
/// Indices whose element cannot take a value of `rhs` are removed from `index`; `rhs` is bounded
/// by the elements which remain possible, and once `index` is fixed the selected element is
/// bounded by `rhs`.
#[derive(Clone, Debug)]
pub struct ElementPropagator<VX, VI, VE> {
    array: Box<[VX]>,
    index: VI,
    rhs: VE,
}

impl<VX, VI, VE> ElementPropagator<VX, VI, VE>
where
    VX: IntegerVariable,
    VI: IntegerVariable,
    VE: IntegerVariable,
{
    fn intersects_rhs(&self, domains: &impl ReadDomains, i: i32) -> bool {
        let element = &self.array[i as usize];
        domains.lower_bound(element) <= domains.upper_bound(&self.rhs)
            && domains.upper_bound(element) >= domains.lower_bound(&self.rhs)
    }
}

impl<VX, VI, VE> Propagator for ElementPropagator<VX, VI, VE>
where
    VX: IntegerVariable,
    VI: IntegerVariable,
    VE: IntegerVariable,
{
    fn name(&self) -> &str {
        "Element"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        context.set_lower_bound(&self.index, 0)?;
        context.set_upper_bound(&self.index, self.array.len() as i32 - 1)?;

        let unsupported = context
            .iterate_domain(&self.index)
            .filter(|&i| !self.intersects_rhs(&context, i))
            .collect::<Vec<_>>();
        for i in unsupported {
            context.remove(&self.index, i)?;
        }

        let (mut rhs_lb, mut rhs_ub) = (i32::MAX, i32::MIN);
        for i in context.iterate_domain(&self.index).collect::<Vec<_>>() {
            let element = &self.array[i as usize];
            rhs_lb = rhs_lb.min(context.lower_bound(element));
            rhs_ub = rhs_ub.max(context.upper_bound(element));
        }
        context.set_lower_bound(&self.rhs, rhs_lb)?;
        context.set_upper_bound(&self.rhs, rhs_ub)?;

        if context.is_fixed(&self.index) {
            let element = &self.array[context.lower_bound(&self.index) as usize];
            let (lb, ub) = (context.lower_bound(&self.rhs), context.upper_bound(&self.rhs));
            context.set_lower_bound(element, lb)?;
            context.set_upper_bound(element, ub)?;
        }

        Ok(())
    }

    fn detect_inconsistency(&self, domains: Domains<'_>) -> bool {
        !domains
            .iterate_domain(&self.index)
            .filter(|&i| i >= 0 && (i as usize) < self.array.len())
            .any(|i| self.intersects_rhs(&domains, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;
    use crate::predicate;

    #[test]
    fn the_index_selects_the_bounds_of_rhs() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(0, 0);
        let b = solver.new_variable(7, 9);
        let index = solver.new_sparse_variable(&[0, 1]);
        let rhs = solver.new_variable(-5, 20);

        let _ = solver
            .new_propagator(ElementConstructor {
                array: [a, b].into(),
                index,
                rhs,
            })
            .expect("no empty domains");
        solver.assert_bounds(rhs, 0, 9);

        solver.post(predicate![index == 1]).expect("non-empty");
        solver.propagate().expect("no empty domains");
        solver.assert_bounds(rhs, 7, 9);
    }

    #[test]
    fn unsupported_indices_are_removed() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(0, 2);
        let b = solver.new_variable(5, 6);
        let c = solver.new_variable(1, 8);
        let index = solver.new_sparse_variable(&[0, 1, 2]);
        let rhs = solver.new_variable(5, 10);

        let _ = solver
            .new_propagator(ElementConstructor {
                array: [a, b, c].into(),
                index,
                rhs,
            })
            .expect("no empty domains");

        assert!(!solver.contains(index, 0));
        solver.assert_bounds(index, 1, 2);
        solver.assert_bounds(rhs, 5, 8);
    }

    #[test]
    fn a_fixed_index_bounds_the_element() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(0, 10);
        let index = solver.new_variable(0, 0);
        let rhs = solver.new_variable(3, 4);

        let _ = solver
            .new_propagator(ElementConstructor {
                array: [a].into(),
                index,
                rhs,
            })
            .expect("no empty domains");

        solver.assert_bounds(a, 3, 4);
    }
}
