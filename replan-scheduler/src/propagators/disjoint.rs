use replan_core::basic_types::PropagationStatus;
use replan_core::containers::HashSet;
use replan_core::propagation::DomainEvents;
use replan_core::propagation::PropagationContext;
use replan_core::propagation::Propagator;
use replan_core::propagation::PropagatorConstructor;
use replan_core::propagation::PropagatorConstructorContext;
use replan_core::propagation::ReadDomains;
use replan_core::variables::DomainId;

/// Constructor for [`DisjointPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct DisjointConstructor {
    pub(crate) first: Vec<DomainId>,
    pub(crate) second: Vec<DomainId>,
}

impl PropagatorConstructor for DisjointConstructor {
    type PropagatorImpl = DisjointPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for variable in self.first.iter().chain(self.second.iter()) {
            context.register(variable, DomainEvents::ASSIGN);
        }

        DisjointPropagator {
            first: self.first,
            second: self.second,
        }
    }
}

/// Propagator which ensures that no value is taken both by a variable of `first` and by a
/// variable of `second`.
#[derive(Clone, Debug)]
pub(crate) struct DisjointPropagator {
    first: Vec<DomainId>,
    second: Vec<DomainId>,
}

fn fixed_values(context: &impl ReadDomains, variables: &[DomainId]) -> HashSet<i32> {
    variables
        .iter()
        .filter(|variable| context.is_fixed(*variable))
        .map(|variable| context.lower_bound(variable))
        .collect()
}

fn exclude(
    context: &mut PropagationContext<'_>,
    variables: &[DomainId],
    values: &HashSet<i32>,
) -> PropagationStatus {
    for variable in variables.iter() {
        for &value in values.iter() {
            context.remove(variable, value)?;
        }
    }
    Ok(())
}

impl Propagator for DisjointPropagator {
    fn name(&self) -> &str {
        "Disjoint"
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        let taken_by_first = fixed_values(&context, &self.first);
        exclude(&mut context, &self.second, &taken_by_first)?;

        let taken_by_second = fixed_values(&context, &self.second);
        exclude(&mut context, &self.first, &taken_by_second)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use replan_core::predicate;
    use replan_core::Solver;

    use super::*;

    #[test]
    fn a_fixed_value_is_removed_from_the_other_group() {
        let mut solver = Solver::default();
        let first = solver.new_sparse_integer(vec![0, 1]);
        let second = solver.new_sparse_integer(vec![0, 1, 2]);
        let third = solver.new_sparse_integer(vec![0, 1, 2]);

        solver
            .add_propagator(DisjointConstructor {
                first: vec![first],
                second: vec![second, third],
            })
            .expect("feasible");
        solver.post(predicate!(second == 0)).expect("feasible");

        assert_eq!(1, solver.lower_bound(&first));
        assert!(solver.is_fixed(&first));
        assert!(!solver.contains(&third, 1));
        assert!(solver.contains(&third, 0));
    }
}
