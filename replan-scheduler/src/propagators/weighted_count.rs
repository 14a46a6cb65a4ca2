use replan_core::basic_types::Inconsistency;
use replan_core::basic_types::PropagationStatus;
use replan_core::containers::HashSet;
use replan_core::propagation::DomainEvents;
use replan_core::propagation::Domains;
use replan_core::propagation::Priority;
use replan_core::propagation::PropagationContext;
use replan_core::propagation::Propagator;
use replan_core::propagation::PropagatorConstructor;
use replan_core::propagation::PropagatorConstructorContext;
use replan_core::propagation::ReadDomains;
use replan_core::variables::DomainId;

/// Constructor for [`WeightedCountPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct WeightedCountConstructor {
    /// The variables together with their weight.
    pub(crate) terms: Vec<(DomainId, i32)>,
    pub(crate) values: Vec<i32>,
    pub(crate) bound: i64,
}

impl PropagatorConstructor for WeightedCountConstructor {
    type PropagatorImpl = WeightedCountPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for (variable, _) in self.terms.iter() {
            context.register(variable, DomainEvents::ANY_INT);
        }

        WeightedCountPropagator {
            terms: self
                .terms
                .into_iter()
                .filter(|&(_, weight)| weight > 0)
                .collect(),
            values: self.values.into_iter().collect(),
            bound: self.bound,
        }
    }
}

/// Propagator for `sum_i w_i * [x_i in S] <= c` with non-negative weights.
///
/// The variables whose domain lies within `S` contribute for sure; any other variable whose
/// weight no longer fits gets the values of `S` removed.
#[derive(Clone, Debug)]
pub(crate) struct WeightedCountPropagator {
    terms: Vec<(DomainId, i32)>,
    values: HashSet<i32>,
    bound: i64,
}

impl WeightedCountPropagator {
    fn is_counted(&self, context: &impl ReadDomains, variable: &DomainId) -> bool {
        context
            .iterate_domain(variable)
            .all(|value| self.values.contains(&value))
    }

    fn may_be_counted(&self, context: &impl ReadDomains, variable: &DomainId) -> bool {
        self.values
            .iter()
            .any(|&value| context.contains(variable, value))
    }
}

impl Propagator for WeightedCountPropagator {
    fn name(&self) -> &str {
        "WeightedCount"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        let mut counted = vec![false; self.terms.len()];
        let mut load = 0_i64;
        for (index, (variable, weight)) in self.terms.iter().enumerate() {
            if self.is_counted(&context, variable) {
                counted[index] = true;
                load += i64::from(*weight);
            }
        }

        if load > self.bound {
            return Err(Inconsistency::Propagator);
        }

        for (index, (variable, weight)) in self.terms.iter().enumerate() {
            if counted[index] || load + i64::from(*weight) <= self.bound {
                continue;
            }
            if !self.may_be_counted(&context, variable) {
                continue;
            }
            for &value in self.values.iter() {
                context.remove(variable, value)?;
            }
        }

        Ok(())
    }

    fn detect_inconsistency(&self, domains: Domains<'_>) -> bool {
        let load: i64 = self
            .terms
            .iter()
            .filter(|(variable, _)| self.is_counted(&domains, variable))
            .map(|&(_, weight)| i64::from(weight))
            .sum();
        load > self.bound
    }
}
