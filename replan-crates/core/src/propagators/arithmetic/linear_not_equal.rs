use crate::basic_types::Inconsistency;
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

/// Constructor for [`LinearNotEqualPropagator`].
#[derive(Clone, Debug)]
pub struct LinearNotEqualConstructor<Var> {
    terms: Box<[Var]>,
    rhs: i32,
}

impl<Var> LinearNotEqualConstructor<Var> {
    pub fn new(terms: Box<[Var]>, rhs: i32) -> Self {
        LinearNotEqualConstructor { terms, rhs }
    }
}

impl<Var: IntegerVariable> PropagatorConstructor for LinearNotEqualConstructor<Var> {
    type PropagatorImpl = LinearNotEqualPropagator<Var>;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for term in self.terms.iter() {
            context.register(term, DomainEvents::ASSIGN);
        }

        LinearNotEqualPropagator {
            terms: self.terms,
            rhs: self.rhs,
        }
    }
}

/// Propagator for the constraint `\sum x_i != rhs`.
///
/// The propagator only acts once at most one of the terms is unfixed.
#[derive(Clone, Debug)]
pub struct LinearNotEqualPropagator<Var> {
    terms: Box<[Var]>,
    rhs: i32,
}

impl<Var: IntegerVariable> LinearNotEqualPropagator<Var> {
    /// Sums the fixed terms and collects the unfixed ones, stopping at the second unfixed term.
    fn split_fixed(&self, domains: &impl ReadDomains) -> (i64, Vec<&Var>) {
        let mut fixed_sum = 0;
        let mut unfixed = vec![];
        for term in self.terms.iter() {
            if domains.is_fixed(term) {
                fixed_sum += domains.lower_bound(term) as i64;
            } else {
                unfixed.push(term);
                if unfixed.len() > 1 {
                    break;
                }
            }
        }
        (fixed_sum, unfixed)
    }
}

impl<Var: IntegerVariable> Propagator for LinearNotEqualPropagator<Var> {
    fn name(&self) -> &str {
        "LinearNe"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        let (fixed_sum, unfixed) = self.split_fixed(&context);

        match unfixed.as_slice() {
            [] if fixed_sum == self.rhs as i64 => Err(Inconsistency::Propagator),
            [term] => {
                let value = self.rhs as i64 - fixed_sum;
                if let Ok(value) = i32::try_from(value) {
                    context.remove(*term, value)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn detect_inconsistency(&self, domains: Domains<'_>) -> bool {
        let (fixed_sum, unfixed) = self.split_fixed(&domains);
        unfixed.is_empty() && fixed_sum == self.rhs as i64
    }
}
