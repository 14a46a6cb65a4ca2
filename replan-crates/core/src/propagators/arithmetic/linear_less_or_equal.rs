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

/// Constructor for [`LinearLessOrEqualPropagator`].
#[derive(Clone, Debug)]
pub struct LinearLessOrEqualConstructor<Var> {
    x: Box<[Var]>,
    c: i32,
}

impl<Var> LinearLessOrEqualConstructor<Var> {
    pub fn new(x: Box<[Var]>, c: i32) -> Self {
        LinearLessOrEqualConstructor { x, c }
    }
}

impl<Var: IntegerVariable> PropagatorConstructor for LinearLessOrEqualConstructor<Var> {
    type PropagatorImpl = LinearLessOrEqualPropagator<Var>;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for x_i in self.x.iter() {
            context.register(x_i, DomainEvents::LOWER_BOUND);
        }

        LinearLessOrEqualPropagator {
            x: self.x,
            c: self.c,
        }
    }
}

/// Propagator for the constraint `\sum x_i <= c`.
#[derive(Clone, Debug)]
pub struct LinearLessOrEqualPropagator<Var> {
    x: Box<[Var]>,
    c: i32,
}

impl<Var: IntegerVariable> LinearLessOrEqualPropagator<Var> {
    fn lower_bound_left_hand_side(&self, domains: &impl ReadDomains) -> i64 {
        self.x
            .iter()
            .map(|var| domains.lower_bound(var) as i64)
            .sum()
    }
}

impl<Var: IntegerVariable> Propagator for LinearLessOrEqualPropagator<Var> {
    fn name(&self) -> &str {
        "LinearLeq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        let lb_lhs = self.lower_bound_left_hand_side(&context);
        let slack = self.c as i64 - lb_lhs;

        if slack < 0 {
            return Err(Inconsistency::Propagator);
        }

        for x_i in self.x.iter() {
            let bound = context.lower_bound(x_i) as i64 + slack;

            if (context.upper_bound(x_i) as i64) > bound {
                context.set_upper_bound(x_i, bound as i32)?;
            }
        }

        Ok(())
    }

    fn detect_inconsistency(&self, domains: Domains<'_>) -> bool {
        self.lower_bound_left_hand_side(&domains) > self.c as i64
    }
}
