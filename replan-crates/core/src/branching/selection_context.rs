use rand::rngs::SmallRng;

#[cfg(doc)]
use crate::branching::Brancher;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
#[cfg(doc)]
use crate::propagation::PropagationContext;

/// The context provided to the [`Brancher`], the behaviour is similar to that of the
/// [`PropagationContext`] with a few additional methods.
#[derive(Debug)]
pub struct SelectionContext<'a> {
    assignments: &'a Assignments,
    random_generator: &'a mut SmallRng,
}

impl<'a> SelectionContext<'a> {
    pub fn new(assignments: &'a Assignments, rng: &'a mut SmallRng) -> Self {
        SelectionContext {
            assignments,
            random_generator: rng,
        }
    }

    /// Returns a random generator which can be used to generate random values.
    pub fn random(&mut self) -> &mut SmallRng {
        self.random_generator
    }

    /// Returns the difference between the upper-bound and the lower-bound of the provided
    /// variable. Note that this is different from the number of values which are in the domain
    /// of `var` since this calculation does not take into account holes in the domain.
    pub fn get_size_of_domain<Var: IntegerVariable>(&self, var: Var) -> i32 {
        var.upper_bound(self.assignments) - var.lower_bound(self.assignments)
    }

    pub fn lower_bound<Var: IntegerVariable>(&self, var: Var) -> i32 {
        var.lower_bound(self.assignments)
    }

    pub fn upper_bound<Var: IntegerVariable>(&self, var: Var) -> i32 {
        var.upper_bound(self.assignments)
    }

    pub fn contains<Var: IntegerVariable>(&self, var: Var, value: i32) -> bool {
        var.contains(self.assignments, value)
    }

    /// The values in the domain of `var` in increasing order.
    pub fn iterate_domain<Var: IntegerVariable>(&self, var: Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.assignments).collect::<Vec<_>>().into_iter()
    }

    /// Determines whether the provided variable has a unit domain (i.e. a domain of size 1).
    pub fn is_integer_fixed<Var: IntegerVariable>(&self, var: Var) -> bool {
        var.is_fixed(self.assignments)
    }

    /// Returns all currently defined [`DomainId`]s.
    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.assignments.get_domains()
    }
}
