use std::fmt::Debug;

use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Solution;
use crate::engine::Assignments;
use crate::engine::DomainEvents;
use crate::engine::Watchers;

/// A trait specifying the required behaviour of an integer variable such as retrieving a
/// lower-bound ([`IntegerVariable::lower_bound`]) or adjusting the bounds
/// ([`IntegerVariable::set_lower_bound`]).
pub trait IntegerVariable:
    Clone + Debug + TransformableVariable<Self::AffineView> + 'static
{
    type AffineView: IntegerVariable;

    /// Get the lower bound of the variable.
    fn lower_bound(&self, assignment: &Assignments) -> i32;

    /// Get the upper bound of the variable.
    fn upper_bound(&self, assignment: &Assignments) -> i32;

    /// Determine whether the value is in the domain of this variable.
    fn contains(&self, assignment: &Assignments, value: i32) -> bool;

    /// Iterate over the values of the domain, in increasing order.
    fn iterate_domain<'a>(&self, assignment: &'a Assignments) -> impl Iterator<Item = i32> + 'a;

    /// Tighten the lower bound of the domain of this variable.
    fn set_lower_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// Tighten the upper bound of the domain of this variable.
    fn set_upper_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// Remove a value from the domain of this variable.
    fn remove(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// The value the variable takes in the given solution.
    fn value_in(&self, solution: &Solution) -> i32;

    /// Register a watch for this variable on the given domain events.
    fn watch(&self, watchers: &mut Watchers<'_>, events: DomainEvents);

    /// Whether the domain of the variable is a single value.
    fn is_fixed(&self, assignment: &Assignments) -> bool {
        self.lower_bound(assignment) == self.upper_bound(assignment)
    }
}
