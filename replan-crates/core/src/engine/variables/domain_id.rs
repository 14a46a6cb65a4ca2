use std::fmt::Display;

use super::AffineView;
use super::IntegerVariable;
use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Solution;
use crate::containers::StorageKey;
use crate::engine::Assignments;
use crate::engine::DomainEvents;
use crate::engine::Watchers;

/// A handle to a domain owned by the solver.
#[derive(Clone, PartialEq, Eq, Copy, Hash, Debug, PartialOrd, Ord)]
pub struct DomainId {
    pub id: u32,
}

impl DomainId {
    pub fn new(id: u32) -> Self {
        DomainId { id }
    }
}

impl IntegerVariable for DomainId {
    type AffineView = AffineView<Self>;

    fn lower_bound(&self, assignment: &Assignments) -> i32 {
        assignment.get_lower_bound(*self)
    }

    fn upper_bound(&self, assignment: &Assignments) -> i32 {
        assignment.get_upper_bound(*self)
    }

    fn contains(&self, assignment: &Assignments, value: i32) -> bool {
        assignment.is_value_in_domain(*self, value)
    }

    fn iterate_domain<'a>(&self, assignment: &'a Assignments) -> impl Iterator<Item = i32> + 'a {
        assignment.iterate_domain(*self)
    }

    fn set_lower_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignment.tighten_lower_bound(*self, value)
    }

    fn set_upper_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignment.tighten_upper_bound(*self, value)
    }

    fn remove(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignment.remove_value_from_domain(*self, value)
    }

    fn value_in(&self, solution: &Solution) -> i32 {
        solution.get_value(*self)
    }

    fn watch(&self, watchers: &mut Watchers<'_>, events: DomainEvents) {
        watchers.watch(*self, events);
    }
}

impl TransformableVariable<AffineView<DomainId>> for DomainId {
    fn scaled(&self, scale: i32) -> AffineView<DomainId> {
        AffineView::new(*self, scale, 0)
    }

    fn offset(&self, offset: i32) -> AffineView<DomainId> {
        AffineView::new(*self, 1, offset)
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId { id: index as u32 }
    }
}

impl Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}
