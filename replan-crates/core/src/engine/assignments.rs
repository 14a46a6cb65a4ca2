use enumset::EnumSet;

use super::DomainEvent;
use super::TrailedCell;
use super::TrailedValues;
use crate::basic_types::EmptyDomain;
use crate::containers::KeyedVec;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;
use crate::engine::variables::DomainId;
use crate::replan_assert_moderate;
use crate::replan_assert_simple;

/// The domains of all integer variables.
///
/// A domain is either an interval (only its bounds are stored, removing an inner value is a no-op)
/// or enumerated (every value of the initial interval has a flag which records its removal). All
/// the state is kept in backtrackable cells, so the domains follow the worlds of the search.
#[derive(Clone, Debug, Default)]
pub struct Assignments {
    domains: KeyedVec<DomainId, IntegerDomain>,
    bounds: TrailedValues<i32>,
    removed: TrailedValues<bool>,
    /// The events which happened since the last time they were drained.
    events: Vec<(DomainId, EnumSet<DomainEvent>)>,
}

#[derive(Clone, Debug)]
struct IntegerDomain {
    lower_bound: TrailedCell,
    upper_bound: TrailedCell,
    holes: Option<Holes>,
}

#[derive(Clone, Debug)]
struct Holes {
    initial_lower_bound: i32,
    size: TrailedCell,
    removed: Box<[TrailedCell]>,
}

impl Assignments {
    /// Creates an interval domain `[lower_bound, upper_bound]`.
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        replan_assert_simple!(lower_bound <= upper_bound, "the initial domain must be non-empty");

        let lower_bound = self.bounds.grow(lower_bound);
        let upper_bound = self.bounds.grow(upper_bound);

        self.domains.push(IntegerDomain {
            lower_bound,
            upper_bound,
            holes: None,
        })
    }

    /// Creates an enumerated domain containing exactly the given values.
    pub(crate) fn grow_enumerated(&mut self, values: &[i32]) -> DomainId {
        let mut values = values.to_vec();
        values.sort_unstable();
        values.dedup();
        replan_assert_simple!(!values.is_empty(), "the initial domain must be non-empty");

        let initial_lower_bound = values[0];
        let initial_upper_bound = values[values.len() - 1];

        let removed = (initial_lower_bound..=initial_upper_bound)
            .map(|value| self.removed.grow(values.binary_search(&value).is_err()))
            .collect();

        let lower_bound = self.bounds.grow(initial_lower_bound);
        let upper_bound = self.bounds.grow(initial_upper_bound);
        let size = self.bounds.grow(values.len() as i32);

        self.domains.push(IntegerDomain {
            lower_bound,
            upper_bound,
            holes: Some(Holes {
                initial_lower_bound,
                size,
                removed,
            }),
        })
    }

    pub fn num_domains(&self) -> u32 {
        self.domains.len() as u32
    }

    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    pub fn get_lower_bound(&self, domain: DomainId) -> i32 {
        self.bounds.read(self.domains[domain].lower_bound)
    }

    pub fn get_upper_bound(&self, domain: DomainId) -> i32 {
        self.bounds.read(self.domains[domain].upper_bound)
    }

    pub fn get_domain_size(&self, domain: DomainId) -> u32 {
        match &self.domains[domain].holes {
            Some(holes) => self.bounds.read(holes.size) as u32,
            None => (self.get_upper_bound(domain) - self.get_lower_bound(domain) + 1) as u32,
        }
    }

    pub fn is_domain_assigned(&self, domain: DomainId) -> bool {
        self.get_lower_bound(domain) == self.get_upper_bound(domain)
    }

    pub fn get_assigned_value(&self, domain: DomainId) -> Option<i32> {
        self.is_domain_assigned(domain)
            .then(|| self.get_lower_bound(domain))
    }

    /// Whether the domain of `domain` keeps track of removed inner values.
    pub fn is_enumerated(&self, domain: DomainId) -> bool {
        self.domains[domain].holes.is_some()
    }

    pub fn is_value_in_domain(&self, domain: DomainId, value: i32) -> bool {
        value >= self.get_lower_bound(domain)
            && value <= self.get_upper_bound(domain)
            && !self.is_removed(domain, value)
    }

    /// Iterates over the values in the domain in increasing order.
    pub fn iterate_domain(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        (self.get_lower_bound(domain)..=self.get_upper_bound(domain))
            .filter(move |&value| !self.is_removed(domain, value))
    }

    fn is_removed(&self, domain: DomainId, value: i32) -> bool {
        self.domains[domain].holes.as_ref().is_some_and(|holes| {
            self.removed
                .read(holes.removed[(value - holes.initial_lower_bound) as usize])
        })
    }

    /// The number of values present in `[from, to]` which are in the domain.
    fn count_present(&self, domain: DomainId, from: i32, to: i32) -> i32 {
        if from > to {
            return 0;
        }
        match self.domains[domain].holes {
            Some(_) => (from..=to)
                .filter(|&value| !self.is_removed(domain, value))
                .count() as i32,
            None => to - from + 1,
        }
    }

    pub(crate) fn tighten_lower_bound(
        &mut self,
        domain: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        let lower_bound = self.get_lower_bound(domain);
        if value <= lower_bound {
            return Ok(());
        }

        let upper_bound = self.get_upper_bound(domain);
        if value > upper_bound {
            return Err(EmptyDomain);
        }

        // The upper bound is always in the domain, so a new lower bound exists.
        let new_lower_bound = (value..=upper_bound)
            .find(|&candidate| !self.is_removed(domain, candidate))
            .ok_or(EmptyDomain)?;
        self.shrink_size(domain, self.count_present(domain, lower_bound, new_lower_bound - 1));
        self.bounds
            .assign(self.domains[domain].lower_bound, new_lower_bound);

        let mut events = EnumSet::only(DomainEvent::LowerBound);
        if new_lower_bound == upper_bound {
            events |= DomainEvent::Assign;
        }
        self.events.push((domain, events));

        Ok(())
    }

    pub(crate) fn tighten_upper_bound(
        &mut self,
        domain: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        let upper_bound = self.get_upper_bound(domain);
        if value >= upper_bound {
            return Ok(());
        }

        let lower_bound = self.get_lower_bound(domain);
        if value < lower_bound {
            return Err(EmptyDomain);
        }

        let new_upper_bound = (lower_bound..=value)
            .rev()
            .find(|&candidate| !self.is_removed(domain, candidate))
            .ok_or(EmptyDomain)?;
        self.shrink_size(domain, self.count_present(domain, new_upper_bound + 1, upper_bound));
        self.bounds
            .assign(self.domains[domain].upper_bound, new_upper_bound);

        let mut events = EnumSet::only(DomainEvent::UpperBound);
        if new_upper_bound == lower_bound {
            events |= DomainEvent::Assign;
        }
        self.events.push((domain, events));

        Ok(())
    }

    pub(crate) fn make_assignment(
        &mut self,
        domain: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        if !self.is_value_in_domain(domain, value) {
            return Err(EmptyDomain);
        }

        self.tighten_lower_bound(domain, value)?;
        self.tighten_upper_bound(domain, value)
    }

    /// Removes `value` from the domain. For interval domains only the bounds can be removed.
    pub(crate) fn remove_value_from_domain(
        &mut self,
        domain: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        if !self.is_value_in_domain(domain, value) {
            return Ok(());
        }

        let lower_bound = self.get_lower_bound(domain);
        let upper_bound = self.get_upper_bound(domain);

        if lower_bound == upper_bound {
            Err(EmptyDomain)
        } else if value == lower_bound {
            self.tighten_lower_bound(domain, value + 1)
        } else if value == upper_bound {
            self.tighten_upper_bound(domain, value - 1)
        } else if let Some(holes) = &self.domains[domain].holes {
            let cell = holes.removed[(value - holes.initial_lower_bound) as usize];
            self.removed.assign(cell, true);
            self.shrink_size(domain, 1);
            self.events
                .push((domain, EnumSet::only(DomainEvent::Removal)));
            Ok(())
        } else {
            Ok(())
        }
    }

    fn shrink_size(&mut self, domain: DomainId, amount: i32) {
        if let Some(holes) = &self.domains[domain].holes {
            let size = self.bounds.read(holes.size);
            replan_assert_moderate!(size > amount);
            self.bounds.assign(holes.size, size - amount);
        }
    }

    /// Applies the predicate to the domains.
    pub(crate) fn post_predicate(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => self.tighten_lower_bound(domain, value),
            PredicateType::UpperBound => self.tighten_upper_bound(domain, value),
            PredicateType::Equal => self.make_assignment(domain, value),
            PredicateType::NotEqual => self.remove_value_from_domain(domain, value),
        }
    }

    /// Returns `Some(true)` if the predicate holds under the current domains, `Some(false)` if it
    /// cannot hold, and `None` if it is undecided.
    pub fn evaluate_predicate(&self, predicate: Predicate) -> Option<bool> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();
        let lower_bound = self.get_lower_bound(domain);
        let upper_bound = self.get_upper_bound(domain);

        match predicate.get_predicate_type() {
            PredicateType::LowerBound if lower_bound >= value => Some(true),
            PredicateType::LowerBound if upper_bound < value => Some(false),
            PredicateType::UpperBound if upper_bound <= value => Some(true),
            PredicateType::UpperBound if lower_bound > value => Some(false),
            PredicateType::Equal | PredicateType::NotEqual => {
                let is_equal = if !self.is_value_in_domain(domain, value) {
                    Some(false)
                } else if lower_bound == upper_bound {
                    Some(true)
                } else {
                    None
                };
                if predicate.is_equality_predicate() {
                    is_equal
                } else {
                    is_equal.map(|holds| !holds)
                }
            }
            _ => None,
        }
    }

    pub(crate) fn drain_events(&mut self) -> std::vec::Drain<'_, (DomainId, EnumSet<DomainEvent>)> {
        self.events.drain(..)
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn current_world(&self) -> usize {
        self.bounds.current_world()
    }

    pub(crate) fn world_push(&mut self) {
        self.bounds.world_push();
        self.removed.world_push();
    }

    pub(crate) fn world_pop(&mut self) {
        self.removed.world_pop();
        self.bounds.world_pop();
        self.events.clear();
    }

    pub(crate) fn world_commit(&mut self) {
        self.removed.world_commit();
        self.bounds.world_commit();
    }
}
