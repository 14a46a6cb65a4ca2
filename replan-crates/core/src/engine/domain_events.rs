use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A change to the domain of an integer variable which propagators can subscribe to.
#[derive(Debug, EnumSetType, Hash, enum_map::Enum)]
pub enum DomainEvent {
    /// The domain has been reduced to a single value.
    Assign,
    /// The lower bound has been tightened.
    LowerBound,
    /// The upper bound has been tightened.
    UpperBound,
    /// A value strictly between the bounds has been removed.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DomainEvent::Assign => "Assign",
            DomainEvent::LowerBound => "LB",
            DomainEvent::UpperBound => "UB",
            DomainEvent::Removal => "Removal",
        };
        write!(f, "[Event:{name}]")
    }
}

/// A set of [`DomainEvent`]s which a propagator subscribes to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DomainEvents {
    int_events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// DomainEvents with both lower and upper bound tightening (but not other value removal).
    pub const BOUNDS: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// DomainEvents with lower and upper bound tightening, assigning to a single value, and
    /// single value removal.
    pub const ANY_INT: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));
    /// DomainEvents with only lower bound tightening.
    pub const LOWER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::LowerBound));
    /// DomainEvents with only upper bound tightening.
    pub const UPPER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::UpperBound));
    /// DomainEvents with only assigning to a single value.
    pub const ASSIGN: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::Assign));

    pub(crate) const fn create_with_int_events(int_events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { int_events }
    }

    pub(crate) fn from_int_events(int_events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { int_events }
    }

    pub(crate) fn get_int_events(&self) -> EnumSet<DomainEvent> {
        self.int_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_do_not_contain_removals() {
        assert!(!DomainEvents::BOUNDS
            .get_int_events()
            .contains(DomainEvent::Removal));
        assert!(DomainEvents::ANY_INT
            .get_int_events()
            .is_superset(DomainEvents::BOUNDS.get_int_events()));
    }

    #[test]
    fn events_are_displayed_in_brackets() {
        assert_eq!("[Event:LB]", DomainEvent::LowerBound.to_string());
    }
}
