use std::fmt::Display;
use std::ops::Not;

use crate::engine::variables::DomainId;

/// The relation a [`Predicate`] imposes between its variable and its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredicateType {
    LowerBound,
    UpperBound,
    Equal,
    NotEqual,
}

/// A predicate over a single variable, e.g. `[x >= 5]`.
///
/// Predicates are created with the [`predicate!`](crate::predicate) macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Predicate {
    domain: DomainId,
    predicate_type: PredicateType,
    value: i32,
}

impl Predicate {
    pub(crate) fn new(domain: DomainId, predicate_type: PredicateType, value: i32) -> Self {
        Predicate {
            domain,
            predicate_type,
            value,
        }
    }

    pub fn get_domain(&self) -> DomainId {
        self.domain
    }

    pub fn get_right_hand_side(&self) -> i32 {
        self.value
    }

    pub fn get_predicate_type(&self) -> PredicateType {
        self.predicate_type
    }

    pub fn is_lower_bound_predicate(&self) -> bool {
        self.predicate_type == PredicateType::LowerBound
    }

    pub fn is_upper_bound_predicate(&self) -> bool {
        self.predicate_type == PredicateType::UpperBound
    }

    pub fn is_equality_predicate(&self) -> bool {
        self.predicate_type == PredicateType::Equal
    }

    pub fn is_not_equal_predicate(&self) -> bool {
        self.predicate_type == PredicateType::NotEqual
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        let (predicate_type, value) = match self.predicate_type {
            PredicateType::LowerBound => (PredicateType::UpperBound, self.value - 1),
            PredicateType::UpperBound => (PredicateType::LowerBound, self.value + 1),
            PredicateType::Equal => (PredicateType::NotEqual, self.value),
            PredicateType::NotEqual => (PredicateType::Equal, self.value),
        };

        Predicate::new(self.domain, predicate_type, value)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let relation = match self.predicate_type {
            PredicateType::LowerBound => ">=",
            PredicateType::UpperBound => "<=",
            PredicateType::Equal => "==",
            PredicateType::NotEqual => "!=",
        };

        write!(f, "[{} {relation} {}]", self.domain, self.value)
    }
}
