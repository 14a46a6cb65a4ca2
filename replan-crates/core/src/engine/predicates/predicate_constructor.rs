use super::predicate::Predicate;
use super::predicate::PredicateType;
use crate::engine::variables::DomainId;

/// Variables over which the [`predicate!`](crate::predicate) macro can build a [`Predicate`].
pub trait PredicateConstructor {
    fn predicate(&self, predicate_type: PredicateType, value: i32) -> Predicate;
}

impl PredicateConstructor for DomainId {
    fn predicate(&self, predicate_type: PredicateType, value: i32) -> Predicate {
        Predicate::new(*self, predicate_type, value)
    }
}

impl<Variable: PredicateConstructor + ?Sized> PredicateConstructor for &Variable {
    fn predicate(&self, predicate_type: PredicateType, value: i32) -> Predicate {
        (**self).predicate(predicate_type, value)
    }
}

/// Builds a [`Predicate`] from a comparison between a variable and a value. The variable may be
/// a field path or an indexed expression.
///
/// # Example
/// ```rust
/// # use replan_core::Solver;
/// # use replan_core::predicate;
/// # use replan_core::predicates::PredicateType;
/// let mut solver = Solver::default();
/// let hosts = [solver.new_bounded_integer(0, 3)];
///
/// let stays = predicate!(hosts[0] == 2);
/// assert_eq!(hosts[0], stays.get_domain());
/// assert_eq!(PredicateType::Equal, stays.get_predicate_type());
/// assert_eq!(!stays, predicate!(hosts[0] != 2));
/// ```
#[macro_export]
macro_rules! predicate {
    ($($var:ident).+$([$index:expr])? >= $value:expr) => {
        $crate::predicate!(@build $($var).+$([$index])?, LowerBound, $value)
    };
    ($($var:ident).+$([$index:expr])? <= $value:expr) => {
        $crate::predicate!(@build $($var).+$([$index])?, UpperBound, $value)
    };
    ($($var:ident).+$([$index:expr])? == $value:expr) => {
        $crate::predicate!(@build $($var).+$([$index])?, Equal, $value)
    };
    ($($var:ident).+$([$index:expr])? != $value:expr) => {
        $crate::predicate!(@build $($var).+$([$index])?, NotEqual, $value)
    };
    (@build $variable:expr, $predicate_type:ident, $value:expr) => {
        $crate::predicates::PredicateConstructor::predicate(
            &$variable,
            $crate::predicates::PredicateType::$predicate_type,
            $value,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_paths_are_accepted() {
        struct Transition {
            host: DomainId,
        }
        let transition = Transition {
            host: DomainId::new(0),
        };

        let predicate = predicate![transition.host <= 3];

        assert_eq!(transition.host, predicate.get_domain());
        assert_eq!(PredicateType::UpperBound, predicate.get_predicate_type());
        assert_eq!(3, predicate.get_right_hand_side());
    }

    #[test]
    fn the_value_may_be_an_expression() {
        let hosts = [DomainId::new(0), DomainId::new(1)];
        let offset = 2;

        let predicate = predicate![hosts[1] >= offset + 1];

        assert_eq!(hosts[1], predicate.get_domain());
        assert_eq!(3, predicate.get_right_hand_side());
    }
}
