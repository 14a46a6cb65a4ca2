use enumset::EnumSet;

use super::IntegerVariable;
use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Solution;
use crate::engine::Assignments;
use crate::engine::DomainEvent;
use crate::engine::DomainEvents;
use crate::engine::Watchers;
use crate::math::div_round_down;
use crate::math::div_round_up;

/// Models the constraint `y = ax + b`, by expressing the domain of `y` as a transformation of the
/// domain of `x`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct AffineView<Inner> {
    inner: Inner,
    scale: i32,
    offset: i32,
}

impl<Inner> AffineView<Inner> {
    pub fn new(inner: Inner, scale: i32, offset: i32) -> Self {
        assert_ne!(scale, 0, "Multiplication by zero is not invertable");
        AffineView {
            inner,
            scale,
            offset,
        }
    }

    pub fn inner(&self) -> &Inner {
        &self.inner
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Apply the inverse transformation of this view on a value, to go from the value in the domain
    /// of `self` to a value in the domain of `self.inner`.
    fn invert(&self, value: i32, rounding: Rounding) -> i32 {
        let inverted_translation = value - self.offset;

        match rounding {
            Rounding::Up => div_round_up(inverted_translation, self.scale),
            Rounding::Down => div_round_down(inverted_translation, self.scale),
        }
    }

    /// The value in the domain of `self.inner` which maps onto `value`, if there is one.
    fn invert_exact(&self, value: i32) -> Option<i32> {
        let inverted_translation = value - self.offset;
        (inverted_translation % self.scale == 0).then(|| inverted_translation / self.scale)
    }

    fn map(&self, value: i32) -> i32 {
        self.scale * value + self.offset
    }
}

impl<View> IntegerVariable for AffineView<View>
where
    View: IntegerVariable,
{
    type AffineView = Self;

    fn lower_bound(&self, assignment: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.upper_bound(assignment))
        } else {
            self.map(self.inner.lower_bound(assignment))
        }
    }

    fn upper_bound(&self, assignment: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.lower_bound(assignment))
        } else {
            self.map(self.inner.upper_bound(assignment))
        }
    }

    fn contains(&self, assignment: &Assignments, value: i32) -> bool {
        self.invert_exact(value)
            .is_some_and(|inverted| self.inner.contains(assignment, inverted))
    }

    fn iterate_domain<'a>(&self, assignment: &'a Assignments) -> impl Iterator<Item = i32> + 'a {
        let (scale, offset) = (self.scale, self.offset);
        let mut values = self
            .inner
            .iterate_domain(assignment)
            .map(move |value| scale * value + offset)
            .collect::<Vec<_>>();
        if self.scale < 0 {
            values.reverse();
        }
        values.into_iter()
    }

    fn set_lower_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if self.scale >= 0 {
            self.inner
                .set_lower_bound(assignment, self.invert(value, Rounding::Up))
        } else {
            self.inner
                .set_upper_bound(assignment, self.invert(value, Rounding::Down))
        }
    }

    fn set_upper_bound(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if self.scale >= 0 {
            self.inner
                .set_upper_bound(assignment, self.invert(value, Rounding::Down))
        } else {
            self.inner
                .set_lower_bound(assignment, self.invert(value, Rounding::Up))
        }
    }

    fn remove(&self, assignment: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        match self.invert_exact(value) {
            Some(inverted) => self.inner.remove(assignment, inverted),
            None => Ok(()),
        }
    }

    fn value_in(&self, solution: &Solution) -> i32 {
        self.map(self.inner.value_in(solution))
    }

    fn watch(&self, watchers: &mut Watchers<'_>, events: DomainEvents) {
        let events = if self.scale < 0 {
            DomainEvents::from_int_events(flip_bound_events(events.get_int_events()))
        } else {
            events
        };
        self.inner.watch(watchers, events);
    }
}

impl<View> TransformableVariable<AffineView<View>> for AffineView<View>
where
    View: IntegerVariable,
{
    fn scaled(&self, scale: i32) -> AffineView<View> {
        let mut result = self.clone();
        result.scale *= scale;
        result.offset *= scale;
        result
    }

    fn offset(&self, offset: i32) -> AffineView<View> {
        let mut result = self.clone();
        result.offset += offset;
        result
    }
}

/// A negative scale turns lower-bound events on the view into upper-bound events on the inner
/// variable and vice versa.
fn flip_bound_events(events: EnumSet<DomainEvent>) -> EnumSet<DomainEvent> {
    events
        .iter()
        .map(|event| match event {
            DomainEvent::LowerBound => DomainEvent::UpperBound,
            DomainEvent::UpperBound => DomainEvent::LowerBound,
            event => event,
        })
        .collect()
}

enum Rounding {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_up_rounds_towards_the_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);
        let view = AffineView::new(x, 2, 0);

        view.set_lower_bound(&mut assignments, 3).expect("non-empty");
        view.set_upper_bound(&mut assignments, 9).expect("non-empty");

        assert_eq!(2, assignments.get_lower_bound(x));
        assert_eq!(4, assignments.get_upper_bound(x));
        assert_eq!(4, view.lower_bound(&assignments));
        assert_eq!(8, view.upper_bound(&assignments));
    }

    #[test]
    fn negated_view_swaps_the_bounds() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(2, 5);
        let view = x.scaled(-1).offset(10);

        assert_eq!(5, view.lower_bound(&assignments));
        assert_eq!(8, view.upper_bound(&assignments));

        view.set_upper_bound(&mut assignments, 7).expect("non-empty");
        assert_eq!(3, assignments.get_lower_bound(x));
    }

    #[test]
    fn removing_an_unreachable_value_is_a_no_op() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[0, 1, 2]);
        let view = x.scaled(2);

        view.remove(&mut assignments, 3).expect("non-empty");
        assert_eq!(3, assignments.get_domain_size(x));

        view.remove(&mut assignments, 2).expect("non-empty");
        assert!(!assignments.is_value_in_domain(x, 1));
    }

    #[test]
    fn domain_iteration_is_increasing() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[1, 3, 4]);
        let view = x.scaled(-2);

        assert_eq!(
            vec![-8, -6, -2],
            view.iterate_domain(&assignments).collect::<Vec<_>>()
        );
    }
}
