use super::Domains;
use super::Propagator;
use super::PropagatorId;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::DomainEvents;
use crate::engine::WatchListCP;
use crate::engine::Watchers;

/// A propagator constructor turns an argument struct into an implementation of [`Propagator`].
///
/// The constructor registers the variables of the propagator for the events which should cause
/// the propagator to be enqueued.
pub trait PropagatorConstructor {
    /// The propagator to construct.
    type PropagatorImpl: Propagator;

    /// The constructor function.
    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl;
}

/// The context a [`PropagatorConstructor`] gets to set up its propagator.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    watch_list: &'a mut WatchListCP,
    assignments: &'a Assignments,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        watch_list: &'a mut WatchListCP,
        assignments: &'a Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            watch_list,
            assignments,
            propagator_id,
        }
    }

    /// Subscribes the propagator to the given events of `var`.
    pub fn register<Var: IntegerVariable>(&mut self, var: &Var, events: DomainEvents) {
        let mut watchers = Watchers::new(self.propagator_id, self.watch_list);
        var.watch(&mut watchers, events);
    }

    /// The domains at the moment the propagator is created.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments)
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }
}
