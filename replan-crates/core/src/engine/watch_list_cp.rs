use enum_map::EnumMap;
use enumset::EnumSet;

use super::DomainEvent;
use super::DomainEvents;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::propagation::PropagatorId;

/// For every integer variable and every event, the propagators which are enqueued when the event
/// happens.
#[derive(Default, Debug)]
pub(crate) struct WatchListCP {
    watchers: KeyedVec<DomainId, EnumMap<DomainEvent, Vec<PropagatorId>>>,
}

/// Used by a propagator to subscribe to the events of its variables.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator_id: PropagatorId,
    watch_list: &'a mut WatchListCP,
}

impl WatchListCP {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(EnumMap::default());
    }

    pub(crate) fn get_affected_propagators(
        &self,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
    ) -> impl Iterator<Item = PropagatorId> + '_ {
        events
            .iter()
            .flat_map(move |event| self.watchers[domain][event].iter().copied())
    }
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(propagator_id: PropagatorId, watch_list: &'a mut WatchListCP) -> Self {
        Watchers {
            propagator_id,
            watch_list,
        }
    }

    pub fn watch(&mut self, domain: DomainId, events: DomainEvents) {
        for event in events.get_int_events() {
            let watchers = &mut self.watch_list.watchers[domain][event];
            if !watchers.contains(&self.propagator_id) {
                watchers.push(self.propagator_id);
            }
        }
    }
}
