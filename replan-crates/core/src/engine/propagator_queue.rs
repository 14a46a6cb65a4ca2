use std::collections::VecDeque;

use enum_map::EnumMap;

use crate::containers::KeyedVec;
use crate::propagation::Priority;
use crate::propagation::PropagatorId;

/// The propagators which still have to run before the domains are at a fixpoint, one FIFO per
/// [`Priority`].
#[derive(Debug, Clone, Default)]
pub(crate) struct PropagatorQueue {
    queues: EnumMap<Priority, VecDeque<PropagatorId>>,
    is_enqueued: KeyedVec<PropagatorId, bool>,
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }

    /// Schedules the propagator unless it is already waiting.
    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        if self.is_propagator_enqueued(propagator_id) {
            return;
        }

        self.is_enqueued.grow_to_fit(propagator_id, false);
        self.is_enqueued[propagator_id] = true;
        self.queues[priority].push_back(propagator_id);
    }

    /// The longest waiting propagator of the most urgent non-empty priority.
    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let propagator_id = self.queues.values_mut().find_map(VecDeque::pop_front)?;
        self.is_enqueued[propagator_id] = false;
        Some(propagator_id)
    }

    pub(crate) fn clear(&mut self) {
        for queue in self.queues.values_mut() {
            for propagator_id in queue.drain(..) {
                self.is_enqueued[propagator_id] = false;
            }
        }
    }

    pub(crate) fn is_propagator_enqueued(&self, propagator_id: PropagatorId) -> bool {
        self.is_enqueued
            .get(propagator_id)
            .copied()
            .unwrap_or(false)
    }
}
