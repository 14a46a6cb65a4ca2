use std::fmt::Debug;
use std::fmt::Formatter;

use log::trace;

use super::Assignments;
use super::PropagatorQueue;
use super::WatchListCP;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::containers::KeyedVec;
use crate::statistics_counters;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorId;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

statistics_counters!(
    /// Counters of the propagation engine.
    PropagationStatistics {
        /// The number of times a propagator was called.
        num_propagator_calls: u64,
        /// The number of propagations which ended in an inconsistency.
        num_conflicts: u64,
});

/// The domains together with the propagators which act on them.
///
/// Every change made to the domains is undone when the world it happened in is popped.
pub(crate) struct State {
    assignments: Assignments,
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
    watch_list: WatchListCP,
    propagator_queue: PropagatorQueue,
    statistics: PropagationStatistics,
}

impl Default for State {
    fn default() -> Self {
        State {
            assignments: Assignments::default(),
            propagators: KeyedVec::default(),
            watch_list: WatchListCP::default(),
            propagator_queue: PropagatorQueue::default(),
            statistics: PropagationStatistics::default(),
        }
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("assignments", &self.assignments)
            .field(
                "propagators",
                &self
                    .propagators
                    .iter()
                    .map(|propagator| propagator.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl State {
    pub(crate) fn new_domain(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.watch_list.grow();
        self.assignments.grow(lower_bound, upper_bound)
    }

    pub(crate) fn new_sparse_domain(&mut self, values: &[i32]) -> DomainId {
        self.watch_list.grow();
        self.assignments.grow_enumerated(values)
    }

    pub(crate) fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub(crate) fn current_world(&self) -> usize {
        self.assignments.current_world()
    }

    pub(crate) fn num_propagator_calls(&self) -> u64 {
        self.statistics.num_propagator_calls
    }

    /// Adds the propagator and propagates until a fixpoint is reached.
    pub(crate) fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, Inconsistency>
    where
        Constructor: PropagatorConstructor,
    {
        let propagator_id = self.propagators.next_key();
        let propagator = constructor.create(&mut PropagatorConstructorContext::new(
            &mut self.watch_list,
            &self.assignments,
            propagator_id,
        ));
        let priority = propagator.priority();
        let _ = self.propagators.push(Box::new(propagator));

        self.propagator_queue
            .enqueue_propagator(propagator_id, priority);
        self.propagate_to_fixpoint()?;

        Ok(propagator_id)
    }

    /// Applies `predicate` to the domains. The propagators are only notified by the next call to
    /// [`State::propagate_to_fixpoint`].
    pub(crate) fn post(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        self.assignments.post_predicate(predicate).inspect_err(|_| {
            self.assignments.clear_events();
        })
    }

    pub(crate) fn propagate_to_fixpoint(&mut self) -> PropagationStatus {
        self.enqueue_watching_propagators();

        while let Some(propagator_id) = self.propagator_queue.pop() {
            self.statistics.num_propagator_calls += 1;

            let context = PropagationContext::new(&mut self.assignments);
            let status = self.propagators[propagator_id].propagate(context);

            if let Err(inconsistency) = status {
                trace!(
                    "{} reported {inconsistency:?}",
                    self.propagators[propagator_id].name()
                );
                self.statistics.num_conflicts += 1;
                self.propagator_queue.clear();
                self.assignments.clear_events();
                return Err(inconsistency);
            }

            self.enqueue_watching_propagators();
        }

        Ok(())
    }

    fn enqueue_watching_propagators(&mut self) {
        for (domain, events) in self.assignments.drain_events() {
            for propagator_id in self.watch_list.get_affected_propagators(domain, events) {
                self.propagator_queue
                    .enqueue_propagator(propagator_id, self.propagators[propagator_id].priority());
            }
        }
    }

    pub(crate) fn world_push(&mut self) {
        self.assignments.world_push();
    }

    pub(crate) fn world_pop(&mut self) {
        self.propagator_queue.clear();
        self.assignments.world_pop();
    }

    pub(crate) fn world_commit(&mut self) {
        self.assignments.world_commit();
    }

    /// Pops every world until the root world is the current one.
    pub(crate) fn restore_root(&mut self) {
        while self.current_world() > 0 {
            self.world_pop();
        }
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics
            .log(statistic_logger.attach_to_prefix("propagation"));
        for propagator in self.propagators.iter() {
            propagator.log_statistics(statistic_logger.attach_to_prefix(propagator.name()));
        }
    }
}
