use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::Domains;
use super::PropagationContext;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::statistics_counters;
use crate::statistics::StatisticLogger;

// Allows tests to inspect a concrete propagator behind a `Box<dyn Propagator>`.
impl_downcast!(Propagator);

/// A propagator removes values from domains which will never be in any solution, or reports that
/// its constraint is violated.
///
/// The only required functions are [`Propagator::name`] and [`Propagator::propagate`]. See the
/// [`crate::propagation`] documentation for more details.
pub trait Propagator: Downcast {
    /// Return the name of the propagator.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// Removes values from the domains of the variables of the propagator (using the setters of
    /// [`PropagationContext`]) which cannot be part of any solution given the current domains.
    ///
    /// Returns [`Result::Err`] when a domain became empty or when the constraint cannot be
    /// satisfied anymore.
    fn propagate(&mut self, context: PropagationContext<'_>) -> PropagationStatus;

    /// Returns the priority of the propagator represented as an integer. Lower values mean
    /// higher priority and the priority determines the order in which propagators will be asked
    /// to propagate.
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// Returns `true` if the constraint of the propagator cannot be satisfied under the given
    /// domains. Only needs to be implemented for propagators which are reified, the default never
    /// detects an inconsistency.
    fn detect_inconsistency(&self, _domains: Domains<'_>) -> bool {
        false
    }

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`statistics_counters!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// When a propagator runs relative to the others. Cheap propagators should run first so that
/// expensive ones see tighter domains. Within a priority, propagators run in the order they were
/// enqueued.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, enum_map::Enum)]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    VeryLow,
}
