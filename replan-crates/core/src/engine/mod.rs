mod assignments;
mod depth_first_search;
mod domain_events;
pub mod predicates;
mod propagator_queue;
mod state;
pub mod termination;
#[cfg(test)]
pub(crate) mod test_solver;
mod trailed;
pub mod variables;
mod watch_list_cp;

pub use assignments::Assignments;
pub(crate) use depth_first_search::DepthFirstSearch;
pub(crate) use depth_first_search::SearchOutcome;
pub(crate) use depth_first_search::SearchStatistics;
pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub(crate) use propagator_queue::PropagatorQueue;
pub(crate) use state::State;
pub use trailed::TrailedCell;
pub use trailed::TrailedValues;
pub(crate) use watch_list_cp::WatchListCP;
pub use watch_list_cp::Watchers;
