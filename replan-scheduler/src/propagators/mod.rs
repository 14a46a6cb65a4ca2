//! Propagators specific to reconfiguration problems.
mod disjoint;
mod time_table_capacity;
mod weighted_count;

pub(crate) use disjoint::DisjointConstructor;
pub(crate) use time_table_capacity::ConsumingTask;
pub(crate) use time_table_capacity::DemandingTask;
pub(crate) use time_table_capacity::ResizingTask;
pub(crate) use time_table_capacity::TimeTableCapacityConstructor;
pub(crate) use weighted_count::WeightedCountConstructor;
