//! The reconfiguration problem: the CP model built from a datacenter model, and its builder.
mod builder;
mod parameters;
mod reconfiguration_problem;
mod statistics;

#[cfg(test)]
pub(crate) use builder::host_of;
pub use builder::NextStates;
pub use builder::ReconfigurationProblemBuilder;
pub use parameters::Parameters;
pub use reconfiguration_problem::ReconfigurationProblem;
pub use statistics::SolutionStatistics;
pub use statistics::SolvingStatistics;
