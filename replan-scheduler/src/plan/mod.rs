//! Reconfiguration plans: the timed actions computed by the scheduler, and their replay onto a
//! model.
mod action;
pub(crate) mod extractor;
mod reconfiguration_plan;

pub use action::Action;
pub use action::ActionKind;
pub use action::Allocation;
pub use action::Operation;
pub use reconfiguration_plan::ReconfigurationPlan;
