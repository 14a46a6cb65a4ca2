//! # Replan scheduler
//! Computes reconfiguration plans for virtualized datacenters. Given the current placement of the
//! VMs on the nodes ([`model::Model`]) and constraints on the state to reach
//! ([`constraint::SatConstraint`]), the scheduler finds a set of timed actions (migrations, boots,
//! shutdowns, ...) which leads to a state satisfying every constraint, without overloading any
//! node at any moment.
//!
//! Every action is modelled with integer variables for its start, end and duration, and with the
//! slices of resources it consumes on its hosts; the resulting problem is solved by
//! [`replan_core`]. With an objective ([`constraint::OptConstraint`]) the scheduler looks for the
//! plan with the smallest cost it can find within its budget.
//!
//! # Example
//! ```rust
//! # use std::collections::BTreeSet;
//! # use replan_scheduler::constraint::OptConstraint;
//! # use replan_scheduler::constraint::SatConstraint;
//! # use replan_scheduler::model::Model;
//! # use replan_scheduler::model::ShareableResource;
//! # use replan_scheduler::plan::ActionKind;
//! # use replan_scheduler::Instance;
//! # use replan_scheduler::Parameters;
//! # use replan_scheduler::ReconfigurationScheduler;
//! let mut model = Model::default();
//! let n1 = model.new_node();
//! let n2 = model.new_node();
//! model.mapping_mut().add_online_node(n1);
//! model.mapping_mut().add_online_node(n2);
//! let vm = model.new_vm();
//! assert!(model.mapping_mut().add_running_vm(vm, n1));
//! model.attach(ShareableResource::with_defaults("cpu", 4, 2));
//!
//! let instance = Instance::new(model, vec![SatConstraint::Offline(BTreeSet::from([n1]))])
//!     .with_objective(OptConstraint::MinMttr);
//! let result = ReconfigurationScheduler::new(Parameters::default())
//!     .solve(&instance)
//!     .expect("well-formed instance");
//!
//! let plan = result.plan.expect("n2 can host the VM");
//! let kinds = plan
//!     .actions()
//!     .iter()
//!     .map(|action| action.kind())
//!     .collect::<Vec<_>>();
//! assert_eq!(vec![ActionKind::MigrateVm, ActionKind::ShutdownNode], kinds);
//! ```
pub mod constraint;
pub mod duration;
pub mod model;
pub mod plan;
pub mod problem;
pub mod transition;

mod error;
pub(crate) mod propagators;
mod scheduler;

pub use error::PlanApplicationError;
pub use error::SchedulerError;
pub use problem::Parameters;
pub use problem::SolvingStatistics;
pub use scheduler::Instance;
pub use scheduler::ReconfigurationScheduler;
pub use scheduler::SolveResult;
