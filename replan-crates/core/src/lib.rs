//! # Replan core
//! A finite-domain constraint programming engine. Problems are modelled with integer variables
//! ([`variables::DomainId`]) and constraints ([`constraints`]); the engine then searches for a
//! solution ([`Solver::satisfy`]) or an optimal solution ([`Solver::optimise`]).
//!
//! The search is a chronological depth-first search over binary decisions. Every decision opens
//! a world; all changes to the domains are trailed and undone when that world is popped. The
//! checkpointed cells behind the domains are available on their own through [`trailed`].
//!
//! # Example
//! ```rust
//! # use replan_core::constraints;
//! # use replan_core::branching::branchers::IndependentVariableValueBrancher;
//! # use replan_core::branching::value_selection::InDomainMin;
//! # use replan_core::branching::variable_selection::FirstFail;
//! # use replan_core::results::SatisfactionResult;
//! # use replan_core::termination::Indefinite;
//! # use replan_core::Solver;
//! let mut solver = Solver::default();
//!
//! let variables = (0..3)
//!     .map(|_| solver.new_bounded_integer(0, 2))
//!     .collect::<Vec<_>>();
//! solver
//!     .add_constraint(constraints::all_different(variables.clone()))
//!     .post()
//!     .expect("no conflict at the root");
//!
//! let mut brancher =
//!     IndependentVariableValueBrancher::new(FirstFail::new(&variables), InDomainMin);
//! let result = solver.satisfy(&mut brancher, &mut Indefinite);
//!
//! let SatisfactionResult::Satisfiable(solution) = result else {
//!     panic!("a permutation exists");
//! };
//! let mut values = variables
//!     .iter()
//!     .map(|&variable| solution.get_value(variable))
//!     .collect::<Vec<_>>();
//! values.sort();
//! assert_eq!(vec![0, 1, 2], values);
//! ```
#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod branching;
pub mod constraints;
pub mod containers;
pub mod propagation;
pub mod propagators;
pub mod statistics;

mod api;
mod engine;
pub(crate) mod math;

pub mod trailed {
    //! Checkpointed cells which are restored when the world they were changed in is popped.
    //!
    //! ```rust
    //! # use replan_core::trailed::TrailedValues;
    //! let mut values = TrailedValues::default();
    //! let cell = values.grow(3);
    //!
    //! values.world_push();
    //! values.assign(cell, 7);
    //! assert_eq!(7, values.read(cell));
    //!
    //! values.world_pop();
    //! assert_eq!(3, values.read(cell));
    //! ```
    pub use crate::engine::TrailedCell;
    pub use crate::engine::TrailedValues;
}

pub use api::*;
pub use basic_types::ConstraintOperationError;
pub use engine::predicates;
pub use engine::termination;
pub use engine::variables;
pub use engine::Assignments;
pub use engine::Watchers;

pub use crate::api::solver::Solver;
