//! How the search picks its decisions.
//!
//! A [`Brancher`] proposes the decision at every node. The usual one is an
//! [`IndependentVariableValueBrancher`], which asks a [`VariableSelector`] for a variable and a
//! [`ValueSelector`] for the decision on it.
//! Several branchers are chained with a [`DynamicBrancher`].

mod brancher;
pub mod branchers;
mod selection_context;
pub mod value_selection;
pub mod variable_selection;

pub use brancher::Brancher;
pub use selection_context::SelectionContext;

#[cfg(doc)]
use crate::branching::branchers::DynamicBrancher;
#[cfg(doc)]
use crate::branching::branchers::IndependentVariableValueBrancher;
#[cfg(doc)]
use crate::branching::value_selection::ValueSelector;
#[cfg(doc)]
use crate::branching::variable_selection::VariableSelector;
