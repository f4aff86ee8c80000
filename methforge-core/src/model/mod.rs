//! Expression trees, decision variables and the builder that freezes them into a model.

pub mod builder;
pub mod expr;
pub mod variable;

pub use builder::{Model, ModelBuilder, Violation};
pub use expr::{Expr, VarId};
pub use variable::{Constraint, Domain, Sense, Variable};
