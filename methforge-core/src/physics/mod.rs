//! Stoichiometric reaction models and adsorption physics shared by the unit blocks.

pub mod adsorption;
pub mod reaction;

pub use adsorption::{DualIsotherm, MonolithBed, PolytropicMachine};
pub use reaction::ReactionModel;
