//! Core data models for team betting.

mod bet;
mod better;
mod competition;
mod ids;
mod metrics;
pub mod validation;

pub use bet::*;
pub use better::*;
pub use competition::*;
pub use ids::*;
pub use metrics::*;
pub use validation::ValidationError;
