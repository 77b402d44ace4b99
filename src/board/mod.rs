//! Battlefield locations, control tracking, scoring, and showdowns.

pub mod control;
pub mod location;
pub mod scoring;
pub mod showdown;

pub use location::{LocationId, LocationState};
pub use scoring::ScoreMethod;
