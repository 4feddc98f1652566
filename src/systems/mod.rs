//! Compute kernels
//!
//! Every kernel is data-parallel over particles (or springs) and runs on rayon
//! when the `parallel` feature is on. The serial fallback performs the same
//! per-element arithmetic, so both paths produce identical results.

pub mod fountain;
pub mod integrate;
pub mod lifecycle;
pub mod springs;
pub mod tally;

pub use fountain::{advance_fountain, FountainParams};
pub use integrate::{integrate_mass_spring, IntegrateParams};
pub use lifecycle::SpawnRule;
pub use springs::compute_spring_forces;
pub use tally::StepTally;
