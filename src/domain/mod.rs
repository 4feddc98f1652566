//! Domain types: particles, configuration, errors

pub mod config;
pub mod error;
pub mod particle;

pub use config::{FountainConfig, MassSpringConfig};
pub use error::{Result, SimError};
pub use particle::{FountainParticle, MassParticle};
