//! Springweave Engine - double-buffered particle simulation in WASM
//!
//! Two engines share one stepping model: a mass-spring lattice and a
//! fountain of recycled particles. Each step reads the settled buffer and
//! writes the other, so renderers always see a complete frame.
//!
//! Architecture:
//! - core/       - Vec2, RNG, logging and safety macros
//! - domain/     - particles, configs, errors
//! - store/      - ping-pong buffers, spring topology
//! - systems/    - per-step kernels (springs, integrate, fountain)
//! - simulation/ - engines and the wasm facade

// Macros must be declared first
#[macro_use]
pub mod core;
pub mod domain;
pub mod store;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Thread pool initialization for the browser worker pool
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    sim_log!("Springweave engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub use crate::core::{SimRng, Vec2};
pub use domain::{FountainConfig, FountainParticle, MassParticle, MassSpringConfig, SimError};
pub use simulation::{
    EngineState, FountainSystem, FountainWorld, MassSpringSystem, MassSpringWorld, PerfStats,
    SimulationEngine, StabilityReport,
};
pub use store::{Spring, SpringTopology};
