//! Simulation engines
//!
//! `MassSpringSystem` and `FountainSystem` each own a ping-pong particle store
//! and advance it one step at a time. Renderers only ever see
//! `current_state()`, whose identity changes every step; they must not hold it
//! across a `step` call (the borrow checker enforces this natively, the wasm
//! facade hands out a fresh transfer buffer instead).

use crate::domain::{Result, SimError};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "render/render_extract.rs"]
mod render_extract;
mod mass_spring;
mod fountain;
mod facade;

pub use facade::{FountainWorld, MassSpringWorld};
pub use fountain::FountainSystem;
pub use mass_spring::MassSpringSystem;
pub use perf_stats::PerfStats;
pub use render_extract::{extract_fountain, extract_mass_spring};

use perf_stats::saturating_u32;
use perf_timer::{timed, PerfTimer};

/// The narrow surface a renderer or host loop drives
pub trait SimulationEngine {
    type Config;
    type Particle;

    /// (Re)build from `config`. Clears a failed state on success.
    fn initialize(&mut self, config: Self::Config) -> Result<()>;

    /// Advance by `dt` seconds. Only `ResourceFailure` is ever returned.
    fn step(&mut self, dt: f32) -> Result<()>;

    /// Settled state of the last completed step
    fn current_state(&self) -> &[Self::Particle];

    /// Back to the initial configuration
    fn reset(&mut self);

    fn step_count(&self) -> u64;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Ready,
    /// Terminal until `initialize` succeeds
    Failed(String),
}

impl EngineState {
    pub fn is_failed(&self) -> bool {
        matches!(self, EngineState::Failed(_))
    }
}

/// Diagnostic view of damped numerical instability
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StabilityReport {
    pub last_step_clamped: u32,
    pub last_step_non_finite: u32,
    pub total_clamped: u64,
    pub total_non_finite: u64,
}

impl StabilityReport {
    pub(crate) fn record(&mut self, clamped: u32, non_finite: u32) {
        self.last_step_clamped = clamped;
        self.last_step_non_finite = non_finite;
        self.total_clamped += clamped as u64;
        self.total_non_finite += non_finite as u64;
    }

    /// True when the clamp has never engaged and no update was discarded
    pub fn is_quiet(&self) -> bool {
        self.total_clamped == 0 && self.total_non_finite == 0
    }
}

/// Run a compute pass, turning a panic inside the worker pool into a message
pub(crate) fn run_guarded<R>(pass: impl FnOnce() -> R) -> std::result::Result<R, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(pass)).map_err(|payload| {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "compute pass panicked".to_string()
        }
    })
}

/// Buffer allocation refused by the allocator (wasm memory growth limit)
pub(crate) fn allocation_failure(what: &str, err: std::collections::TryReserveError) -> SimError {
    sim_error!("allocation of {} failed: {}", what, err);
    SimError::ResourceFailure(format!("cannot allocate {what}: {err}"))
}

/// Host-side dt sanity check; a bad frame is skipped, not reported.
pub(crate) fn usable_dt(dt: f32) -> bool {
    dt.is_finite() && dt >= 0.0
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
