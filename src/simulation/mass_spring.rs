//! Mass-spring lattice engine

use crate::core::Vec2;
use crate::domain::{MassParticle, MassSpringConfig, Result, SimError};
use crate::store::{PingPong, Spring, SpringTopology};
use crate::systems::lifecycle::lattice_particle;
use crate::systems::{compute_spring_forces, integrate_mass_spring, IntegrateParams, StepTally};

use super::{allocation_failure, run_guarded, saturating_u32, timed, usable_dt, EngineState, PerfStats, PerfTimer, SimulationEngine, StabilityReport};

pub struct MassSpringSystem {
    config: MassSpringConfig,
    buffers: PingPong<MassParticle>,
    topology: SpringTopology,
    /// Set by `replace_springs`; `reset_springs` regenerates from it instead of the lattice
    custom_springs: Option<Vec<Spring>>,
    /// Phase A output, one slot per spring
    spring_forces: Vec<Vec2>,
    state: EngineState,
    stability: StabilityReport,

    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl MassSpringSystem {
    pub fn new(config: MassSpringConfig) -> Result<Self> {
        config.validate()?;
        let topology = lattice_for(&config)?;
        let buffers = PingPong::try_from_fn(config.particle_count(), |i| lattice_particle(&config, i))
            .map_err(|err| allocation_failure("mass-spring particle buffers", err))?;
        let spring_forces = vec![Vec2::ZERO; topology.len()];
        sim_log!(
            "mass-spring: {}x{} grid, {} springs",
            config.grid_width,
            config.grid_height,
            topology.len()
        );
        Ok(Self {
            config,
            buffers,
            topology,
            custom_springs: None,
            spring_forces,
            state: EngineState::Ready,
            stability: StabilityReport::default(),
            perf_enabled: false,
            perf_stats: PerfStats::default(),
        })
    }

    /// Lattice particles with a custom spring set instead of the 4-neighbour lattice
    pub fn with_springs(config: MassSpringConfig, springs: Vec<Spring>) -> Result<Self> {
        let mut system = Self::new(config)?;
        system.replace_springs(springs)?;
        Ok(system)
    }

    pub fn config(&self) -> &MassSpringConfig {
        &self.config
    }

    pub fn particle_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn springs(&self) -> &[Spring] {
        self.topology.springs()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn stability(&self) -> StabilityReport {
        self.stability
    }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.perf_enabled = enabled;
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.perf_stats.clone()
    }

    /// Rewrite every particle from the layout rule and rewind to step 0
    pub fn reset_particles(&mut self) {
        let config = &self.config;
        self.buffers.reset(|i| lattice_particle(config, i));
        self.stability = StabilityReport::default();
    }

    /// Regenerate the full spring set (lattice, or the installed custom set).
    ///
    /// Particles and the step counter are left alone: rewinding the counter
    /// without rewriting particles would publish the stale buffer.
    pub fn reset_springs(&mut self) -> Result<()> {
        let topology = match &self.custom_springs {
            Some(springs) => SpringTopology::from_springs(springs.clone(), self.buffers.len())?,
            None => lattice_for(&self.config)?,
        };
        self.install_topology(topology);
        Ok(())
    }

    /// Swap in a custom spring set. Validated as a whole; on error the old
    /// topology stays in place.
    pub fn replace_springs(&mut self, springs: Vec<Spring>) -> Result<()> {
        let topology = SpringTopology::from_springs(springs.clone(), self.buffers.len())?;
        self.custom_springs = Some(springs);
        self.install_topology(topology);
        Ok(())
    }

    /// Change lattice stiffness and regenerate the lattice springs.
    /// Drops any custom spring set.
    pub fn set_spring_stiffness(&mut self, stiffness: f32) -> Result<()> {
        let mut config = self.config.clone();
        config.spring_stiffness = stiffness;
        config.validate()?;
        self.config = config;
        self.custom_springs = None;
        self.reset_springs()
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn pin(&mut self, indices: &[usize]) -> Result<()> {
        self.set_pinned(indices, true)
    }

    pub fn unpin(&mut self, indices: &[usize]) -> Result<()> {
        self.set_pinned(indices, false)
    }

    /// The host reports the compute context gone; every further step fails
    pub fn lose_context(&mut self, reason: &str) {
        self.fail(format!("compute context lost: {reason}"));
    }

    fn set_pinned(&mut self, indices: &[usize], pinned: bool) -> Result<()> {
        let len = self.buffers.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(SimError::config(format!(
                "pin index {bad} out of range for {len} particles"
            )));
        }
        // Only the current buffer matters: next is fully rewritten from it.
        let current = self.buffers.current_mut();
        for &i in indices {
            current[i].pinned = pinned;
        }
        Ok(())
    }

    fn install_topology(&mut self, topology: SpringTopology) {
        self.spring_forces.clear();
        self.spring_forces.resize(topology.len(), Vec2::ZERO);
        self.topology = topology;
    }

    fn fail(&mut self, reason: String) {
        sim_error!("mass-spring engine halted: {}", reason);
        self.state = EngineState::Failed(reason);
    }

    fn ensure_ready(&self) -> Result<()> {
        match &self.state {
            EngineState::Ready => Ok(()),
            EngineState::Failed(reason) => Err(SimError::ResourceFailure(reason.clone())),
        }
    }

    fn params(&self, dt: f32) -> IntegrateParams {
        IntegrateParams {
            dt,
            gravity: self.config.gravity,
            damping: self.config.damping,
            max_speed: self.config.max_speed,
        }
    }
}

impl SimulationEngine for MassSpringSystem {
    type Config = MassSpringConfig;
    type Particle = MassParticle;

    fn initialize(&mut self, config: MassSpringConfig) -> Result<()> {
        let mut fresh = MassSpringSystem::new(config)?;
        fresh.perf_enabled = self.perf_enabled;
        *self = fresh;
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        self.ensure_ready()?;
        if !usable_dt(dt) {
            sim_warn!("mass-spring: skipping step with dt = {}", dt);
            return Ok(());
        }

        let perf_on = self.perf_enabled;
        if perf_on {
            self.perf_stats.reset();
        }
        let step_start = if perf_on { Some(PerfTimer::start()) } else { None };

        let params = self.params(dt);
        let topology = &self.topology;
        let spring_forces = &mut self.spring_forces;
        let buffers = &mut self.buffers;
        let stats = &mut self.perf_stats;

        let outcome = run_guarded(|| -> StepTally {
            let (current, next) = buffers.split();
            timed(perf_on, &mut stats.springs_ms, || {
                compute_spring_forces(current, topology.springs(), spring_forces)
            });
            let forces: &[Vec2] = spring_forces;
            timed(perf_on, &mut stats.integrate_ms, || {
                integrate_mass_spring(current, next, topology, forces, &params)
            })
        });

        let tally = match outcome {
            Ok(tally) => tally,
            Err(panic) => {
                self.fail(panic);
                return self.ensure_ready();
            }
        };

        self.buffers.advance();

        if tally.non_finite > 0 && self.stability.last_step_non_finite == 0 {
            sim_warn!(
                "mass-spring: discarded {} non-finite updates at step {}",
                tally.non_finite,
                self.buffers.step()
            );
        }
        self.stability.record(tally.clamped, tally.non_finite);

        if perf_on {
            self.perf_stats.record_tally(&tally);
            self.perf_stats.particle_count = saturating_u32(self.buffers.len());
            self.perf_stats.spring_count = saturating_u32(self.topology.len());
            let particle_bytes = self.buffers.len().saturating_mul(2 * std::mem::size_of::<MassParticle>());
            let spring_bytes = self
                .topology
                .len()
                .saturating_mul(std::mem::size_of::<Spring>() + std::mem::size_of::<Vec2>());
            self.perf_stats.memory_bytes = saturating_u32(particle_bytes.saturating_add(spring_bytes));
            if let Some(start) = step_start {
                self.perf_stats.step_ms = start.elapsed_ms();
            }
        }
        Ok(())
    }

    fn current_state(&self) -> &[MassParticle] {
        self.buffers.current()
    }

    fn reset(&mut self) {
        self.reset_particles();
        if let Err(err) = self.reset_springs() {
            // config is validated at construction
            sim_error!("mass-spring: reset_springs failed: {}", err);
        }
    }

    fn step_count(&self) -> u64 {
        self.buffers.step()
    }
}

fn lattice_for(config: &MassSpringConfig) -> Result<SpringTopology> {
    SpringTopology::lattice(
        config.grid_width,
        config.grid_height,
        config.spacing(),
        config.spring_stiffness,
    )
}
