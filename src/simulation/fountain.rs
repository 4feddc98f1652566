//! Fountain engine: a fixed pool of slots recycled in place

use crate::core::{SimRng, Vec2};
use crate::domain::{FountainConfig, FountainParticle, Result, SimError};
use crate::store::PingPong;
use crate::systems::lifecycle::fountain_particle;
use crate::systems::{advance_fountain, FountainParams, SpawnRule, StepTally};

use super::{allocation_failure, run_guarded, saturating_u32, timed, usable_dt, EngineState, PerfStats, PerfTimer, SimulationEngine, StabilityReport};

pub struct FountainSystem {
    config: FountainConfig,
    spawn: SpawnRule,
    buffers: PingPong<FountainParticle>,
    /// Drives reset layouts; reseeded from `config.seed` on every reset
    rng: SimRng,
    pointer: Option<Vec2>,
    state: EngineState,
    stability: StabilityReport,

    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl FountainSystem {
    pub fn new(config: FountainConfig) -> Result<Self> {
        config.validate()?;
        let spawn = SpawnRule::from(&config);
        let mut rng = SimRng::new(config.seed);
        let buffers = PingPong::try_from_fn(config.particle_count as usize, |i| {
            fountain_particle(&config, &spawn, &mut rng, i)
        })
        .map_err(|err| allocation_failure("fountain particle buffers", err))?;
        sim_log!(
            "fountain: {} slots, {} launched on reset",
            config.particle_count,
            config.initial_active.min(config.particle_count)
        );
        Ok(Self {
            spawn,
            buffers,
            rng,
            pointer: None,
            state: EngineState::Ready,
            stability: StabilityReport::default(),
            perf_enabled: false,
            perf_stats: PerfStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &FountainConfig {
        &self.config
    }

    pub fn particle_count(&self) -> usize {
        self.buffers.len()
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

    /// Attraction target used from the next step on
    pub fn set_external_force(&mut self, point: Vec2) {
        self.pointer = Some(point);
    }

    pub fn clear_external_force(&mut self) {
        self.pointer = None;
    }

    pub fn external_force(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Replace the generator seed. Affects respawns from the next step and
    /// every later `reset`.
    pub fn set_seed(&mut self, seed: u32) {
        self.config.seed = seed;
        self.rng.set_state(seed);
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Slots with `age < lifespan`
    pub fn live_count(&self) -> usize {
        self.buffers.current().iter().filter(|p| p.is_alive()).count()
    }

    /// Relaunch every slot from the emitter and rewind to step 0
    pub fn reset_particles(&mut self) {
        self.rng.set_state(self.config.seed);
        let (config, spawn, rng) = (&self.config, &self.spawn, &mut self.rng);
        self.buffers.reset(|i| fountain_particle(config, spawn, rng, i));
        self.stability = StabilityReport::default();
    }

    pub fn lose_context(&mut self, reason: &str) {
        self.fail(format!("compute context lost: {reason}"));
    }

    fn fail(&mut self, reason: String) {
        sim_error!("fountain engine halted: {}", reason);
        self.state = EngineState::Failed(reason);
    }

    fn ensure_ready(&self) -> Result<()> {
        match &self.state {
            EngineState::Ready => Ok(()),
            EngineState::Failed(reason) => Err(SimError::ResourceFailure(reason.clone())),
        }
    }

    fn params(&self, dt: f32) -> FountainParams {
        FountainParams {
            dt,
            gravity: self.config.gravity,
            pointer: self.pointer,
            pointer_strength: self.config.pointer_strength,
            seed: self.config.seed,
            step: self.buffers.step(),
            spawn: self.spawn,
        }
    }
}

impl SimulationEngine for FountainSystem {
    type Config = FountainConfig;
    type Particle = FountainParticle;

    fn initialize(&mut self, config: FountainConfig) -> Result<()> {
        let mut fresh = FountainSystem::new(config)?;
        fresh.perf_enabled = self.perf_enabled;
        *self = fresh;
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        self.ensure_ready()?;
        if !usable_dt(dt) {
            sim_warn!("fountain: skipping step with dt = {}", dt);
            return Ok(());
        }

        let perf_on = self.perf_enabled;
        if perf_on {
            self.perf_stats.reset();
        }
        let step_start = if perf_on { Some(PerfTimer::start()) } else { None };

        let params = self.params(dt);
        let buffers = &mut self.buffers;
        let stats = &mut self.perf_stats;
        let outcome = run_guarded(|| -> StepTally {
            let (current, next) = buffers.split();
            timed(perf_on, &mut stats.integrate_ms, || advance_fountain(current, next, &params))
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
                "fountain: recycled {} non-finite slots at step {}",
                tally.non_finite,
                self.buffers.step()
            );
        }
        self.stability.record(tally.clamped, tally.non_finite);

        if perf_on {
            self.perf_stats.record_tally(&tally);
            self.perf_stats.particle_count = saturating_u32(self.buffers.len());
            self.perf_stats.live_count = saturating_u32(self.live_count());
            self.perf_stats.memory_bytes = saturating_u32(
                self.buffers.len().saturating_mul(2 * std::mem::size_of::<FountainParticle>()),
            );
            if let Some(start) = step_start {
                self.perf_stats.step_ms = start.elapsed_ms();
            }
        }
        Ok(())
    }

    fn current_state(&self) -> &[FountainParticle] {
        self.buffers.current()
    }

    fn reset(&mut self) {
        self.reset_particles();
    }

    fn step_count(&self) -> u64 {
        self.buffers.step()
    }
}
