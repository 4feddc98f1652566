//! Layout and spawn rules used by reset and respawn

use crate::core::{SimRng, Vec2};
use crate::domain::{FountainConfig, FountainParticle, MassParticle, MassSpringConfig};

/// Initial state of lattice particle `idx`: row-major, rows grow downward,
/// top row pinned when configured.
pub fn lattice_particle(config: &MassSpringConfig, idx: usize) -> MassParticle {
    let width = config.grid_width as usize;
    let (i, j) = (idx % width, idx / width);
    let spacing = config.spacing();
    let mut p = MassParticle::at(
        Vec2::new(
            config.origin.x + spacing * i as f32,
            config.origin.y - spacing * j as f32,
        ),
        config.particle_mass(),
    );
    p.pinned = config.pin_top_row && j == 0;
    p
}

/// Launch parameters shared by reset and in-kernel respawn
#[derive(Clone, Copy, Debug)]
pub struct SpawnRule {
    pub speed: f32,
    pub spread: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
}

impl From<&FountainConfig> for SpawnRule {
    fn from(config: &FountainConfig) -> Self {
        Self {
            speed: config.initial_speed,
            spread: config.spread,
            lifespan_min: config.lifespan_min,
            lifespan_max: config.lifespan_max,
        }
    }
}

impl SpawnRule {
    /// Velocity inside the upward cone `π/2 ± spread/2`
    pub fn launch_velocity(&self, rng: &mut SimRng) -> Vec2 {
        let angle = std::f32::consts::FRAC_PI_2 + (rng.next_f32() - 0.5) * self.spread;
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos * self.speed, sin.abs() * self.speed)
    }

    pub fn lifespan(&self, rng: &mut SimRng) -> f32 {
        rng.range(self.lifespan_min, self.lifespan_max)
    }

    /// Recycle a slot in place at its own emitter origin
    pub fn respawn(&self, p: &mut FountainParticle, rng: &mut SimRng) {
        p.position = p.initial_position;
        p.velocity = self.launch_velocity(rng);
        p.age = 0.0;
        p.lifespan = self.lifespan(rng);
    }
}

/// Reset layout for the fountain. The first `initial_active` slots launch
/// immediately; the rest sit dormant at the emitter with `lifespan == 0`.
pub fn fountain_particle(
    config: &FountainConfig,
    rule: &SpawnRule,
    rng: &mut SimRng,
    idx: usize,
) -> FountainParticle {
    let mut p = FountainParticle {
        position: config.emitter_origin,
        initial_position: config.emitter_origin,
        ..FountainParticle::default()
    };
    if idx < config.initial_active as usize {
        rule.respawn(&mut p, rng);
    }
    p
}
