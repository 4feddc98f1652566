//! Flatten the current particle state into a tightly packed f32 transfer
//! buffer, laid out the way the WebGPU render pipelines expect it.

use crate::domain::particle::{FOUNTAIN_PARTICLE_FLOATS, MASS_PARTICLE_FLOATS};
use crate::domain::{FountainParticle, MassParticle};

/// `[x, y, vx, vy, dx, dy, m, pinned]` per particle. Grows `out` on demand.
pub fn extract_mass_spring(particles: &[MassParticle], out: &mut Vec<f32>) {
    out.resize(particles.len() * MASS_PARTICLE_FLOATS, 0.0);
    for (p, chunk) in particles.iter().zip(out.chunks_exact_mut(MASS_PARTICLE_FLOATS)) {
        p.write_floats(chunk);
    }
}

/// `[x, y, ix, iy, vx, vy, age, lifespan]` per particle. Grows `out` on demand.
pub fn extract_fountain(particles: &[FountainParticle], out: &mut Vec<f32>) {
    out.resize(particles.len() * FOUNTAIN_PARTICLE_FLOATS, 0.0);
    for (p, chunk) in particles.iter().zip(out.chunks_exact_mut(FOUNTAIN_PARTICLE_FLOATS)) {
        p.write_floats(chunk);
    }
}
