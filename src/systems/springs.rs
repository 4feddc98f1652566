//! Phase A of the spring solve: one force vector per spring
//!
//! Each worker owns exactly one output slot, so there are no write races.
//! Phase B (the per-particle gather) lives in `integrate.rs`.

use crate::core::Vec2;
use crate::domain::MassParticle;
use crate::store::Spring;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Endpoints closer than this exert no force (direction undefined)
const MIN_SPRING_LENGTH: f32 = 1e-7;

/// Force acting on endpoint `a`; endpoint `b` receives the negation.
#[inline(always)]
pub fn spring_force(particles: &[MassParticle], spring: &Spring) -> Vec2 {
    let pa = particles[spring.a as usize].position;
    let pb = particles[spring.b as usize].position;
    let delta = pb - pa;
    let len = delta.length();
    if !(len > MIN_SPRING_LENGTH) {
        return Vec2::ZERO;
    }
    let stretch = len - spring.rest_length;
    delta * (spring.stiffness * stretch / len)
}

/// Fill `out[s]` with the force of `springs[s]` on its `a` endpoint
pub fn compute_spring_forces(particles: &[MassParticle], springs: &[Spring], out: &mut [Vec2]) {
    assert_eq!(springs.len(), out.len(), "one force slot per spring required");

    #[cfg(feature = "parallel")]
    {
        out.par_iter_mut()
            .zip(springs.par_iter())
            .for_each(|(slot, spring)| *slot = spring_force(particles, spring));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (slot, spring) in out.iter_mut().zip(springs.iter()) {
            *slot = spring_force(particles, spring);
        }
    }
}
