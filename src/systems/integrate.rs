//! Mass-spring integration (phase B of the spring solve)
//!
//! For every particle: gather the per-spring forces through the incidence
//! table, fold them into velocity with semi-implicit Euler, clamp the speed,
//! then move. Reads only the settled `current` buffer and the spring force
//! buffer; writes only its own slot of `next`.

use crate::core::Vec2;
use crate::domain::MassParticle;
use crate::store::SpringTopology;

use super::tally::StepTally;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct IntegrateParams {
    pub dt: f32,
    pub gravity: Vec2,
    pub damping: f32,
    pub max_speed: f32,
}

impl IntegrateParams {
    #[inline]
    fn damping_factor(&self) -> f32 {
        (1.0 - self.damping * self.dt).max(0.0)
    }
}

/// Sum of spring forces on particle `i`, in incidence order.
///
/// `spring_forces.len()` must equal `topology.len()`; incidence entries only
/// name springs of their own topology, so the unchecked read stays in bounds.
#[inline(always)]
pub(crate) fn gather_spring_force(topology: &SpringTopology, spring_forces: &[Vec2], i: usize) -> Vec2 {
    let mut total = Vec2::ZERO;
    for inc in topology.incident(i) {
        let f = *fast!(spring_forces, [inc.spring as usize]);
        if inc.sign > 0 {
            total += f;
        } else {
            total -= f;
        }
    }
    total
}

#[inline(always)]
pub(crate) fn integrate_particle(
    p: &MassParticle,
    i: usize,
    topology: &SpringTopology,
    spring_forces: &[Vec2],
    params: &IntegrateParams,
) -> (MassParticle, StepTally) {
    let mut tally = StepTally::default();
    if p.is_frozen() {
        return (*p, tally);
    }

    let spring_accel = gather_spring_force(topology, spring_forces, i) * p.force_scale();

    let mut velocity = p.velocity + (spring_accel + params.gravity) * params.dt;
    velocity = velocity * params.damping_factor();
    if velocity.clamp_length(params.max_speed) {
        tally.clamped = 1;
    }
    let position = p.position + velocity * params.dt;

    if !(position.is_finite() && velocity.is_finite() && spring_accel.is_finite()) {
        tally.non_finite = 1;
        tally.clamped = 0;
        return (
            MassParticle {
                velocity: Vec2::ZERO,
                displacement: Vec2::ZERO,
                ..*p
            },
            tally,
        );
    }

    (
        MassParticle {
            position,
            velocity,
            displacement: spring_accel,
            ..*p
        },
        tally,
    )
}

/// Phase B over every particle. Panics when the buffers do not match the topology.
pub fn integrate_mass_spring(
    current: &[MassParticle],
    next: &mut [MassParticle],
    topology: &SpringTopology,
    spring_forces: &[Vec2],
    params: &IntegrateParams,
) -> StepTally {
    assert_eq!(current.len(), next.len(), "current/next buffer length mismatch");
    assert_eq!(topology.particle_count(), current.len(), "topology built for a different particle count");
    assert_eq!(spring_forces.len(), topology.len(), "one force slot per spring required");

    #[cfg(feature = "parallel")]
    {
        next.par_iter_mut()
            .enumerate()
            .map(|(i, out)| {
                let (p, tally) = integrate_particle(&current[i], i, topology, spring_forces, params);
                *out = p;
                tally
            })
            .reduce(StepTally::default, |a, b| a + b)
    }

    #[cfg(not(feature = "parallel"))]
    {
        next.iter_mut()
            .enumerate()
            .map(|(i, out)| {
                let (p, tally) = integrate_particle(&current[i], i, topology, spring_forces, params);
                *out = p;
                tally
            })
            .sum()
    }
}
