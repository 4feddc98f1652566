//! Fountain kernel: age, recycle, drift
//!
//! A slot whose age reaches its lifespan is respawned in place during the same
//! step; nothing is ever allocated or removed. Respawn randomness is drawn from
//! a stream keyed by `(seed, step, index)`.

use crate::core::{SimRng, Vec2};
use crate::domain::FountainParticle;

use super::lifecycle::SpawnRule;
use super::tally::StepTally;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct FountainParams {
    pub dt: f32,
    pub gravity: Vec2,
    /// Attraction target for this step, if any
    pub pointer: Option<Vec2>,
    pub pointer_strength: f32,
    pub seed: u32,
    pub step: u64,
    pub spawn: SpawnRule,
}

#[inline(always)]
pub fn advance_particle(p: &FountainParticle, i: usize, params: &FountainParams) -> (FountainParticle, StepTally) {
    let mut tally = StepTally::default();
    let mut q = *p;
    q.age = p.age + params.dt;

    if q.age >= q.lifespan {
        let mut rng = SimRng::for_slot(params.seed, params.step, i);
        params.spawn.respawn(&mut q, &mut rng);
        tally.respawned = 1;
        return (q, tally);
    }

    let mut accel = params.gravity;
    if let Some(target) = params.pointer {
        // linear in distance: strength * (target - x)
        accel += (target - q.position) * params.pointer_strength;
    }
    q.velocity += accel * params.dt;
    q.position += q.velocity * params.dt;

    if !(q.position.is_finite() && q.velocity.is_finite()) {
        let mut rng = SimRng::for_slot(params.seed, params.step, i);
        params.spawn.respawn(&mut q, &mut rng);
        tally.non_finite = 1;
        tally.respawned = 1;
    }
    (q, tally)
}

pub fn advance_fountain(current: &[FountainParticle], next: &mut [FountainParticle], params: &FountainParams) -> StepTally {
    debug_assert_eq!(current.len(), next.len());

    #[cfg(feature = "parallel")]
    {
        next.par_iter_mut()
            .enumerate()
            .map(|(i, out)| {
                let (p, tally) = advance_particle(&current[i], i, params);
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
                let (p, tally) = advance_particle(&current[i], i, params);
                *out = p;
                tally
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FountainConfig;

    fn params(dt: f32, pointer: Option<Vec2>) -> FountainParams {
        let config = FountainConfig::default();
        FountainParams {
            dt,
            gravity: Vec2::ZERO,
            pointer,
            pointer_strength: 2.0,
            seed: 1,
            step: 0,
            spawn: SpawnRule::from(&config),
        }
    }

    fn live(position: Vec2) -> FountainParticle {
        FountainParticle {
            position,
            velocity: Vec2::ZERO,
            initial_position: Vec2::new(0.0, -0.5),
            age: 0.0,
            lifespan: 10.0,
        }
    }

    #[test]
    fn expired_slot_respawns_at_origin() {
        let mut p = live(Vec2::new(3.0, 3.0));
        p.age = 0.95;
        p.lifespan = 1.0;
        let (q, tally) = advance_particle(&p, 0, &params(0.1, None));
        assert_eq!(tally.respawned, 1);
        assert_eq!(q.age, 0.0);
        assert_eq!(q.position, p.initial_position);
        assert!(q.lifespan >= 1.0 && q.lifespan < 2.0);
    }

    #[test]
    fn pointer_attracts_and_negative_strength_repels() {
        let p = live(Vec2::new(0.0, 0.0));
        let target = Some(Vec2::new(1.0, 0.0));
        let (q, _) = advance_particle(&p, 0, &params(0.1, target));
        assert!(q.position.x > 0.0);

        let mut repel = params(0.1, target);
        repel.pointer_strength = -2.0;
        let (r, _) = advance_particle(&p, 0, &repel);
        assert!(r.position.x < 0.0);
    }

    #[test]
    fn respawn_draw_does_not_depend_on_neighbours() {
        let mut p = live(Vec2::ZERO);
        p.lifespan = 0.0;
        let prm = params(0.1, None);
        let single = advance_particle(&p, 5, &prm).0;
        let batch = vec![p; 8];
        let mut next = vec![FountainParticle::default(); 8];
        advance_fountain(&batch, &mut next, &prm);
        assert_eq!(next[5], single);
    }
}
