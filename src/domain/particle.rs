//! Particle layouts for the two engine variants

use crate::core::Vec2;

/// Number of f32 slots each particle occupies in the render transfer buffer
pub const MASS_PARTICLE_FLOATS: usize = 8;
pub const FOUNTAIN_PARTICLE_FLOATS: usize = 8;

/// One point mass of the spring lattice
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Net spring acceleration gathered during the last step
    pub displacement: Vec2,
    /// Inverse-mass factor applied to the spring force; 0 freezes the particle
    pub mass: f32,
    pub pinned: bool,
}

impl MassParticle {
    pub fn at(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            displacement: Vec2::ZERO,
            mass,
            pinned: false,
        }
    }

    /// Spring force to acceleration factor: `a = F · mass`, clamped at 0
    #[inline]
    pub fn force_scale(&self) -> f32 {
        self.mass.max(0.0)
    }

    /// Pinned or massless particles are copied through integration untouched
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.pinned || self.mass <= 0.0
    }

    /// `[x, y, vx, vy, dx, dy, m, pinned]`
    pub fn write_floats(&self, out: &mut [f32]) {
        out[0] = self.position.x;
        out[1] = self.position.y;
        out[2] = self.velocity.x;
        out[3] = self.velocity.y;
        out[4] = self.displacement.x;
        out[5] = self.displacement.y;
        out[6] = self.mass;
        out[7] = if self.pinned { 1.0 } else { 0.0 };
    }
}

/// One recyclable fountain slot
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FountainParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Emitter origin this slot respawns at
    pub initial_position: Vec2,
    pub age: f32,
    pub lifespan: f32,
}

impl FountainParticle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.age < self.lifespan
    }

    /// `[x, y, ix, iy, vx, vy, age, lifespan]`
    pub fn write_floats(&self, out: &mut [f32]) {
        out[0] = self.position.x;
        out[1] = self.position.y;
        out[2] = self.initial_position.x;
        out[3] = self.initial_position.y;
        out[4] = self.velocity.x;
        out[5] = self.velocity.y;
        out[6] = self.age;
        out[7] = self.lifespan;
    }
}
