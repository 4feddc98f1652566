//! Engine configuration
//!
//! Both configs deserialize from JSON with every field optional, so the JS
//! side can send `{}` for the demo defaults or override single fields.

use serde::{Deserialize, Serialize};

use crate::core::Vec2;

use super::error::{Result, SimError};

/// Side length of the square the default lattice spans
pub const DEFAULT_EDGE_LENGTH: f32 = 0.7;
/// Per-particle mass is this times the particle count unless overridden
pub const MASS_PER_PARTICLE_FACTOR: f32 = 0.0001;
/// Upper bound on particles per engine (a 2048 × 2048 lattice)
pub const MAX_PARTICLES: usize = 1 << 22;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassSpringConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Total width of the lattice; spacing is `edge_length / grid_width`
    pub edge_length: f32,
    /// Overrides the spacing derived from `edge_length`
    pub rest_spacing: Option<f32>,
    pub spring_stiffness: f32,
    /// Overrides `MASS_PER_PARTICLE_FACTOR * particle_count`
    pub mass: Option<f32>,
    /// Position of particle (0, 0); rows grow downward
    pub origin: Vec2,
    pub gravity: Vec2,
    /// Linear velocity damping per second
    pub damping: f32,
    /// Velocity magnitude clamp
    pub max_speed: f32,
    pub pin_top_row: bool,
}

impl Default for MassSpringConfig {
    fn default() -> Self {
        Self {
            grid_width: 16,
            grid_height: 16,
            edge_length: DEFAULT_EDGE_LENGTH,
            rest_spacing: None,
            spring_stiffness: 4.0,
            mass: None,
            origin: Vec2::new(-0.25, 0.5),
            gravity: Vec2::new(0.0, -1.0),
            damping: 1.0,
            max_speed: 10.0,
            pin_top_row: true,
        }
    }
}

impl MassSpringConfig {
    /// Square `n × n` lattice with the demo defaults
    pub fn square(n: u32) -> Self {
        Self {
            grid_width: n,
            grid_height: n,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn particle_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    pub fn spacing(&self) -> f32 {
        self.rest_spacing
            .unwrap_or(self.edge_length / self.grid_width.max(1) as f32)
    }

    pub fn particle_mass(&self) -> f32 {
        self.mass
            .unwrap_or(MASS_PER_PARTICLE_FACTOR * self.particle_count() as f32)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SimError::config(format!(
                "grid size must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.grid_width as u64 * self.grid_height as u64 > MAX_PARTICLES as u64 {
            return Err(SimError::config(format!(
                "grid {}x{} exceeds the {MAX_PARTICLES} particle limit",
                self.grid_width, self.grid_height
            )));
        }
        check_positive("spacing", self.spacing())?;
        check_non_negative("spring_stiffness", self.spring_stiffness)?;
        check_non_negative("mass", self.particle_mass())?;
        check_non_negative("damping", self.damping)?;
        check_positive("max_speed", self.max_speed)?;
        check_finite_vec("origin", self.origin)?;
        check_finite_vec("gravity", self.gravity)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainConfig {
    pub particle_count: u32,
    /// Slots launched by `reset`; the rest start dormant and launch on their first step
    pub initial_active: u32,
    pub emitter_origin: Vec2,
    /// Launch speed in units per second
    pub initial_speed: f32,
    /// Full cone angle around +Y, radians
    pub spread: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
    /// Constant acceleration on live slots. Zero by default: slots drift at their launch velocity
    pub gravity: Vec2,
    /// Pointer force coefficient; positive attracts, negative repels
    pub pointer_strength: f32,
    pub seed: u32,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            particle_count: 4096,
            initial_active: 100,
            emitter_origin: Vec2::new(0.0, -0.5),
            initial_speed: 1.8,
            spread: std::f32::consts::PI / 3.0,
            lifespan_min: 1.0,
            lifespan_max: 2.0,
            gravity: Vec2::ZERO,
            pointer_strength: 1.0,
            seed: 12345,
        }
    }
}

impl FountainConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SimError::config("particle_count must be positive"));
        }
        if self.particle_count as usize > MAX_PARTICLES {
            return Err(SimError::config(format!(
                "particle_count {} exceeds the {MAX_PARTICLES} particle limit",
                self.particle_count
            )));
        }
        check_positive("lifespan_min", self.lifespan_min)?;
        if !(self.lifespan_max >= self.lifespan_min) || !self.lifespan_max.is_finite() {
            return Err(SimError::config(format!(
                "lifespan range [{}, {}) is invalid",
                self.lifespan_min, self.lifespan_max
            )));
        }
        check_non_negative("initial_speed", self.initial_speed)?;
        check_non_negative("spread", self.spread)?;
        if !self.pointer_strength.is_finite() {
            return Err(SimError::config("pointer_strength must be finite"));
        }
        check_finite_vec("emitter_origin", self.emitter_origin)?;
        check_finite_vec("gravity", self.gravity)?;
        Ok(())
    }
}

fn check_positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{field} must be positive, got {value}")))
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{field} must be non-negative, got {value}")))
    }
}

fn check_finite_vec(field: &str, value: Vec2) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::config(format!("{field} must be finite")))
    }
}
