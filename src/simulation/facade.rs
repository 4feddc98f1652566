use wasm_bindgen::prelude::*;

use crate::core::Vec2;
use crate::domain::particle::{FOUNTAIN_PARTICLE_FLOATS, MASS_PARTICLE_FLOATS};
use crate::domain::{FountainConfig, MassSpringConfig, SimError};

use super::render_extract::{extract_fountain, extract_mass_spring};
use super::{saturating_u32, FountainSystem, MassSpringSystem, PerfStats, SimulationEngine};

fn to_js(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Mass-spring engine handle for JS.
///
/// The renderer calls `extract_state()` after each `step` and uploads
/// `state_len_floats` floats starting at the returned pointer. The pointer is
/// only valid until the next call into this object.
#[wasm_bindgen]
pub struct MassSpringWorld {
    core: MassSpringSystem,
    transfer: Vec<f32>,
}

#[wasm_bindgen]
impl MassSpringWorld {
    /// Square `grid_size × grid_size` cloth with the demo defaults
    #[wasm_bindgen(constructor)]
    pub fn new(grid_size: u32) -> Result<MassSpringWorld, JsValue> {
        Self::with_config(MassSpringConfig::square(grid_size))
    }

    /// Build from a JSON `MassSpringConfig`; missing fields use defaults
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: String) -> Result<MassSpringWorld, JsValue> {
        let config = MassSpringConfig::from_json(&json).map_err(to_js)?;
        Self::with_config(config)
    }

    /// Rebuild from a JSON config; also clears a failed state
    pub fn initialize(&mut self, json: String) -> Result<(), JsValue> {
        let config = MassSpringConfig::from_json(&json).map_err(to_js)?;
        self.core.initialize(config).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { saturating_u32(self.core.particle_count()) }

    #[wasm_bindgen(getter)]
    pub fn spring_count(&self) -> u32 { saturating_u32(self.core.springs().len()) }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.step_count() }

    #[wasm_bindgen(getter)]
    pub fn failed(&self) -> bool { self.core.state().is_failed() }

    pub fn step(&mut self, dt: f32) -> Result<(), JsValue> {
        self.core.step(dt).map_err(to_js)
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }

    pub fn reset_particles(&mut self) {
        self.core.reset_particles();
    }

    pub fn reset_springs(&mut self) -> Result<(), JsValue> {
        self.core.reset_springs().map_err(to_js)
    }

    pub fn set_spring_stiffness(&mut self, stiffness: f32) -> Result<(), JsValue> {
        self.core.set_spring_stiffness(stiffness).map_err(to_js)
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(Vec2::new(x, y));
    }

    pub fn pin(&mut self, indices: Vec<u32>) -> Result<(), JsValue> {
        let indices: Vec<usize> = indices.into_iter().map(|i| i as usize).collect();
        self.core.pin(&indices).map_err(to_js)
    }

    pub fn unpin(&mut self, indices: Vec<u32>) -> Result<(), JsValue> {
        let indices: Vec<usize> = indices.into_iter().map(|i| i as usize).collect();
        self.core.unpin(&indices).map_err(to_js)
    }

    /// Call from the GPU device-lost / worker-terminated handler
    pub fn lose_context(&mut self, reason: String) {
        self.core.lose_context(&reason);
    }

    /// Velocities clamped during the last step
    pub fn last_step_clamped(&self) -> u32 {
        self.core.stability().last_step_clamped
    }

    /// Non-finite updates discarded since the last reset
    pub fn total_non_finite(&self) -> u64 {
        self.core.stability().total_non_finite
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    /// Copy the current buffer into the transfer buffer and return its address
    pub fn extract_state(&mut self) -> *const f32 {
        extract_mass_spring(self.core.current_state(), &mut self.transfer);
        self.transfer.as_ptr()
    }

    pub fn state_ptr(&self) -> *const f32 {
        self.transfer.as_ptr()
    }

    pub fn state_len_floats(&self) -> usize {
        self.transfer.len()
    }

    pub fn state_len_bytes(&self) -> usize {
        self.transfer.len() * std::mem::size_of::<f32>()
    }

    pub fn floats_per_particle(&self) -> usize {
        MASS_PARTICLE_FLOATS
    }
}

impl MassSpringWorld {
    fn with_config(config: MassSpringConfig) -> Result<MassSpringWorld, JsValue> {
        let core = MassSpringSystem::new(config).map_err(to_js)?;
        let mut world = Self { core, transfer: Vec::new() };
        world.extract_state();
        Ok(world)
    }

    pub fn system(&self) -> &MassSpringSystem {
        &self.core
    }

    pub fn transfer(&self) -> &[f32] {
        &self.transfer
    }
}

/// Fountain engine handle for JS. Same transfer-buffer contract as
/// [`MassSpringWorld`].
#[wasm_bindgen]
pub struct FountainWorld {
    core: FountainSystem,
    transfer: Vec<f32>,
}

#[wasm_bindgen]
impl FountainWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(particle_count: u32) -> Result<FountainWorld, JsValue> {
        Self::with_config(FountainConfig {
            particle_count,
            ..FountainConfig::default()
        })
    }

    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: String) -> Result<FountainWorld, JsValue> {
        let config = FountainConfig::from_json(&json).map_err(to_js)?;
        Self::with_config(config)
    }

    pub fn initialize(&mut self, json: String) -> Result<(), JsValue> {
        let config = FountainConfig::from_json(&json).map_err(to_js)?;
        self.core.initialize(config).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { saturating_u32(self.core.particle_count()) }

    #[wasm_bindgen(getter)]
    pub fn live_count(&self) -> u32 { saturating_u32(self.core.live_count()) }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.step_count() }

    #[wasm_bindgen(getter)]
    pub fn failed(&self) -> bool { self.core.state().is_failed() }

    pub fn step(&mut self, dt: f32) -> Result<(), JsValue> {
        self.core.step(dt).map_err(to_js)
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// Pointer position in clip space, sent once per frame by the input layer
    pub fn set_external_force(&mut self, x: f32, y: f32) {
        self.core.set_external_force(Vec2::new(x, y));
    }

    pub fn clear_external_force(&mut self) {
        self.core.clear_external_force();
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.core.set_seed(seed);
    }

    pub fn lose_context(&mut self, reason: String) {
        self.core.lose_context(&reason);
    }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    pub fn extract_state(&mut self) -> *const f32 {
        extract_fountain(self.core.current_state(), &mut self.transfer);
        self.transfer.as_ptr()
    }

    pub fn state_ptr(&self) -> *const f32 {
        self.transfer.as_ptr()
    }

    pub fn state_len_floats(&self) -> usize {
        self.transfer.len()
    }

    pub fn state_len_bytes(&self) -> usize {
        self.transfer.len() * std::mem::size_of::<f32>()
    }

    pub fn floats_per_particle(&self) -> usize {
        FOUNTAIN_PARTICLE_FLOATS
    }
}

impl FountainWorld {
    fn with_config(config: FountainConfig) -> Result<FountainWorld, JsValue> {
        let core = FountainSystem::new(config).map_err(to_js)?;
        let mut world = Self { core, transfer: Vec::new() };
        world.extract_state();
        Ok(world)
    }

    pub fn system(&self) -> &FountainSystem {
        &self.core
    }

    pub fn transfer(&self) -> &[f32] {
        &self.transfer
    }
}
