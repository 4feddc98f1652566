use wasm_bindgen::prelude::*;

use crate::systems::StepTally;

/// Snapshot of the last step (zeros when perf metrics are disabled)
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(crate) step_ms: f64,
    pub(crate) springs_ms: f64,
    pub(crate) integrate_ms: f64,
    pub(crate) particle_count: u32,
    pub(crate) spring_count: u32,
    pub(crate) live_count: u32,
    pub(crate) clamped: u32,
    pub(crate) non_finite: u32,
    pub(crate) respawned: u32,
    pub(crate) memory_bytes: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }

    pub(crate) fn record_tally(&mut self, tally: &StepTally) {
        self.clamped = tally.clamped;
        self.non_finite = tally.non_finite;
        self.respawned = tally.respawned;
    }
}

/// Narrow a size for the u32 getters, pinning at `u32::MAX` instead of wrapping
#[inline]
pub(crate) fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn springs_ms(&self) -> f64 { self.springs_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
    #[wasm_bindgen(getter)]
    pub fn spring_count(&self) -> u32 { self.spring_count }
    #[wasm_bindgen(getter)]
    pub fn live_count(&self) -> u32 { self.live_count }
    #[wasm_bindgen(getter)]
    pub fn clamped(&self) -> u32 { self.clamped }
    #[wasm_bindgen(getter)]
    pub fn non_finite(&self) -> u32 { self.non_finite }
    #[wasm_bindgen(getter)]
    pub fn respawned(&self) -> u32 { self.respawned }
    #[wasm_bindgen(getter)]
    pub fn memory_bytes(&self) -> u32 { self.memory_bytes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_u32_pins_instead_of_wrapping() {
        assert_eq!(saturating_u32(1234), 1234);
        assert_eq!(saturating_u32(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(saturating_u32(u32::MAX as usize + 4096), u32::MAX);
    }
}
