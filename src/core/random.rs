//! Seedable xorshift32 generator.
//!
//! Sequential users (reset layouts) hold one `SimRng`. Parallel kernels derive
//! an independent stream per `(seed, step, index)` with [`SimRng::for_slot`],
//! so the values a particle draws never depend on worker scheduling.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimRng {
    state: u32,
}

impl SimRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Stream for one particle slot at one step
    pub fn for_slot(seed: u32, step: u64, index: usize) -> Self {
        let mut h = seed as u64;
        h ^= step.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        h ^= (index as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        Self::new(mix64(h) as u32)
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn set_state(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Float in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits keep the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Float in [min, max)
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

// splitmix64 finalizer
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
