/// Per-step counters reduced across particles
///
/// Every worker returns its own tally and they are summed afterwards, so the
/// kernels never share a mutable counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepTally {
    /// Velocities shortened by the speed clamp
    pub clamped: u32,
    /// Updates discarded because they produced NaN/Inf
    pub non_finite: u32,
    /// Fountain slots recycled this step
    pub respawned: u32,
}

impl std::ops::Add for StepTally {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            clamped: self.clamped + rhs.clamped,
            non_finite: self.non_finite + rhs.non_finite,
            respawned: self.respawned + rhs.respawned,
        }
    }
}

impl std::iter::Sum for StepTally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(StepTally::default(), |a, b| a + b)
    }
}
