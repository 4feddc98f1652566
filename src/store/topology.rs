//! Spring topology
//!
//! Springs are immutable during a step. Alongside the spring list we keep a
//! CSR incidence table: for particle `i`, `entries[offsets[i]..offsets[i + 1]]`
//! lists every spring touching it together with the sign of the force it
//! receives. The gather pass walks this table in a fixed order, which keeps
//! float summation identical no matter how particles are scheduled.

use crate::domain::{Result, SimError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
    pub stiffness: f32,
}

impl Spring {
    pub fn new(a: u32, b: u32, rest_length: f32, stiffness: f32) -> Self {
        Self { a, b, rest_length, stiffness }
    }
}

/// One row of the incidence table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Incidence {
    pub spring: u32,
    /// +1 when the particle is endpoint `a`, -1 when it is `b`
    pub sign: i8,
}

#[derive(Clone, Debug, Default)]
pub struct SpringTopology {
    springs: Vec<Spring>,
    offsets: Vec<u32>,
    entries: Vec<Incidence>,
}

/// Number of springs in a `width × height` 4-neighbour lattice
pub fn lattice_spring_count(width: u32, height: u32) -> usize {
    let (w, h) = (width as usize, height as usize);
    h * w.saturating_sub(1) + w * h.saturating_sub(1)
}

/// Row-major horizontal springs first, then vertical springs.
pub fn build_lattice(width: u32, height: u32, rest_spacing: f32, stiffness: f32) -> Vec<Spring> {
    let mut springs = Vec::with_capacity(lattice_spring_count(width, height));
    for j in 0..height {
        for i in 0..width.saturating_sub(1) {
            let idx = j * width + i;
            springs.push(Spring::new(idx, idx + 1, rest_spacing, stiffness));
        }
    }
    for j in 0..height.saturating_sub(1) {
        for i in 0..width {
            let idx = j * width + i;
            springs.push(Spring::new(idx, idx + width, rest_spacing, stiffness));
        }
    }
    springs
}

impl SpringTopology {
    pub fn lattice(width: u32, height: u32, rest_spacing: f32, stiffness: f32) -> Result<Self> {
        let count = width as usize * height as usize;
        Self::from_springs(build_lattice(width, height, rest_spacing, stiffness), count)
    }

    /// Validate a custom spring set against `particle_count` and index it
    pub fn from_springs(springs: Vec<Spring>, particle_count: usize) -> Result<Self> {
        for (s, spring) in springs.iter().enumerate() {
            if spring.a as usize >= particle_count || spring.b as usize >= particle_count {
                return Err(SimError::config(format!(
                    "spring {s} endpoint ({}, {}) out of range for {particle_count} particles",
                    spring.a, spring.b
                )));
            }
            if spring.a == spring.b {
                return Err(SimError::config(format!(
                    "spring {s} connects particle {} to itself",
                    spring.a
                )));
            }
            if !(spring.rest_length.is_finite() && spring.rest_length >= 0.0) {
                return Err(SimError::config(format!("spring {s} has invalid rest length")));
            }
            if !(spring.stiffness.is_finite() && spring.stiffness >= 0.0) {
                return Err(SimError::config(format!("spring {s} has invalid stiffness")));
            }
        }
        if springs.len() > u32::MAX as usize {
            return Err(SimError::config("too many springs"));
        }

        // Counting sort into CSR
        let mut degree = vec![0u32; particle_count + 1];
        for spring in &springs {
            degree[spring.a as usize + 1] += 1;
            degree[spring.b as usize + 1] += 1;
        }
        let mut offsets = degree;
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }
        let mut cursor = offsets.clone();
        let mut entries = vec![Incidence { spring: 0, sign: 0 }; springs.len() * 2];
        for (s, spring) in springs.iter().enumerate() {
            for (end, sign) in [(spring.a, 1i8), (spring.b, -1i8)] {
                let slot = &mut cursor[end as usize];
                entries[*slot as usize] = Incidence { spring: s as u32, sign };
                *slot += 1;
            }
        }

        Ok(Self { springs, offsets, entries })
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Springs touching particle `i`, in spring-index order
    #[inline]
    pub fn incident(&self, i: usize) -> &[Incidence] {
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        &self.entries[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_lattice_has_2n_n_minus_1_springs() {
        for n in 1..6u32 {
            let springs = build_lattice(n, n, 0.1, 4.0);
            assert_eq!(springs.len(), (2 * n * n.saturating_sub(1)) as usize);
        }
    }

    #[test]
    fn lattice_order_is_horizontal_then_vertical() {
        let springs = build_lattice(3, 2, 0.5, 1.0);
        let pairs: Vec<(u32, u32)> = springs.iter().map(|s| (s.a, s.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (3, 4), (4, 5), (0, 3), (1, 4), (2, 5)]);
    }

    #[test]
    fn lattice_has_no_diagonals_or_duplicates() {
        let springs = build_lattice(4, 4, 0.1, 1.0);
        let mut seen = std::collections::HashSet::new();
        for s in &springs {
            let (lo, hi) = (s.a.min(s.b), s.a.max(s.b));
            assert!(seen.insert((lo, hi)));
            let d = hi - lo;
            assert!(d == 1 || d == 4);
        }
    }

    #[test]
    fn incidence_covers_every_endpoint_once() {
        let topo = SpringTopology::lattice(3, 3, 0.1, 1.0).unwrap();
        // center particle of a 3x3 grid has four neighbours
        assert_eq!(topo.incident(4).len(), 4);
        // corners have two
        assert_eq!(topo.incident(0).len(), 2);
        let total: usize = (0..9).map(|i| topo.incident(i).len()).sum();
        assert_eq!(total, topo.len() * 2);
        for inc in topo.incident(0) {
            let s = topo.springs()[inc.spring as usize];
            assert_eq!(s.a, 0);
            assert_eq!(inc.sign, 1);
        }
    }

    #[test]
    fn out_of_range_endpoint_is_rejected() {
        let err = SpringTopology::from_springs(vec![Spring::new(0, 5, 1.0, 1.0)], 2);
        assert!(matches!(err, Err(SimError::Configuration(_))));
    }

    #[test]
    fn self_loop_is_rejected() {
        let err = SpringTopology::from_springs(vec![Spring::new(1, 1, 1.0, 1.0)], 2);
        assert!(err.is_err());
    }
}
