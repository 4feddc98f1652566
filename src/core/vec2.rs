use serde::{Deserialize, Serialize};

/// 2D vector used for particle positions, velocities and forces
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Shrink to `max_len` if longer. Returns true when the vector was clamped.
    #[inline]
    pub fn clamp_length(&mut self, max_len: f32) -> bool {
        let len2 = self.length_squared();
        if len2 > max_len * max_len {
            let scale = max_len / len2.sqrt();
            self.x *= scale;
            self.y *= scale;
            true
        } else {
            false
        }
    }

    /// Bitwise comparison, so `-0.0 != 0.0` and `NaN == NaN` for the same payload
    #[inline]
    pub fn bits_eq(&self, other: &Vec2) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_length_only_shrinks_long_vectors() {
        let mut short = Vec2::new(0.3, 0.4);
        assert!(!short.clamp_length(1.0));
        assert_eq!(short, Vec2::new(0.3, 0.4));

        let mut long = Vec2::new(30.0, 40.0);
        assert!(long.clamp_length(5.0));
        assert!((long.length() - 5.0).abs() < 1e-5);
        assert!((long.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn bits_eq_distinguishes_signed_zero() {
        assert!(Vec2::new(1.0, 2.0).bits_eq(&Vec2::new(1.0, 2.0)));
        assert!(!Vec2::new(0.0, 0.0).bits_eq(&Vec2::new(-0.0, 0.0)));
    }
}
