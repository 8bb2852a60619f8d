use std::ops::{Add, Div, Mul, Sub};

/// Number of clusters the engine maintains.
pub const NUM_CLUSTERS: usize = 4;

/// A plain 3-component vector, used for positions, colors (0..=255 per channel)
/// and surface normals alike.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline(always)]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub fn squared_distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz))
    }

    #[inline(always)]
    pub fn dot(self, other: Self) -> f32 {
        self.x.mul_add(other.x, self.y.mul_add(other.y, self.z * other.z))
    }

    /// Exact comparison: the acquisition side writes a literal zero for
    /// "no orientation reading".
    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// The feature tuple the distance metric compares.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Features {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_known_values() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.squared_distance(b) - 27.0).abs() < 1e-6);
        assert_eq!(a.squared_distance(a), 0.0);
    }

    #[test]
    fn dot_of_orthogonal_unit_vectors() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.dot(y), 0.0);
        assert_eq!(x.dot(x), 1.0);
    }

    #[test]
    fn zero_detection() {
        assert!(Vec3::ZERO.is_zero());
        assert!(Vec3::default().is_zero());
        assert!(!Vec3::new(0.0, 0.0, 1e-9).is_zero());
    }

    #[test]
    fn arithmetic() {
        let a = Vec3::new(2.0, 4.0, 6.0);
        assert_eq!(a / 2.0, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a * 0.5 + Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(a - a, Vec3::ZERO);
    }
}
