//! World-Space Vectors
//!
//! Single-precision vectors matching what the engine natives hand back.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// 3D vector in world space (meters).
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component (up)
    pub z: f32,
}

impl Vector3 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt).
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Component-wise midpoint.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Debug for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Position plus heading, as stored for apartment interiors.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector4 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// Heading in degrees
    pub w: f32,
}

impl Vector4 {
    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!((a.distance_squared(b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint_and_ops() {
        let min = Vector3::new(-1.0, -2.5, -0.5);
        let max = Vector3::new(1.0, 2.5, 1.5);
        assert_eq!(min.midpoint(max), Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(max - min, Vector3::new(2.0, 5.0, 2.0));
        assert_eq!(min + max, Vector3::new(0.0, 0.0, 1.0));
    }
}
