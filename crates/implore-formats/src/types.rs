//! Small value types shared by the implore volume crates
//!
//! Double-precision vectors are the exchange type for type-erased voxel
//! access; [`Size3`] holds volume dimensions and voxel positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D vector of f64 values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2d {
    pub x: f64,
    pub y: f64,
}

impl Vec2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Vec2d {
    fn from(arr: [f64; 2]) -> Self {
        Self { x: arr[0], y: arr[1] }
    }
}

impl From<Vec2d> for [f64; 2] {
    fn from(v: Vec2d) -> Self {
        v.to_array()
    }
}

/// A 3D vector of f64 values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3d {
    fn from(arr: [f64; 3]) -> Self {
        Self { x: arr[0], y: arr[1], z: arr[2] }
    }
}

impl From<Vec3d> for [f64; 3] {
    fn from(v: Vec3d) -> Self {
        v.to_array()
    }
}

/// A 4D vector of f64 values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4d {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f64; 4]> for Vec4d {
    fn from(arr: [f64; 4]) -> Self {
        Self { x: arr[0], y: arr[1], z: arr[2], w: arr[3] }
    }
}

impl From<Vec4d> for [f64; 4] {
    fn from(v: Vec4d) -> Self {
        v.to_array()
    }
}

/// Extent or position in a 3D grid, x varying fastest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Size3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Same extent on every axis
    pub const fn splat(n: usize) -> Self {
        Self { x: n, y: n, z: n }
    }

    /// Number of cells, `x * y * z`
    pub const fn product(&self) -> usize {
        self.x * self.y * self.z
    }

    pub fn to_array(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Component-wise sum
    pub fn offset(&self, other: Size3) -> Size3 {
        Size3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// True when every component is strictly below the matching component
    /// of `bounds`
    pub fn fits_in(&self, bounds: Size3) -> bool {
        self.x < bounds.x && self.y < bounds.y && self.z < bounds.z
    }
}

impl From<[usize; 3]> for Size3 {
    fn from(arr: [usize; 3]) -> Self {
        Self { x: arr[0], y: arr[1], z: arr[2] }
    }
}

impl From<Size3> for [usize; 3] {
    fn from(s: Size3) -> Self {
        s.to_array()
    }
}

impl fmt::Display for Size3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
