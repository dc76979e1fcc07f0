//! Linear voxel addressing
//!
//! Voxels are stored x-fastest: `index = x + y * dim.x + z * dim.x * dim.y`.

use implore_formats::Size3;

use crate::meta::Wrapping3D;

/// Linear index of `pos` in a grid of `dim`. No bounds check.
#[inline]
pub fn pos_to_index(pos: Size3, dim: Size3) -> usize {
    pos.x + pos.y * dim.x + pos.z * dim.x * dim.y
}

/// Inverse of [`pos_to_index`]
#[inline]
pub fn index_to_pos(index: usize, dim: Size3) -> Size3 {
    let plane = dim.x * dim.y;
    Size3::new(index % dim.x, (index % plane) / dim.x, index / plane)
}

/// Linear index of `pos` after wrapping each component modulo `dim`.
///
/// Negative components wrap from the far side, so `-1` addresses the last
/// voxel along that axis. Every component of `dim` must be non-zero.
#[inline]
pub fn periodic_pos_to_index(pos: [i64; 3], dim: Size3) -> usize {
    let wrapped = Size3::new(
        pos[0].rem_euclid(dim.x as i64) as usize,
        pos[1].rem_euclid(dim.y as i64) as usize,
        pos[2].rem_euclid(dim.z as i64) as usize,
    );
    pos_to_index(wrapped, dim)
}

/// Linear index of `pos` with per-axis boundary handling
#[inline]
pub fn wrapped_pos_to_index(pos: [i64; 3], dim: Size3, wrapping: Wrapping3D) -> usize {
    let wrapped = Size3::new(
        wrapping.x.apply(pos[0], dim.x),
        wrapping.y.apply(pos[1], dim.y),
        wrapping.z.apply(pos[2], dim.z),
    );
    pos_to_index(wrapped, dim)
}
