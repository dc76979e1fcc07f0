//! Sampling metadata carried by every representation
//!
//! Swizzle mask, interpolation and wrapping do not affect the stored data;
//! they describe how consumers should sample it.

use implore_formats::DataFormat;
use serde::{Deserialize, Serialize};

/// Source of one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwizzleChannel {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

/// Channel remapping applied when sampling, in RGBA order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwizzleMask(pub [SwizzleChannel; 4]);

impl SwizzleMask {
    /// Identity mapping
    pub const RGBA: SwizzleMask = SwizzleMask([
        SwizzleChannel::Red,
        SwizzleChannel::Green,
        SwizzleChannel::Blue,
        SwizzleChannel::Alpha,
    ]);

    /// Red replicated into RGB, opaque alpha
    pub const LUMINANCE: SwizzleMask = SwizzleMask([
        SwizzleChannel::Red,
        SwizzleChannel::Red,
        SwizzleChannel::Red,
        SwizzleChannel::One,
    ]);

    /// Red replicated into RGB, green as alpha
    pub const LUMINANCE_ALPHA: SwizzleMask = SwizzleMask([
        SwizzleChannel::Red,
        SwizzleChannel::Red,
        SwizzleChannel::Red,
        SwizzleChannel::Green,
    ]);

    /// Color channels as stored, opaque alpha
    pub const RGB: SwizzleMask = SwizzleMask([
        SwizzleChannel::Red,
        SwizzleChannel::Green,
        SwizzleChannel::Blue,
        SwizzleChannel::One,
    ]);

    /// Default mask for a format with the given channel count
    pub fn default_for(components: usize) -> SwizzleMask {
        match components {
            1 => SwizzleMask::LUMINANCE,
            2 => SwizzleMask::LUMINANCE_ALPHA,
            3 => SwizzleMask::RGB,
            _ => SwizzleMask::RGBA,
        }
    }
}

impl Default for SwizzleMask {
    fn default() -> Self {
        SwizzleMask::RGBA
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationType {
    Nearest,
    #[default]
    Linear,
}

/// Boundary handling for one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wrapping {
    #[default]
    Clamp,
    Repeat,
    Mirror,
}

impl Wrapping {
    /// Map a possibly out-of-range coordinate into `0..dim`.
    ///
    /// `dim` must be non-zero.
    pub fn apply(self, i: i64, dim: usize) -> usize {
        let n = dim as i64;
        let wrapped = match self {
            Wrapping::Clamp => i.clamp(0, n - 1),
            Wrapping::Repeat => i.rem_euclid(n),
            Wrapping::Mirror => {
                let m = i.rem_euclid(2 * n);
                if m < n {
                    m
                } else {
                    2 * n - 1 - m
                }
            }
        };
        wrapped as usize
    }
}

/// Per-axis wrapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wrapping3D {
    pub x: Wrapping,
    pub y: Wrapping,
    pub z: Wrapping,
}

impl Wrapping3D {
    pub const fn all(mode: Wrapping) -> Self {
        Self {
            x: mode,
            y: mode,
            z: mode,
        }
    }

    pub const fn clamp_all() -> Self {
        Self::all(Wrapping::Clamp)
    }

    pub const fn repeat_all() -> Self {
        Self::all(Wrapping::Repeat)
    }
}

/// Sampling metadata of a representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub swizzle_mask: SwizzleMask,
    pub interpolation: InterpolationType,
    pub wrapping: Wrapping3D,
}

impl VolumeMetadata {
    pub fn new(
        swizzle_mask: SwizzleMask,
        interpolation: InterpolationType,
        wrapping: Wrapping3D,
    ) -> Self {
        Self {
            swizzle_mask,
            interpolation,
            wrapping,
        }
    }

    /// Defaults for `format`: its channel count's swizzle mask, linear
    /// interpolation and clamping
    pub fn for_format(format: &DataFormat) -> Self {
        Self {
            swizzle_mask: SwizzleMask::default_for(format.components),
            ..Self::default()
        }
    }
}
