//! Numeric kinds and the component primitives of voxel formats
//!
//! A [`Primitive`] is one component of a voxel element: one of the eleven
//! scalar types `f16, f32, f64, i8..i64, u8..u64`. Vector formats are built
//! from arrays of primitives.

use std::fmt::Debug;

use bytemuck::Pod;
use half::f16;
use serde::{Deserialize, Serialize};

/// Numeric kind of a format's components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericType {
    Float,
    SignedInteger,
    UnsignedInteger,
}

impl NumericType {
    pub const fn is_float(&self) -> bool {
        matches!(self, NumericType::Float)
    }

    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NumericType::Float => "float",
            NumericType::SignedInteger => "signed integer",
            NumericType::UnsignedInteger => "unsigned integer",
        }
    }
}

/// A scalar component type.
///
/// Conversions come in two flavours:
///
/// - plain (`to_f64` / `from_f64`): a numeric cast. Float to integer
///   truncates toward zero and saturates at the type's bounds.
/// - normalized (`to_normalized` / `from_normalized`): floats pass through
///   unchanged; integers map their full representable range linearly onto
///   `[0, 1]`. The inverse rounds to nearest and saturates.
pub trait Primitive:
    Copy + Default + PartialOrd + Debug + Pod + Send + Sync + 'static
{
    const NUMERIC_TYPE: NumericType;

    /// Bits per component
    const PRECISION: usize;

    /// Lowest representable value
    const LOWEST: f64;

    /// Largest representable value
    const MAX: f64;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    fn to_normalized(self) -> f64;

    fn from_normalized(value: f64) -> Self;
}

impl Primitive for f16 {
    const NUMERIC_TYPE: NumericType = NumericType::Float;
    const PRECISION: usize = 16;
    const LOWEST: f64 = -65504.0;
    const MAX: f64 = 65504.0;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn to_normalized(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_normalized(value: f64) -> Self {
        f16::from_f64(value)
    }
}

macro_rules! impl_float {
    ($($ty:ty => $bits:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const NUMERIC_TYPE: NumericType = NumericType::Float;
                const PRECISION: usize = $bits;
                const LOWEST: f64 = <$ty>::MIN as f64;
                const MAX: f64 = <$ty>::MAX as f64;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_normalized(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_normalized(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty => $bits:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const NUMERIC_TYPE: NumericType = NumericType::UnsignedInteger;
                const PRECISION: usize = $bits;
                const LOWEST: f64 = 0.0;
                const MAX: f64 = <$ty>::MAX as f64;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_normalized(self) -> f64 {
                    self as f64 / <Self as Primitive>::MAX
                }

                #[inline]
                fn from_normalized(value: f64) -> Self {
                    (value * <Self as Primitive>::MAX).round() as $ty
                }
            }
        )*
    };
}

macro_rules! impl_signed {
    ($($ty:ty => $bits:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const NUMERIC_TYPE: NumericType = NumericType::SignedInteger;
                const PRECISION: usize = $bits;
                const LOWEST: f64 = <$ty>::MIN as f64;
                const MAX: f64 = <$ty>::MAX as f64;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_normalized(self) -> f64 {
                    let (lowest, max) = (<Self as Primitive>::LOWEST, <Self as Primitive>::MAX);
                    (self as f64 - lowest) / (max - lowest)
                }

                #[inline]
                fn from_normalized(value: f64) -> Self {
                    let (lowest, max) = (<Self as Primitive>::LOWEST, <Self as Primitive>::MAX);
                    (value * (max - lowest) + lowest).round() as $ty
                }
            }
        )*
    };
}

impl_float!(f32 => 32, f64 => 64);
impl_unsigned!(u8 => 8, u16 => 16, u32 => 32, u64 => 64);
impl_signed!(i8 => 8, i16 => 16, i32 => 32, i64 => 64);
