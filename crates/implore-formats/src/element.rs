//! Voxel element types
//!
//! An [`Element`] is the native type stored per voxel: either a bare
//! [`Primitive`] or a fixed array `[P; N]` with `N` in `2..=4`. Each
//! element type is tied to exactly one [`DataFormatId`] through the catalog.

use std::fmt::Debug;

use bytemuck::Pod;
use half::f16;

use crate::format::{DataFormat, DataFormatId, FORMATS};
use crate::numeric::Primitive;

/// Component structure of an element type
pub trait ComponentLayout {
    type Primitive: Primitive;
    const COMPONENTS: usize;
}

macro_rules! impl_scalar_layout {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ComponentLayout for $ty {
                type Primitive = $ty;
                const COMPONENTS: usize = 1;
            }
        )*
    };
}

impl_scalar_layout!(f16, f32, f64, i8, i16, i32, i64, u8, u16, u32, u64);

impl<P: Primitive, const N: usize> ComponentLayout for [P; N] {
    type Primitive = P;
    const COMPONENTS: usize = N;
}

/// A type that can be stored as one voxel of a typed volume.
///
/// Implemented for every entry of the format catalog and nothing else.
pub trait Element:
    ComponentLayout + Copy + Default + PartialEq + Debug + Pod + Send + Sync + 'static
{
    const FORMAT: DataFormatId;

    /// Static descriptor of this element's format
    fn data_format() -> &'static DataFormat {
        &FORMATS[Self::FORMAT as usize - 1]
    }

    /// The components of this value, in order
    #[inline]
    fn components(&self) -> &[Self::Primitive] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    #[inline]
    fn components_mut(&mut self) -> &mut [Self::Primitive] {
        bytemuck::cast_slice_mut(std::slice::from_mut(self))
    }

    /// Build a value from a per-component generator
    #[inline]
    fn from_fn(mut f: impl FnMut(usize) -> Self::Primitive) -> Self {
        let mut value = Self::default();
        for (i, c) in value.components_mut().iter_mut().enumerate() {
            *c = f(i);
        }
        value
    }
}

macro_rules! impl_elements {
    ($($variant:ident = $id:literal => $ty:ty, $name:literal;)*) => {
        $(
            impl Element for $ty {
                const FORMAT: DataFormatId = DataFormatId::$variant;
            }
        )*
    };
}

crate::for_each_format!(impl_elements);
