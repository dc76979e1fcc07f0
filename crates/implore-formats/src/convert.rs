//! Element conversions to and from double-precision channels
//!
//! Widening to more channels than the element has pads with `0`; narrowing
//! drops the trailing channels. Plain conversions cast each component,
//! normalized ones go through [`Primitive::to_normalized`] and
//! [`Primitive::from_normalized`].

use crate::element::{ComponentLayout, Element};
use crate::numeric::Primitive;

type Prim<T> = <T as ComponentLayout>::Primitive;

/// Components of `value` as `N` doubles
#[inline]
pub fn to_dvec<T: Element, const N: usize>(value: &T) -> [f64; N] {
    let mut out = [0.0; N];
    for (o, c) in out.iter_mut().zip(value.components()) {
        *o = c.to_f64();
    }
    out
}

/// Components of `value` as `N` normalized doubles
#[inline]
pub fn to_normalized_dvec<T: Element, const N: usize>(value: &T) -> [f64; N] {
    let mut out = [0.0; N];
    for (o, c) in out.iter_mut().zip(value.components()) {
        *o = c.to_normalized();
    }
    out
}

#[inline]
pub fn from_dvec<T: Element, const N: usize>(value: [f64; N]) -> T {
    T::from_fn(|i| value.get(i).map_or_else(Prim::<T>::default, |&v| Prim::<T>::from_f64(v)))
}

#[inline]
pub fn from_normalized_dvec<T: Element, const N: usize>(value: [f64; N]) -> T {
    T::from_fn(|i| {
        value
            .get(i)
            .map_or_else(Prim::<T>::default, |&v| Prim::<T>::from_normalized(v))
    })
}

/// Component-wise plain cast between two element types
#[inline]
pub fn convert<S: Element, D: Element>(value: &S) -> D {
    let src = value.components();
    D::from_fn(|i| {
        src.get(i)
            .map_or_else(Prim::<D>::default, |c| Prim::<D>::from_f64(c.to_f64()))
    })
}

/// Component-wise normalized conversion between two element types, e.g.
/// `u8` 255 becomes `u16` 65535 and `f32` 1.0
#[inline]
pub fn convert_normalized<S: Element, D: Element>(value: &S) -> D {
    let src = value.components();
    D::from_fn(|i| {
        src.get(i).map_or_else(Prim::<D>::default, |c| {
            Prim::<D>::from_normalized(c.to_normalized())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_widen_pads_with_zero() {
        assert_eq!(to_dvec::<u16, 4>(&1000), [1000.0, 0.0, 0.0, 0.0]);
        assert_eq!(to_dvec::<[i8; 2], 3>(&[-3, 4]), [-3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_narrow_drops_channels() {
        assert_eq!(to_dvec::<[f32; 4], 1>(&[1.5, 2.0, 3.0, 4.0]), [1.5]);
        let v: u8 = from_dvec([7.0, 8.0, 9.0]);
        assert_eq!(v, 7);
    }

    #[test]
    fn test_from_dvec_pads_native_zero() {
        let v: [i16; 4] = from_dvec([1.0, 2.0]);
        assert_eq!(v, [1, 2, 0, 0]);
        let v: [i8; 3] = from_normalized_dvec([1.0]);
        assert_eq!(v, [127, 0, 0]);
    }

    #[test]
    fn test_plain_cast_truncates_and_saturates() {
        let v: i8 = from_dvec([-3.7]);
        assert_eq!(v, -3);
        let v: u8 = from_dvec([300.0]);
        assert_eq!(v, 255);
        let v: u8 = from_dvec([-1.0]);
        assert_eq!(v, 0);
    }

    #[test]
    fn test_normalized_unsigned() {
        assert_eq!(to_normalized_dvec::<u8, 1>(&255), [1.0]);
        assert_eq!(to_normalized_dvec::<u8, 1>(&0), [0.0]);
        let v: u8 = from_normalized_dvec([0.5]);
        assert_eq!(v, 128);
    }

    #[test]
    fn test_normalized_signed_full_range() {
        assert_eq!(to_normalized_dvec::<i8, 1>(&-128), [0.0]);
        assert_eq!(to_normalized_dvec::<i8, 1>(&127), [1.0]);
        let v: i8 = from_normalized_dvec([0.0]);
        assert_eq!(v, -128);
    }

    #[test]
    fn test_float_normalized_is_identity() {
        assert_eq!(to_normalized_dvec::<f64, 1>(&-2.5), [-2.5]);
        let v: f16 = from_normalized_dvec([0.5]);
        assert_eq!(v, f16::from_f32(0.5));
    }

    #[test]
    fn test_convert_between_formats() {
        let v: [u16; 3] = convert_normalized(&[255u8, 0, 51]);
        assert_eq!(v, [65535, 0, 13107]);
        let v: f32 = convert_normalized(&[255u8, 0]);
        assert_eq!(v, 1.0);
        let v: [f64; 2] = convert(&7i32);
        assert_eq!(v, [7.0, 0.0]);
    }
}
