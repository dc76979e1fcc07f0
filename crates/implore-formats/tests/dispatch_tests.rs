//! Integration tests for the format catalog and dispatch tables

use std::borrow::Cow;
use std::mem::size_of;

use implore_formats::*;
use proptest::prelude::*;
use rstest::rstest;

/// Reports the resolved element type back to the caller
struct Resolve;

impl Dispatcher for Resolve {
    type Output = (DataFormatId, usize, usize);

    fn call<T: Element>(self) -> Self::Output {
        (T::FORMAT, size_of::<T>(), T::COMPONENTS)
    }
}

/// Counts how often it was invoked through a shared cell
struct Counting<'a>(&'a std::cell::Cell<u32>);

impl Dispatcher for Counting<'_> {
    type Output = ();

    fn call<T: Element>(self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_catalog_is_dense() {
    for (i, format) in FORMATS.iter().enumerate() {
        assert_eq!(format.id.id() as usize, i + 1);
        assert_eq!(DataFormatId::try_from(format.id.id()).unwrap(), format.id);
        assert_eq!(format.name.parse::<DataFormatId>().unwrap(), format.id);
    }
}

#[test]
fn test_descriptor_sizes_match_element_types() {
    for id in DataFormatId::ALL {
        let (resolved, size, components) = dispatch::<All, _>(id, Resolve).unwrap();
        let format = id.format().unwrap();
        assert_eq!(resolved, id);
        assert_eq!(format.size, size);
        assert_eq!(format.components, components);
        assert_eq!(format.size, format.components * format.precision / 8);
    }
}

#[rstest]
#[case(DataFormatId::Float16, 2, 1)]
#[case(DataFormatId::Float64, 8, 1)]
#[case(DataFormatId::Vec2Int8, 2, 2)]
#[case(DataFormatId::Vec3UInt8, 3, 3)]
#[case(DataFormatId::Vec3Float32, 12, 3)]
#[case(DataFormatId::Vec4UInt64, 32, 4)]
fn test_dispatch_resolves_native_type(
    #[case] id: DataFormatId,
    #[case] size: usize,
    #[case] components: usize,
) {
    assert_eq!(dispatch::<All, _>(id, Resolve).unwrap(), (id, size, components));
}

#[rstest]
#[case::floats_reject_uint(DataFormatId::UInt8)]
#[case::floats_reject_vec_int(DataFormatId::Vec4Int32)]
fn test_filtered_out_format_fails(#[case] id: DataFormatId) {
    let count = std::cell::Cell::new(0);
    let err = dispatch::<Floats, _>(id, Counting(&count)).unwrap_err();
    assert!(matches!(err, DispatchError::FormatNotSupported { format, .. } if format == id));
    assert_eq!(count.get(), 0);
}

#[test]
fn test_not_specialized_fails_for_every_filter() {
    fn check<F: FormatFilter>() {
        assert_eq!(
            dispatch::<F, _>(DataFormatId::NotSpecialized, Resolve),
            Err(DispatchError::FormatNotSpecialized)
        );
    }
    check::<All>();
    check::<Floats>();
    check::<Vec3s>();
    check::<UnsignedIntegerScalars>();
    check::<Not<All>>();
}

#[test]
fn test_table_slots_match_filters() {
    fn check<F: FormatFilter>() {
        for format in FORMATS.iter() {
            assert_eq!(
                DispatchTable::<Resolve, F>::ENTRIES[format.id.index().unwrap()].is_some(),
                F::accepts(format),
                "{} / {}",
                F::name(),
                format
            );
        }
    }
    check::<All>();
    check::<Scalars>();
    check::<Vec2s>();
    check::<Float3s>();
    check::<SignedIntegerScalars>();
    check::<And<Integers, Not<Vec4s>>>();
}

/// Accepts exactly scalar FLOAT32, Vec3UINT8 and scalar INT16
struct Sampled;

impl FormatFilter for Sampled {
    const MASK: FormatMask = {
        let mut mask = [false; FORMAT_COUNT];
        mask[DataFormatId::Float32 as usize - 1] = true;
        mask[DataFormatId::Vec3UInt8 as usize - 1] = true;
        mask[DataFormatId::Int16 as usize - 1] = true;
        mask
    };

    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Sampled")
    }
}

#[test]
fn test_three_format_catalog_with_float_filter() {
    type SampledFloats = And<Sampled, Floats>;

    let (resolved, size, _) = dispatch::<SampledFloats, _>(DataFormatId::Float32, Resolve).unwrap();
    assert_eq!(resolved, DataFormatId::Float32);
    assert_eq!(size, size_of::<f32>());

    let err = dispatch::<SampledFloats, _>(DataFormatId::Vec3UInt8, Resolve).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Format Vec3UINT8 (id 30) not supported, expected type matching (Sampled & Floats)"
    );

    assert!(dispatch::<SampledFloats, _>(DataFormatId::Int16, Resolve).is_err());
    assert_eq!(
        dispatch::<SampledFloats, _>(DataFormatId::NotSpecialized, Resolve),
        Err(DispatchError::FormatNotSpecialized)
    );
}

struct SizePair;

impl Dispatcher2 for SizePair {
    type Output = (usize, usize);

    fn call<T1: Element, T2: Element>(self) -> Self::Output {
        (size_of::<T1>(), size_of::<T2>())
    }
}

#[test]
fn test_double_dispatch_filters_each_side() {
    assert_eq!(
        dispatch2::<Scalars, Vecs, _>(DataFormatId::UInt32, DataFormatId::Vec2Float64, SizePair),
        Ok((4, 16))
    );
    let err =
        dispatch2::<Scalars, Vecs, _>(DataFormatId::UInt32, DataFormatId::UInt32, SizePair)
            .unwrap_err();
    assert_eq!(
        err,
        DispatchError::FormatNotSupported {
            format: DataFormatId::UInt32,
            expected: Cow::Borrowed("Vecs"),
        }
    );
}

/// Counts invocations of the fully resolved triple
struct CountingTriple<'a>(&'a std::cell::Cell<u32>);

impl Dispatcher3 for CountingTriple<'_> {
    type Output = ();

    fn call<T1: Element, T2: Element, T3: Element>(self) {
        self.0.set(self.0.get() + 1);
    }
}

#[rstest]
#[case::first_unspecialized(
    [DataFormatId::NotSpecialized, DataFormatId::Float32, DataFormatId::Float32],
    DispatchError::FormatNotSpecialized
)]
#[case::second_unspecialized(
    [DataFormatId::Float32, DataFormatId::NotSpecialized, DataFormatId::Float32],
    DispatchError::FormatNotSpecialized
)]
#[case::third_unspecialized(
    [DataFormatId::Float32, DataFormatId::Float32, DataFormatId::NotSpecialized],
    DispatchError::FormatNotSpecialized
)]
#[case::third_rejected(
    [DataFormatId::Float32, DataFormatId::Float32, DataFormatId::Int8],
    DispatchError::FormatNotSupported { format: DataFormatId::Int8, expected: Cow::Borrowed("Floats") }
)]
fn test_triple_dispatch_failure_at_each_level(
    #[case] formats: [DataFormatId; 3],
    #[case] expected: DispatchError,
) {
    let calls = std::cell::Cell::new(0);
    let result = dispatch3::<Floats, Floats, Floats, _>(
        formats[0],
        formats[1],
        formats[2],
        CountingTriple(&calls),
    );
    assert_eq!(result, Err(expected));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_double_dispatch_second_unspecialized() {
    assert_eq!(
        dispatch2::<All, All, _>(DataFormatId::Vec4UInt8, DataFormatId::NotSpecialized, SizePair),
        Err(DispatchError::FormatNotSpecialized)
    );
}

fn format_id() -> impl Strategy<Value = DataFormatId> {
    (1u8..=FORMAT_COUNT as u8).prop_map(|id| DataFormatId::try_from(id).unwrap())
}

proptest! {
    #[test]
    fn prop_dispatch_agrees_with_filter(id in format_id()) {
        let format = id.format().unwrap();
        let result = dispatch::<Float3s, _>(id, Resolve);
        prop_assert_eq!(result.is_ok(), format.is_float() && format.components == 3);
        if let Ok((resolved, _, _)) = result {
            prop_assert_eq!(resolved, id);
        }
    }

    #[test]
    fn prop_double_dispatch_resolves_both(a in format_id(), b in format_id()) {
        let (sa, sb) = dispatch2::<All, All, _>(a, b, SizePair).unwrap();
        prop_assert_eq!(sa, a.format().unwrap().size);
        prop_assert_eq!(sb, b.format().unwrap().size);
    }

    #[test]
    fn prop_normalized_u8_within_one_step(x in 0.0f64..=1.0) {
        let v: u8 = from_normalized_dvec([x]);
        let back = to_normalized_dvec::<u8, 1>(&v)[0];
        prop_assert!((back - x).abs() <= 1.0 / 255.0);
    }
}
