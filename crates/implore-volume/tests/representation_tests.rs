//! Integration tests for type-erased volume representations

use implore_formats::{All, Floats, Integers};
use implore_volume::*;
use proptest::prelude::*;
use rstest::rstest;

fn boxed(format: DataFormatId, dims: Size3) -> Box<dyn VolumeRepresentation> {
    create_volume(dims, format, None, VolumeMetadata::default()).unwrap()
}

#[test]
fn test_uint16_set_and_get() {
    let mut volume = TypedVolume::<u16>::new(Size3::new(2, 2, 1));
    let rep: &mut dyn VolumeRepresentation = &mut volume;

    rep.set_from_double(Size3::new(0, 0, 0), 1000.0);
    assert_eq!(rep.get_as_double(Size3::new(0, 0, 0)), 1000.0);
    assert_eq!(rep.number_of_bytes(), 2 * 2 * 1 * 2);
    assert_eq!(rep.number_of_bytes(), 8);
}

#[rstest]
#[case(DataFormatId::Float16)]
#[case(DataFormatId::Int8)]
#[case(DataFormatId::UInt64)]
#[case(DataFormatId::Vec2Float64)]
#[case(DataFormatId::Vec3UInt8)]
#[case(DataFormatId::Vec4Int32)]
fn test_clone_is_independent(#[case] format: DataFormatId) {
    let dims = Size3::new(3, 2, 2);
    let mut original = boxed(format, dims);
    for i in 0..dims.product() {
        let pos = index_to_pos(i, dims);
        original.set_from_dvec4(pos, Vec4d::new(i as f64, 1.0, 2.0, 3.0));
    }
    let released = original.remove_data_ownership();

    let copy = original.clone();
    assert!(copy.owns_data());
    assert_ne!(copy.data_bytes().as_ptr(), original.data_bytes().as_ptr());
    for i in 0..dims.product() {
        let pos = index_to_pos(i, dims);
        assert_eq!(copy.get_as_double(pos), original.get_as_double(pos));
        assert_eq!(copy.get_as_dvec4(pos), original.get_as_dvec4(pos));
    }

    drop(original);
    if let Some(buffer) = released {
        unsafe { buffer.free() }.unwrap();
    }
}

#[rstest]
#[case(DataFormatId::UInt8, 1)]
#[case(DataFormatId::Float32, 4)]
#[case(DataFormatId::Vec3Float64, 24)]
#[case(DataFormatId::Vec4UInt16, 8)]
fn test_resize_reallocates(#[case] format: DataFormatId, #[case] size: usize) {
    let mut volume = boxed(format, Size3::new(2, 2, 2));
    volume.set_dimensions(Size3::new(5, 3, 1));
    assert_eq!(volume.dimensions(), Size3::new(5, 3, 1));
    assert_eq!(volume.number_of_bytes(), 15 * size);
    assert_eq!(volume.data_bytes().len(), 15 * size);
    assert!(volume.owns_data());
}

#[test]
fn test_dispatch_through_box() {
    struct Sum;

    impl VolumeDispatcher for Sum {
        type Output = f64;

        fn call<T: Element>(self, volume: &TypedVolume<T>) -> f64 {
            volume
                .data()
                .iter()
                .map(|v| implore_formats::to_dvec::<T, 1>(v)[0])
                .sum()
        }
    }

    let mut volume = boxed(DataFormatId::Int32, Size3::new(4, 1, 1));
    for x in 0..4 {
        volume.set_from_double(Size3::new(x, 0, 0), x as f64 * 10.0);
    }
    assert_eq!(volume.dispatch::<Integers, _>(Sum).unwrap(), 60.0);
    assert!(matches!(
        volume.dispatch::<Floats, _>(Sum),
        Err(VolumeError::Dispatch(_))
    ));
    assert_eq!(volume.dispatch::<All, _>(Sum).unwrap(), 60.0);
}

#[test]
fn test_copy_region_between_representations() {
    let dims = Size3::new(4, 4, 4);
    let mut src = boxed(DataFormatId::Float32, dims);
    for i in 0..dims.product() {
        src.set_from_double(index_to_pos(i, dims), i as f64);
    }
    let mut dst = boxed(DataFormatId::Float32, Size3::new(2, 2, 2));
    dst.copy_region_from(src.as_ref(), Size3::default(), Size3::splat(2), Size3::splat(1))
        .unwrap();

    for i in 0..8 {
        let pos = index_to_pos(i, Size3::splat(2));
        let expected = src.get_as_double(pos.offset(Size3::splat(1)));
        assert_eq!(dst.get_as_double(pos), expected);
    }
}

#[test]
fn test_convert_between_formats() {
    let dims = Size3::new(2, 2, 1);
    let mut src = boxed(DataFormatId::Vec3UInt8, dims);
    src.set_from_dvec3(Size3::new(1, 1, 0), Vec3d::new(255.0, 0.0, 51.0));
    let mut dst = boxed(DataFormatId::Vec4Float32, dims);

    convert_into(src.as_ref(), dst.as_mut()).unwrap();
    let v = dst.get_as_dvec4(Size3::new(1, 1, 0));
    assert_eq!(v.x, 1.0);
    assert_eq!(v.y, 0.0);
    assert!((v.z - 0.2).abs() < 1e-6);
    assert_eq!(v.w, 0.0);
}

proptest! {
    #[test]
    fn prop_normalized_round_trip_u8(x in 0.0f64..=1.0) {
        let mut volume = TypedVolume::<u8>::new(Size3::new(1, 1, 1));
        volume.set_from_normalized_double(Size3::default(), x);
        let back = volume.get_as_normalized_double(Size3::default());
        prop_assert!((back - x).abs() <= 1.0 / 255.0);
    }

    #[test]
    fn prop_pos_to_index_formula(
        (dx, dy, dz) in (1usize..16, 1usize..16, 1usize..16),
        seed in any::<(usize, usize, usize)>(),
    ) {
        let dim = Size3::new(dx, dy, dz);
        let pos = Size3::new(seed.0 % dx, seed.1 % dy, seed.2 % dz);
        prop_assert_eq!(pos_to_index(pos, dim), pos.x + pos.y * dim.x + pos.z * dim.x * dim.y);
        prop_assert_eq!(index_to_pos(pos_to_index(pos, dim), dim), pos);
    }

    #[test]
    fn prop_periodic_wraps_one_period(
        (dx, dy, dz) in (1usize..16, 1usize..16, 1usize..16),
        seed in any::<(usize, usize, usize)>(),
    ) {
        let dim = Size3::new(dx, dy, dz);
        let pos = Size3::new(seed.0 % dx, seed.1 % dy, seed.2 % dz);
        let shifted = [(pos.x + dim.x) as i64, pos.y as i64, pos.z as i64];
        prop_assert_eq!(periodic_pos_to_index(shifted, dim), pos_to_index(pos, dim));
    }

    #[test]
    fn prop_clone_matches_source(values in proptest::collection::vec(any::<i16>(), 8)) {
        let volume = TypedVolume::from_data(
            Some(values.clone()),
            Size3::new(2, 2, 2),
            VolumeMetadata::default(),
        ).unwrap();
        let copy = volume.clone();
        prop_assert!(copy.owns_data());
        prop_assert_ne!(copy.data().as_ptr(), volume.data().as_ptr());
        prop_assert_eq!(copy.data(), &values[..]);
    }
}
