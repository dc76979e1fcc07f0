//! Type-erased volume representations
//!
//! [`VolumeRepresentation`] is the format-agnostic surface of a
//! [`TypedVolume<T>`]: byte access, `f64` voxel access and ownership
//! control. Generic algorithms regain the concrete element type through
//! [`dispatch`](dyn VolumeRepresentation::dispatch), which resolves the
//! representation's format id through the dispatch tables and hands the
//! typed volume to a [`VolumeDispatcher`]. Dispatch is the only way back to
//! the concrete type.

use std::fmt;

use implore_formats::{
    from_dvec, from_normalized_dvec, to_dvec, to_normalized_dvec, All, DataFormat, DataFormatId,
    Dispatcher, Dispatcher2, Element, FormatFilter, Size3, Vec2d, Vec3d, Vec4d,
};

use crate::error::{VolumeError, VolumeResult};
use crate::meta::VolumeMetadata;
use crate::storage::{ReleasedBuffer, VoxelBuffer};
use crate::typed::TypedVolume;

mod sealed {
    use std::any::Any;

    /// Type recovery hooks, reachable only inside this crate
    pub trait Sealed {
        fn as_any(&self) -> &dyn Any;

        fn as_any_mut(&mut self) -> &mut dyn Any;
    }

    impl<T: implore_formats::Element> Sealed for crate::typed::TypedVolume<T> {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }
}

use sealed::Sealed;

/// Format-agnostic view of a typed volume.
///
/// Implemented only by [`TypedVolume<T>`]. Positions passed to the voxel
/// accessors must lie inside the volume; out-of-range positions panic.
///
/// The concrete type is only reachable through dispatch:
///
/// ```compile_fail
/// use implore_volume::{Size3, TypedVolume, VolumeRepresentation};
///
/// let volume = TypedVolume::<u8>::new(Size3::splat(1));
/// let rep: &dyn VolumeRepresentation = &volume;
/// let _ = rep.as_any();
/// ```
pub trait VolumeRepresentation: sealed::Sealed + Send + Sync + fmt::Debug {
    fn data_format(&self) -> &'static DataFormat;

    fn format_id(&self) -> DataFormatId {
        self.data_format().id
    }

    fn dimensions(&self) -> Size3;

    /// Destructive resize, see [`TypedVolume::set_dimensions`]
    fn set_dimensions(&mut self, dimensions: Size3);

    fn metadata(&self) -> &VolumeMetadata;

    fn metadata_mut(&mut self) -> &mut VolumeMetadata;

    fn owns_data(&self) -> bool;

    fn remove_data_ownership(&mut self) -> Option<ReleasedBuffer>;

    /// The whole buffer as bytes
    fn data_bytes(&self) -> &[u8];

    fn data_bytes_mut(&mut self) -> &mut [u8];

    /// Bytes of the voxel at linear `index`
    fn voxel_bytes(&self, index: usize) -> &[u8] {
        let size = self.data_format().size;
        &self.data_bytes()[index * size..(index + 1) * size]
    }

    fn number_of_bytes(&self) -> usize {
        self.dimensions().product() * self.data_format().size
    }

    /// Replace the buffer with `data`, taking ownership of it. Fails with
    /// [`VolumeError::FormatMismatch`] if `data` holds another format; the
    /// buffer is dropped in that case.
    fn set_data(&mut self, data: VoxelBuffer, dimensions: Size3) -> VolumeResult<()>;

    /// Replace the contents with `bytes`, resizing to `dimensions` first
    fn copy_from_bytes(&mut self, bytes: &[u8], dimensions: Size3) -> VolumeResult<()>;

    /// Deep, owning copy
    fn clone_box(&self) -> Box<dyn VolumeRepresentation>;

    fn get_as_double(&self, pos: Size3) -> f64;
    fn get_as_dvec2(&self, pos: Size3) -> Vec2d;
    fn get_as_dvec3(&self, pos: Size3) -> Vec3d;
    fn get_as_dvec4(&self, pos: Size3) -> Vec4d;

    fn get_as_normalized_double(&self, pos: Size3) -> f64;
    fn get_as_normalized_dvec2(&self, pos: Size3) -> Vec2d;
    fn get_as_normalized_dvec3(&self, pos: Size3) -> Vec3d;
    fn get_as_normalized_dvec4(&self, pos: Size3) -> Vec4d;

    fn set_from_double(&mut self, pos: Size3, value: f64);
    fn set_from_dvec2(&mut self, pos: Size3, value: Vec2d);
    fn set_from_dvec3(&mut self, pos: Size3, value: Vec3d);
    fn set_from_dvec4(&mut self, pos: Size3, value: Vec4d);

    fn set_from_normalized_double(&mut self, pos: Size3, value: f64);
    fn set_from_normalized_dvec2(&mut self, pos: Size3, value: Vec2d);
    fn set_from_normalized_dvec3(&mut self, pos: Size3, value: Vec3d);
    fn set_from_normalized_dvec4(&mut self, pos: Size3, value: Vec4d);

    /// Copy a block from a representation of the same format, see
    /// [`TypedVolume::copy_region_from`]
    fn copy_region_from(
        &mut self,
        src: &dyn VolumeRepresentation,
        dst_offset: Size3,
        sub_size: Size3,
        sub_offset: Size3,
    ) -> VolumeResult<()>;
}

impl<T: Element> VolumeRepresentation for TypedVolume<T> {
    fn data_format(&self) -> &'static DataFormat {
        T::data_format()
    }

    fn dimensions(&self) -> Size3 {
        TypedVolume::dimensions(self)
    }

    fn set_dimensions(&mut self, dimensions: Size3) {
        TypedVolume::set_dimensions(self, dimensions)
    }

    fn metadata(&self) -> &VolumeMetadata {
        TypedVolume::metadata(self)
    }

    fn metadata_mut(&mut self) -> &mut VolumeMetadata {
        TypedVolume::metadata_mut(self)
    }

    fn owns_data(&self) -> bool {
        TypedVolume::owns_data(self)
    }

    fn remove_data_ownership(&mut self) -> Option<ReleasedBuffer> {
        TypedVolume::remove_data_ownership(self)
    }

    fn data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.data())
    }

    fn data_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.data_mut())
    }

    fn number_of_bytes(&self) -> usize {
        TypedVolume::number_of_bytes(self)
    }

    fn set_data(&mut self, data: VoxelBuffer, dimensions: Size3) -> VolumeResult<()> {
        let data = data.into_vec::<T>().map_err(|buffer| VolumeError::FormatMismatch {
            expected: T::FORMAT,
            actual: buffer.format(),
        })?;
        TypedVolume::set_data(self, data, dimensions)
    }

    fn copy_from_bytes(&mut self, bytes: &[u8], dimensions: Size3) -> VolumeResult<()> {
        let expected = dimensions.product() * std::mem::size_of::<T>();
        if bytes.len() != expected {
            return Err(VolumeError::ByteSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        TypedVolume::set_dimensions(self, dimensions);
        self.data_bytes_mut().copy_from_slice(bytes);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn VolumeRepresentation> {
        Box::new(self.clone())
    }

    fn get_as_double(&self, pos: Size3) -> f64 {
        to_dvec::<T, 1>(&self.get(pos))[0]
    }

    fn get_as_dvec2(&self, pos: Size3) -> Vec2d {
        to_dvec::<T, 2>(&self.get(pos)).into()
    }

    fn get_as_dvec3(&self, pos: Size3) -> Vec3d {
        to_dvec::<T, 3>(&self.get(pos)).into()
    }

    fn get_as_dvec4(&self, pos: Size3) -> Vec4d {
        to_dvec::<T, 4>(&self.get(pos)).into()
    }

    fn get_as_normalized_double(&self, pos: Size3) -> f64 {
        to_normalized_dvec::<T, 1>(&self.get(pos))[0]
    }

    fn get_as_normalized_dvec2(&self, pos: Size3) -> Vec2d {
        to_normalized_dvec::<T, 2>(&self.get(pos)).into()
    }

    fn get_as_normalized_dvec3(&self, pos: Size3) -> Vec3d {
        to_normalized_dvec::<T, 3>(&self.get(pos)).into()
    }

    fn get_as_normalized_dvec4(&self, pos: Size3) -> Vec4d {
        to_normalized_dvec::<T, 4>(&self.get(pos)).into()
    }

    fn set_from_double(&mut self, pos: Size3, value: f64) {
        self.set(pos, from_dvec([value]));
    }

    fn set_from_dvec2(&mut self, pos: Size3, value: Vec2d) {
        self.set(pos, from_dvec(value.to_array()));
    }

    fn set_from_dvec3(&mut self, pos: Size3, value: Vec3d) {
        self.set(pos, from_dvec(value.to_array()));
    }

    fn set_from_dvec4(&mut self, pos: Size3, value: Vec4d) {
        self.set(pos, from_dvec(value.to_array()));
    }

    fn set_from_normalized_double(&mut self, pos: Size3, value: f64) {
        self.set(pos, from_normalized_dvec([value]));
    }

    fn set_from_normalized_dvec2(&mut self, pos: Size3, value: Vec2d) {
        self.set(pos, from_normalized_dvec(value.to_array()));
    }

    fn set_from_normalized_dvec3(&mut self, pos: Size3, value: Vec3d) {
        self.set(pos, from_normalized_dvec(value.to_array()));
    }

    fn set_from_normalized_dvec4(&mut self, pos: Size3, value: Vec4d) {
        self.set(pos, from_normalized_dvec(value.to_array()));
    }

    fn copy_region_from(
        &mut self,
        src: &dyn VolumeRepresentation,
        dst_offset: Size3,
        sub_size: Size3,
        sub_offset: Size3,
    ) -> VolumeResult<()> {
        src.dispatch::<All, _>(CopyRegion {
            dst: self,
            dst_offset,
            sub_size,
            sub_offset,
        })?
    }
}

struct CopyRegion<'a, T: Element> {
    dst: &'a mut TypedVolume<T>,
    dst_offset: Size3,
    sub_size: Size3,
    sub_offset: Size3,
}

impl<T: Element> VolumeDispatcher for CopyRegion<'_, T> {
    type Output = VolumeResult<()>;

    fn call<S: Element>(self, src: &TypedVolume<S>) -> Self::Output {
        if S::FORMAT != T::FORMAT {
            return Err(VolumeError::FormatMismatch {
                expected: T::FORMAT,
                actual: S::FORMAT,
            });
        }
        // Equal formats mean equal element types.
        let src_data: &[T] = bytemuck::cast_slice(src.data());
        self.dst.copy_region_from_slice(
            src_data,
            src.dimensions(),
            self.dst_offset,
            self.sub_size,
            self.sub_offset,
        )
    }
}

impl Clone for Box<dyn VolumeRepresentation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A generic operation over a typed volume
pub trait VolumeDispatcher {
    type Output;

    fn call<T: Element>(self, volume: &TypedVolume<T>) -> Self::Output;
}

/// A generic operation that mutates a typed volume
pub trait VolumeDispatcherMut {
    type Output;

    fn call<T: Element>(self, volume: &mut TypedVolume<T>) -> Self::Output;
}

/// A generic operation from one typed volume into another
pub trait VolumeDispatcher2 {
    type Output;

    fn call<S: Element, D: Element>(
        self,
        src: &TypedVolume<S>,
        dst: &mut TypedVolume<D>,
    ) -> Self::Output;
}

impl<'v> dyn VolumeRepresentation + 'v {
    /// Call `dispatcher` with this representation as its concrete
    /// `TypedVolume<T>`, if `F` accepts the format.
    pub fn dispatch<F, D>(&self, dispatcher: D) -> VolumeResult<D::Output>
    where
        F: FormatFilter,
        D: VolumeDispatcher,
    {
        implore_formats::dispatch::<F, _>(
            self.format_id(),
            Recover {
                volume: self,
                inner: dispatcher,
            },
        )?
    }

    pub fn dispatch_mut<F, D>(&mut self, dispatcher: D) -> VolumeResult<D::Output>
    where
        F: FormatFilter,
        D: VolumeDispatcherMut,
    {
        let format = self.format_id();
        implore_formats::dispatch::<F, _>(
            format,
            RecoverMut {
                volume: self,
                inner: dispatcher,
            },
        )?
    }
}

/// Call `dispatcher` with `src` and `dst` as their concrete typed volumes,
/// filtering the source format by `FS` and the destination by `FD`.
pub fn dispatch2<FS, FD, D>(
    src: &dyn VolumeRepresentation,
    dst: &mut dyn VolumeRepresentation,
    dispatcher: D,
) -> VolumeResult<D::Output>
where
    FS: FormatFilter,
    FD: FormatFilter,
    D: VolumeDispatcher2,
{
    let (src_format, dst_format) = (src.format_id(), dst.format_id());
    implore_formats::dispatch2::<FS, FD, _>(
        src_format,
        dst_format,
        Recover2 {
            src,
            dst,
            inner: dispatcher,
        },
    )?
}

fn mismatch<T: Element>(actual: DataFormatId) -> VolumeError {
    VolumeError::FormatMismatch {
        expected: T::FORMAT,
        actual,
    }
}

fn downcast_ref<'a, T: Element>(
    volume: &'a dyn VolumeRepresentation,
) -> VolumeResult<&'a TypedVolume<T>> {
    let actual = volume.format_id();
    volume.as_any().downcast_ref().ok_or_else(|| mismatch::<T>(actual))
}

fn downcast_mut<'a, T: Element>(
    volume: &'a mut (dyn VolumeRepresentation + '_),
) -> VolumeResult<&'a mut TypedVolume<T>> {
    let actual = volume.format_id();
    volume.as_any_mut().downcast_mut().ok_or_else(|| mismatch::<T>(actual))
}

struct Recover<'a, D> {
    volume: &'a dyn VolumeRepresentation,
    inner: D,
}

impl<D: VolumeDispatcher> Dispatcher for Recover<'_, D> {
    type Output = VolumeResult<D::Output>;

    fn call<T: Element>(self) -> Self::Output {
        let typed = downcast_ref::<T>(self.volume)?;
        Ok(self.inner.call(typed))
    }
}

struct RecoverMut<'a, 'v, D> {
    volume: &'a mut (dyn VolumeRepresentation + 'v),
    inner: D,
}

impl<D: VolumeDispatcherMut> Dispatcher for RecoverMut<'_, '_, D> {
    type Output = VolumeResult<D::Output>;

    fn call<T: Element>(self) -> Self::Output {
        let typed = downcast_mut::<T>(self.volume)?;
        Ok(self.inner.call(typed))
    }
}

struct Recover2<'s, 'd, D> {
    src: &'s dyn VolumeRepresentation,
    dst: &'d mut dyn VolumeRepresentation,
    inner: D,
}

impl<D: VolumeDispatcher2> Dispatcher2 for Recover2<'_, '_, D> {
    type Output = VolumeResult<D::Output>;

    fn call<S: Element, T: Element>(self) -> Self::Output {
        let src = downcast_ref::<S>(self.src)?;
        let dst = downcast_mut::<T>(self.dst)?;
        Ok(self.inner.call(src, dst))
    }
}
