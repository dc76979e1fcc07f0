//! Typed volume representation
//!
//! [`TypedVolume<T>`] is a dense 3D array of one element type with explicit
//! buffer ownership. Voxels are stored x-fastest (see [`crate::index`]).

use std::fmt;
use std::ptr::NonNull;

use implore_formats::{DataFormat, Element, Size3};
use ndarray::{ArrayView3, ArrayViewMut3};

use crate::config::DEFAULT_DIMENSIONS;
use crate::error::{VolumeError, VolumeResult};
use crate::index::{pos_to_index, wrapped_pos_to_index};
use crate::meta::VolumeMetadata;
use crate::storage::{ReleasedBuffer, Storage};

/// Dense 3D array of `T`
pub struct TypedVolume<T: Element> {
    storage: Storage<T>,
    dimensions: Size3,
    metadata: VolumeMetadata,
}

// SAFETY: a borrowed buffer is only reachable through this volume, and `T`
// is `Send + Sync`.
unsafe impl<T: Element> Send for TypedVolume<T> {}
unsafe impl<T: Element> Sync for TypedVolume<T> {}

impl<T: Element> TypedVolume<T> {
    /// Allocate an owned, zero-filled volume
    pub fn new(dimensions: Size3) -> Self {
        Self::with_metadata(dimensions, VolumeMetadata::default())
    }

    pub fn with_metadata(dimensions: Size3, metadata: VolumeMetadata) -> Self {
        Self {
            storage: Storage::zeroed(dimensions.product()),
            dimensions,
            metadata,
        }
    }

    /// Take ownership of `data`, or allocate when `data` is `None`.
    pub fn from_data(
        data: Option<Vec<T>>,
        dimensions: Size3,
        metadata: VolumeMetadata,
    ) -> VolumeResult<Self> {
        let Some(data) = data else {
            return Ok(Self::with_metadata(dimensions, metadata));
        };

        if data.len() != dimensions.product() {
            return Err(VolumeError::SizeMismatch {
                expected: dimensions.product(),
                actual: data.len(),
            });
        }

        Ok(Self {
            storage: Storage::Owned(data),
            dimensions,
            metadata,
        })
    }

    /// Wrap a buffer owned elsewhere. The volume never frees it.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `dimensions.product()`
    /// elements for as long as the volume refers to it, and must not be
    /// accessed through other paths meanwhile.
    pub unsafe fn from_raw_parts(
        ptr: NonNull<T>,
        dimensions: Size3,
        metadata: VolumeMetadata,
    ) -> Self {
        Self {
            storage: Storage::Borrowed {
                ptr,
                len: dimensions.product(),
            },
            dimensions,
            metadata,
        }
    }

    pub fn data_format(&self) -> &'static DataFormat {
        T::data_format()
    }

    pub fn dimensions(&self) -> Size3 {
        self.dimensions
    }

    pub fn metadata(&self) -> &VolumeMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut VolumeMetadata {
        &mut self.metadata
    }

    pub fn owns_data(&self) -> bool {
        self.storage.owns_data()
    }

    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Size of the buffer in bytes
    pub fn number_of_bytes(&self) -> usize {
        self.dimensions.product() * std::mem::size_of::<T>()
    }

    /// Resize the volume. Contents are discarded when `dimensions` differs
    /// from the current size; the new buffer is owned and zero-filled.
    pub fn set_dimensions(&mut self, dimensions: Size3) {
        if dimensions == self.dimensions {
            return;
        }
        tracing::trace!(
            format = %T::FORMAT,
            from = %self.dimensions,
            to = %dimensions,
            "reallocating volume"
        );
        self.storage = Storage::zeroed(dimensions.product());
        self.dimensions = dimensions;
    }

    /// Replace the buffer, taking ownership of `data`. A previously owned
    /// buffer is dropped.
    pub fn set_data(&mut self, data: Vec<T>, dimensions: Size3) -> VolumeResult<()> {
        if data.len() != dimensions.product() {
            return Err(VolumeError::SizeMismatch {
                expected: dimensions.product(),
                actual: data.len(),
            });
        }
        self.storage = Storage::Owned(data);
        self.dimensions = dimensions;
        Ok(())
    }

    /// Give up ownership of the buffer while keeping access to it.
    ///
    /// Returns `None` if the volume did not own its buffer. The returned
    /// handle must outlive every use of this volume's data.
    pub fn remove_data_ownership(&mut self) -> Option<ReleasedBuffer> {
        let released = self.storage.release();
        if let Some(buffer) = &released {
            tracing::debug!(
                format = %T::FORMAT,
                elements = buffer.len(),
                "volume released buffer ownership"
            );
        }
        released
    }

    #[inline]
    pub fn index_of(&self, pos: Size3) -> usize {
        pos_to_index(pos, self.dimensions)
    }

    /// Index of `pos` after applying the volume's per-axis wrapping
    #[inline]
    pub fn wrapped_index(&self, pos: [i64; 3]) -> usize {
        wrapped_pos_to_index(pos, self.dimensions, self.metadata.wrapping)
    }

    /// Voxel at `pos`. Panics if `pos` is outside the volume.
    #[inline]
    pub fn get(&self, pos: Size3) -> T {
        self.data()[self.index_of(pos)]
    }

    #[inline]
    pub fn set(&mut self, pos: Size3, value: T) {
        let index = self.index_of(pos);
        self.data_mut()[index] = value;
    }

    /// View as an ndarray with shape `(z, y, x)`
    pub fn as_array(&self) -> VolumeResult<ArrayView3<'_, T>> {
        let d = self.dimensions;
        Ok(ArrayView3::from_shape((d.z, d.y, d.x), self.data())?)
    }

    pub fn as_array_mut(&mut self) -> VolumeResult<ArrayViewMut3<'_, T>> {
        let d = self.dimensions;
        Ok(ArrayViewMut3::from_shape((d.z, d.y, d.x), self.data_mut())?)
    }

    /// Copy the block of `sub_size` voxels at `sub_offset` in `src` to
    /// `dst_offset` in this volume.
    pub fn copy_region_from(
        &mut self,
        src: &TypedVolume<T>,
        dst_offset: Size3,
        sub_size: Size3,
        sub_offset: Size3,
    ) -> VolumeResult<()> {
        self.copy_region_from_slice(src.data(), src.dimensions, dst_offset, sub_size, sub_offset)
    }

    /// [`copy_region_from`](Self::copy_region_from) with the source given as
    /// a buffer of `src_dims` voxels
    pub(crate) fn copy_region_from_slice(
        &mut self,
        src_data: &[T],
        src_dims: Size3,
        dst_offset: Size3,
        sub_size: Size3,
        sub_offset: Size3,
    ) -> VolumeResult<()> {
        check_region(sub_offset, sub_size, src_dims)?;
        check_region(dst_offset, sub_size, self.dimensions)?;

        let dst_dims = self.dimensions;
        let dst_data = self.data_mut();
        let row = sub_size.x;

        for z in 0..sub_size.z {
            for y in 0..sub_size.y {
                let s = pos_to_index(sub_offset.offset(Size3::new(0, y, z)), src_dims);
                let d = pos_to_index(dst_offset.offset(Size3::new(0, y, z)), dst_dims);
                dst_data[d..d + row].copy_from_slice(&src_data[s..s + row]);
            }
        }
        Ok(())
    }
}

fn check_region(offset: Size3, size: Size3, dimensions: Size3) -> VolumeResult<()> {
    let end = offset.offset(size);
    if end.x > dimensions.x || end.y > dimensions.y || end.z > dimensions.z {
        return Err(VolumeError::RegionOutOfBounds {
            offset,
            size,
            dimensions,
        });
    }
    Ok(())
}

impl<T: Element> Clone for TypedVolume<T> {
    /// Deep copy into a newly owned buffer, whatever the source ownership
    fn clone(&self) -> Self {
        Self {
            storage: Storage::Owned(self.data().to_vec()),
            dimensions: self.dimensions,
            metadata: self.metadata,
        }
    }
}

impl<T: Element> Default for TypedVolume<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl<T: Element> fmt::Debug for TypedVolume<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedVolume")
            .field("format", &T::FORMAT)
            .field("dimensions", &self.dimensions)
            .field("owns_data", &self.owns_data())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_and_owned() {
        let volume = TypedVolume::<[f32; 2]>::new(Size3::new(3, 2, 2));
        assert!(volume.owns_data());
        assert_eq!(volume.data().len(), 12);
        assert!(volume.data().iter().all(|v| *v == [0.0, 0.0]));
        assert_eq!(volume.number_of_bytes(), 12 * 8);
    }

    #[test]
    fn test_from_data_takes_ownership_or_allocates() {
        let data: Vec<u8> = (0..8).collect();
        let addr = data.as_ptr();
        let volume =
            TypedVolume::from_data(Some(data), Size3::new(2, 2, 2), VolumeMetadata::default())
                .unwrap();
        assert_eq!(volume.data().as_ptr(), addr);
        assert_eq!(volume.get(Size3::new(1, 1, 1)), 7);

        let volume =
            TypedVolume::<u8>::from_data(None, Size3::new(2, 2, 2), VolumeMetadata::default())
                .unwrap();
        assert!(volume.owns_data());
        assert_eq!(volume.data(), &[0; 8]);
    }

    #[test]
    fn test_from_data_rejects_wrong_length() {
        let err = TypedVolume::from_data(Some(vec![0i16; 5]), Size3::new(2, 2, 2), Default::default());
        assert!(matches!(
            err,
            Err(VolumeError::SizeMismatch { expected: 8, actual: 5 })
        ));
    }

    #[test]
    fn test_set_dimensions_same_size_keeps_data() {
        let mut volume = TypedVolume::<u16>::new(Size3::new(2, 2, 1));
        volume.set(Size3::new(1, 1, 0), 42);
        volume.set_dimensions(Size3::new(2, 2, 1));
        assert_eq!(volume.get(Size3::new(1, 1, 0)), 42);

        volume.set_dimensions(Size3::new(3, 3, 3));
        assert_eq!(volume.dimensions(), Size3::new(3, 3, 3));
        assert_eq!(volume.number_of_bytes(), 27 * 2);
    }

    #[test]
    fn test_set_data_replaces_buffer() {
        let mut volume = TypedVolume::<i32>::new(Size3::new(1, 1, 1));
        volume.set_data(vec![1, 2, 3, 4], Size3::new(4, 1, 1)).unwrap();
        assert_eq!(volume.dimensions(), Size3::new(4, 1, 1));
        assert_eq!(volume.data(), &[1, 2, 3, 4]);
        assert!(volume.set_data(vec![1], Size3::new(2, 1, 1)).is_err());
    }

    #[test]
    fn test_clone_always_owns() {
        let mut volume = TypedVolume::<f64>::new(Size3::new(2, 1, 1));
        volume.set(Size3::new(1, 0, 0), 2.5);
        let released = volume.remove_data_ownership().unwrap();
        assert!(!volume.owns_data());

        let copy = volume.clone();
        assert!(copy.owns_data());
        assert_ne!(copy.data().as_ptr(), volume.data().as_ptr());
        assert_eq!(copy.data(), volume.data());

        drop(volume);
        let data = unsafe { released.into_vec::<f64>() }.unwrap();
        assert_eq!(data, vec![0.0, 2.5]);
    }

    #[test]
    fn test_array_view_shape() {
        let mut volume = TypedVolume::<u8>::new(Size3::new(4, 3, 2));
        volume.set(Size3::new(3, 1, 1), 9);
        let view = volume.as_array().unwrap();
        assert_eq!(view.shape(), &[2, 3, 4]);
        assert_eq!(view[[1, 1, 3]], 9);

        volume.as_array_mut().unwrap()[[0, 2, 0]] = 5;
        assert_eq!(volume.get(Size3::new(0, 2, 0)), 5);
    }

    #[test]
    fn test_wrapped_index_follows_metadata() {
        let mut volume = TypedVolume::<u8>::new(Size3::new(4, 4, 4));
        assert_eq!(volume.wrapped_index([-1, 0, 0]), 0);
        volume.metadata_mut().wrapping = crate::meta::Wrapping3D::repeat_all();
        assert_eq!(volume.wrapped_index([-1, 0, 0]), 3);
    }

    #[test]
    fn test_copy_region() {
        let mut src = TypedVolume::<u32>::new(Size3::new(4, 4, 4));
        for (i, v) in src.data_mut().iter_mut().enumerate() {
            *v = i as u32;
        }
        let mut dst = TypedVolume::<u32>::new(Size3::new(3, 3, 3));
        dst.copy_region_from(&src, Size3::new(1, 1, 1), Size3::new(2, 2, 2), Size3::new(2, 1, 0))
            .unwrap();

        assert_eq!(dst.get(Size3::new(0, 0, 0)), 0);
        assert_eq!(dst.get(Size3::new(1, 1, 1)), src.get(Size3::new(2, 1, 0)));
        assert_eq!(dst.get(Size3::new(2, 2, 2)), src.get(Size3::new(3, 2, 1)));
        assert_eq!(dst.get(Size3::new(2, 1, 2)), src.get(Size3::new(3, 1, 1)));
    }

    #[test]
    fn test_copy_region_out_of_bounds() {
        let src = TypedVolume::<u8>::new(Size3::new(2, 2, 2));
        let mut dst = TypedVolume::<u8>::new(Size3::new(2, 2, 2));
        let err = dst.copy_region_from(&src, Size3::new(1, 0, 0), Size3::new(2, 1, 1), Size3::default());
        assert!(matches!(err, Err(VolumeError::RegionOutOfBounds { .. })));
    }
}
