//! Buffer ownership for typed volumes
//!
//! A volume either owns its buffer or borrows one owned elsewhere. Giving up
//! ownership turns `Owned` into `Borrowed` and hands the allocation to the
//! caller as a [`ReleasedBuffer`]. Going the other way, a [`VoxelBuffer`]
//! carries an owned allocation of a runtime format into a representation.

use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use implore_formats::{dispatch, All, DataFormatId, DispatchError, Dispatcher, Element};

use crate::error::{VolumeError, VolumeResult};

pub(crate) enum Storage<T> {
    Owned(Vec<T>),
    Borrowed { ptr: NonNull<T>, len: usize },
}

impl<T: Element> Storage<T> {
    pub(crate) fn zeroed(len: usize) -> Self {
        Storage::Owned(vec![T::default(); len])
    }

    pub(crate) fn owns_data(&self) -> bool {
        matches!(self, Storage::Owned(_))
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        match self {
            Storage::Owned(data) => data,
            // SAFETY: the creator of a borrowed storage guarantees `ptr` is
            // valid for `len` elements for the lifetime of the storage.
            Storage::Borrowed { ptr, len } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Storage::Owned(data) => data,
            // SAFETY: as above, and the volume holds the only access path.
            Storage::Borrowed { ptr, len } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
        }
    }

    /// Switch to `Borrowed`, returning the owned allocation if there was one
    pub(crate) fn release(&mut self) -> Option<ReleasedBuffer> {
        let Storage::Owned(data) = self else {
            return None;
        };

        let mut data = ManuallyDrop::new(std::mem::take(data));
        let ptr = NonNull::new(data.as_mut_ptr()).unwrap_or(NonNull::dangling());
        let len = data.len();
        let capacity = data.capacity();

        *self = Storage::Borrowed { ptr, len };

        Some(ReleasedBuffer {
            ptr: ptr.cast(),
            len,
            capacity,
            format: T::FORMAT,
        })
    }
}

/// An allocation whose ownership was removed from a volume.
///
/// The volume keeps reading and writing the buffer but no longer frees it.
/// The holder is responsible for the allocation: reclaim it with
/// [`into_vec`](Self::into_vec) or release it with [`free`](Self::free),
/// otherwise it leaks.
#[must_use = "the buffer leaks unless reclaimed or freed"]
pub struct ReleasedBuffer {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    format: DataFormatId,
}

// SAFETY: the handle is a plain allocation of `Send + Sync` elements.
unsafe impl Send for ReleasedBuffer {}
unsafe impl Sync for ReleasedBuffer {}

impl ReleasedBuffer {
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity in elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn format(&self) -> DataFormatId {
        self.format
    }

    pub fn byte_len(&self) -> usize {
        self.format.format().map_or(0, |f| f.size * self.len)
    }

    /// Take the allocation back as a typed vector. Returns the handle
    /// unchanged if `T` is not the element type of the buffer.
    ///
    /// # Safety
    ///
    /// No volume may still be borrowing this buffer, i.e. the volume it was
    /// released from must have been dropped or given new data.
    pub unsafe fn into_vec<T: Element>(self) -> Result<Vec<T>, ReleasedBuffer> {
        if T::FORMAT != self.format {
            return Err(self);
        }
        Ok(Vec::from_raw_parts(
            self.ptr.cast::<T>().as_ptr(),
            self.len,
            self.capacity,
        ))
    }

    /// Free the allocation.
    ///
    /// # Safety
    ///
    /// Same as [`into_vec`](Self::into_vec).
    pub unsafe fn free(self) -> Result<(), DispatchError> {
        let ReleasedBuffer { ptr, len, capacity, format } = self;
        dispatch::<All, _>(format, Free(RawParts { ptr, len, capacity }))
    }

    /// Turn the handle back into an owned buffer that frees itself on drop.
    ///
    /// # Safety
    ///
    /// Same as [`into_vec`](Self::into_vec).
    pub unsafe fn into_owned(self) -> VoxelBuffer {
        VoxelBuffer {
            ptr: self.ptr,
            len: self.len,
            capacity: self.capacity,
            format: self.format,
        }
    }
}

impl fmt::Debug for ReleasedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleasedBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("format", &self.format)
            .finish()
    }
}

/// An owned voxel buffer whose element type is known only by its format.
///
/// This is how code holding a runtime [`DataFormatId`] hands a buffer to
/// [`create_volume`](crate::factory::create_volume) or
/// [`VolumeRepresentation::set_data`](crate::representation::VolumeRepresentation::set_data)
/// without copying. Readers typically allocate with [`zeroed`](Self::zeroed)
/// and fill [`as_bytes_mut`](Self::as_bytes_mut) in place.
pub struct VoxelBuffer {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    format: DataFormatId,
}

// SAFETY: the buffer exclusively owns an allocation of `Send + Sync` elements.
unsafe impl Send for VoxelBuffer {}
unsafe impl Sync for VoxelBuffer {}

impl VoxelBuffer {
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        let mut data = ManuallyDrop::new(data);
        let ptr = NonNull::new(data.as_mut_ptr()).unwrap_or(NonNull::dangling());
        Self {
            ptr: ptr.cast(),
            len: data.len(),
            capacity: data.capacity(),
            format: T::FORMAT,
        }
    }

    /// Allocate `len` zeroed elements of `format`
    pub fn zeroed(format: DataFormatId, len: usize) -> VolumeResult<Self> {
        Ok(dispatch::<All, _>(format, Zeroed(len))?)
    }

    /// Copy `bytes` into a new buffer of `format`. The length must be a
    /// whole number of elements.
    pub fn from_bytes(format: DataFormatId, bytes: &[u8]) -> VolumeResult<Self> {
        let size = format
            .format()
            .ok_or(DispatchError::FormatNotSpecialized)?
            .size;
        if bytes.len() % size != 0 {
            return Err(VolumeError::ByteSizeMismatch {
                expected: bytes.len() / size * size,
                actual: bytes.len(),
            });
        }
        let mut buffer = Self::zeroed(format, bytes.len() / size)?;
        buffer.as_bytes_mut().copy_from_slice(bytes);
        Ok(buffer)
    }

    pub fn format(&self) -> DataFormatId {
        self.format
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_len(&self) -> usize {
        self.format.format().map_or(0, |f| f.size * self.len)
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the allocation holds `len` initialized elements of a `Pod`
        // type, `byte_len` bytes in total.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.byte_len()) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above; any byte pattern is a valid `Pod` value.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Take the allocation as a typed vector. Returns the buffer unchanged
    /// if `T` is not its element type.
    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, VoxelBuffer> {
        if T::FORMAT != self.format {
            return Err(self);
        }
        let this = ManuallyDrop::new(self);
        // SAFETY: the allocation came from a `Vec<T>` with this length and
        // capacity, and `this` is never dropped.
        Ok(unsafe { Vec::from_raw_parts(this.ptr.cast::<T>().as_ptr(), this.len, this.capacity) })
    }
}

impl<T: Element> From<Vec<T>> for VoxelBuffer {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

impl Drop for VoxelBuffer {
    fn drop(&mut self) {
        let parts = RawParts {
            ptr: self.ptr,
            len: self.len,
            capacity: self.capacity,
        };
        if let Err(error) = dispatch::<All, _>(self.format, Free(parts)) {
            tracing::error!(format = %self.format, %error, "leaking voxel buffer");
        }
    }
}

impl fmt::Debug for VoxelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("format", &self.format)
            .finish()
    }
}

struct Zeroed(usize);

impl Dispatcher for Zeroed {
    type Output = VoxelBuffer;

    fn call<T: Element>(self) -> VoxelBuffer {
        VoxelBuffer::from_vec(vec![T::default(); self.0])
    }
}

struct RawParts {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
}

struct Free(RawParts);

impl Dispatcher for Free {
    type Output = ();

    fn call<T: Element>(self) {
        let RawParts { ptr, len, capacity } = self.0;
        // SAFETY: the format matched `T` in the dispatch table and the
        // owner of the parts hands over exclusive ownership.
        drop(unsafe { Vec::from_raw_parts(ptr.cast::<T>().as_ptr(), len, capacity) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_switches_to_borrowed() {
        let mut storage = Storage::Owned(vec![1u16, 2, 3]);
        let addr = storage.as_slice().as_ptr() as usize;

        let released = storage.release().unwrap();
        assert!(!storage.owns_data());
        assert_eq!(storage.as_slice(), &[1, 2, 3]);
        assert_eq!(released.as_ptr() as usize, addr);
        assert_eq!(released.format(), DataFormatId::UInt16);
        assert_eq!(released.byte_len(), 6);

        assert!(storage.release().is_none());
        drop(storage);

        let data = unsafe { released.into_vec::<u16>() }.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_into_vec_checks_format() {
        let mut storage = Storage::Owned(vec![0.5f32; 4]);
        let released = storage.release().unwrap();
        drop(storage);

        let released = unsafe { released.into_vec::<u32>() }.unwrap_err();
        assert_eq!(released.format(), DataFormatId::Float32);
        let data = unsafe { released.into_vec::<f32>() }.unwrap();
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn test_free_through_dispatch() {
        let mut storage = Storage::Owned(vec![[1u8, 2, 3]; 8]);
        let released = storage.release().unwrap();
        drop(storage);
        assert!(unsafe { released.free() }.is_ok());
    }

    #[test]
    fn test_voxel_buffer_keeps_allocation() {
        let data = vec![[1i16, -2]; 6];
        let addr = data.as_ptr() as usize;
        let buffer = VoxelBuffer::from_vec(data);
        assert_eq!(buffer.format(), DataFormatId::Vec2Int16);
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.byte_len(), 24);
        assert_eq!(buffer.as_ptr() as usize, addr);

        let buffer = buffer.into_vec::<[u16; 2]>().unwrap_err();
        let data = buffer.into_vec::<[i16; 2]>().unwrap();
        assert_eq!(data.as_ptr() as usize, addr);
        assert_eq!(data[5], [1, -2]);
    }

    #[test]
    fn test_voxel_buffer_zeroed_and_filled_in_place() {
        let mut buffer = VoxelBuffer::zeroed(DataFormatId::UInt16, 3).unwrap();
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
        buffer.as_bytes_mut()[2..4].copy_from_slice(&500u16.to_ne_bytes());
        assert_eq!(buffer.into_vec::<u16>().unwrap(), vec![0, 500, 0]);

        assert!(matches!(
            VoxelBuffer::zeroed(DataFormatId::NotSpecialized, 3),
            Err(VolumeError::Dispatch(DispatchError::FormatNotSpecialized))
        ));
    }

    #[test]
    fn test_voxel_buffer_from_bytes() {
        let bytes: Vec<u8> = [0.5f32, 2.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let buffer = VoxelBuffer::from_bytes(DataFormatId::Float32, &bytes).unwrap();
        assert_eq!(buffer.as_bytes(), &bytes[..]);
        assert!(matches!(
            VoxelBuffer::from_bytes(DataFormatId::Float32, &bytes[..7]),
            Err(VolumeError::ByteSizeMismatch { expected: 4, actual: 7 })
        ));
    }

    #[test]
    fn test_released_buffer_into_owned() {
        let mut storage = Storage::Owned(vec![9u64; 4]);
        let released = storage.release().unwrap();
        drop(storage);

        let owned = unsafe { released.into_owned() };
        assert_eq!(owned.format(), DataFormatId::UInt64);
        assert_eq!(owned.into_vec::<u64>().unwrap(), vec![9; 4]);
    }
}
