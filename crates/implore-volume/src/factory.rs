//! Representation factory
//!
//! Builds a type-erased representation for a runtime format id, used by
//! readers and other code that only learns the format at run time.

use implore_formats::{All, DataFormatId, Dispatcher, Element, Size3};

use crate::error::{VolumeError, VolumeResult};
use crate::meta::VolumeMetadata;
use crate::representation::VolumeRepresentation;
use crate::storage::VoxelBuffer;
use crate::typed::TypedVolume;

/// Create a representation of `format` with the given dimensions.
///
/// With `data`, the representation takes ownership of the buffer, which
/// must hold `format` elements matching `dimensions` exactly. Without it the
/// buffer is zero-filled. Fails for [`DataFormatId::NotSpecialized`].
pub fn create_volume(
    dimensions: Size3,
    format: DataFormatId,
    data: Option<VoxelBuffer>,
    metadata: VolumeMetadata,
) -> VolumeResult<Box<dyn VolumeRepresentation>> {
    let volume = implore_formats::dispatch::<All, _>(
        format,
        CreateVolume {
            dimensions,
            data,
            metadata,
        },
    )
    .map_err(|e| {
        tracing::warn!(%format, error = %e, "cannot create volume representation");
        e
    })??;

    tracing::debug!(%format, %dimensions, "created volume representation");
    Ok(volume)
}

struct CreateVolume {
    dimensions: Size3,
    data: Option<VoxelBuffer>,
    metadata: VolumeMetadata,
}

impl Dispatcher for CreateVolume {
    type Output = VolumeResult<Box<dyn VolumeRepresentation>>;

    fn call<T: Element>(self) -> Self::Output {
        let data = self
            .data
            .map(|buffer| {
                buffer.into_vec::<T>().map_err(|buffer| VolumeError::FormatMismatch {
                    expected: T::FORMAT,
                    actual: buffer.format(),
                })
            })
            .transpose()?;

        let volume = TypedVolume::<T>::from_data(data, self.dimensions, self.metadata)?;
        Ok(Box::new(volume))
    }
}
