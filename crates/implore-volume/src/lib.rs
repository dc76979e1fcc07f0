//! implore-volume - Typed in-memory volume representations
//!
//! A volume representation is a dense 3D array of one voxel format. Code
//! that knows the element type works with [`TypedVolume<T>`] directly; code
//! that only has a runtime format id works with
//! `Box<dyn VolumeRepresentation>` and regains the type through dispatch.
//!
//! # Key Components
//!
//! - **TypedVolume**: owning or borrowing typed buffer with voxel accessors
//! - **VolumeRepresentation**: format-agnostic interface with `f64` accessors
//! - **Dispatch**: `dispatch`, `dispatch_mut` and [`dispatch2`] hand the typed volume to generic code
//! - **ReleasedBuffer**: explicit handle for a buffer whose ownership left its volume
//! - **VoxelBuffer**: owned buffer of a runtime format, handed to a representation without copying
//! - **Factory**: [`create_volume`] builds a representation from a runtime format id
//! - **Algorithms**: data range, histograms, fill and format conversion
//!
//! # Example
//!
//! ```ignore
//! use implore_volume::*;
//!
//! let mut volume = create_volume(
//!     Size3::new(2, 2, 1),
//!     DataFormatId::UInt16,
//!     None,
//!     VolumeMetadata::default(),
//! )?;
//! volume.set_from_double(Size3::new(0, 0, 0), 1000.0);
//! assert_eq!(volume.get_as_double(Size3::new(0, 0, 0)), 1000.0);
//! assert_eq!(volume.number_of_bytes(), 8);
//! ```

pub mod algorithm;
pub mod config;
pub mod error;
pub mod factory;
pub mod index;
pub mod meta;
pub mod representation;
pub mod storage;
pub mod typed;

pub use algorithm::{
    calculate_histogram, calculate_histogram_cancellable, calculate_histogram_with, convert_into,
    data_range, fill, ChannelRange, Histogram,
};
pub use config::{HistogramConfig, RepresentationConfig, VolumeConfig};
pub use error::{ConfigError, VolumeError, VolumeResult};
pub use factory::create_volume;
pub use index::{index_to_pos, periodic_pos_to_index, pos_to_index, wrapped_pos_to_index};
pub use meta::*;
pub use representation::{
    dispatch2, VolumeDispatcher, VolumeDispatcher2, VolumeDispatcherMut, VolumeRepresentation,
};
pub use storage::{ReleasedBuffer, VoxelBuffer};
pub use typed::TypedVolume;

pub use implore_formats::{DataFormat, DataFormatId, Element, Size3, Vec2d, Vec3d, Vec4d};
