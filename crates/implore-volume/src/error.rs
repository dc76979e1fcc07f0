//! Error types for implore-volume

use implore_formats::{DataFormatId, DispatchError, Size3};
use thiserror::Error;

/// Main error type for volume operations
#[derive(Error, Debug)]
pub enum VolumeError {
    /// Runtime format could not be dispatched
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Buffer length does not match the dimensions
    #[error("Buffer size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Byte buffer length does not match the dimensions
    #[error("Byte size mismatch: expected {expected} bytes, got {actual}")]
    ByteSizeMismatch { expected: usize, actual: usize },

    /// Two volumes or a volume and a buffer disagree on format
    #[error("Format mismatch: expected {expected}, got {actual}")]
    FormatMismatch {
        expected: DataFormatId,
        actual: DataFormatId,
    },

    /// Two volumes disagree on dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: Size3, actual: Size3 },

    /// A sub-region does not fit inside its volume
    #[error("Region at {offset} of size {size} exceeds volume dimensions {dimensions}")]
    RegionOutOfBounds {
        offset: Size3,
        size: Size3,
        dimensions: Size3,
    },

    /// The operation needs at least one voxel
    #[error("Volume has no voxels")]
    Empty,

    /// A long-running computation was stopped by its caller
    #[error("Operation cancelled")]
    Cancelled,

    /// ndarray view construction failed
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Format cannot back a representation
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for volume operations
pub type VolumeResult<T> = Result<T, VolumeError>;
