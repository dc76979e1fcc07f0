//! Error types for implore-formats

use std::borrow::Cow;

use thiserror::Error;

use crate::format::DataFormatId;

/// Failure to resolve a runtime format id to an element type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The id is the `NotSpecialized` sentinel
    #[error("Format not specialized")]
    FormatNotSpecialized,

    /// The id is valid but the active filter rejects it
    #[error("Format {format} (id {}) not supported, expected type matching {expected}", .format.id())]
    FormatNotSupported {
        format: DataFormatId,
        expected: Cow<'static, str>,
    },
}

/// Errors from format lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid format id: {0}")]
    InvalidId(u8),

    #[error("Unknown format name: '{0}'")]
    UnknownName(String),
}

/// Result type for dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;
