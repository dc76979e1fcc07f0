//! implore-formats - Voxel data formats and runtime format dispatch
//!
//! This crate describes the element types a volume can store and turns a
//! runtime format tag back into a statically typed code path.
//!
//! # Key Components
//!
//! - **Catalog**: [`for_each_format!`] lists every supported element type once
//! - **DataFormat**: static descriptor per format (size, components, precision, kind)
//! - **FormatFilter**: compile-time predicates restricting which formats an operation accepts
//! - **Dispatch**: O(1) table lookup from [`DataFormatId`] to a monomorphized call
//! - **Conversions**: plain and normalized element conversion through `f64` channels
//!
//! # Dispatch
//!
//! ```ignore
//! use implore_formats::{dispatch, DataFormatId, Dispatcher, Element, Floats};
//!
//! struct Components;
//!
//! impl Dispatcher for Components {
//!     type Output = usize;
//!
//!     fn call<T: Element>(self) -> usize {
//!         T::COMPONENTS
//!     }
//! }
//!
//! assert_eq!(dispatch::<Floats, _>(DataFormatId::Vec3Float32, Components)?, 3);
//! assert!(dispatch::<Floats, _>(DataFormatId::UInt8, Components).is_err());
//! ```

pub mod catalog;
pub mod convert;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod filter;
pub mod format;
pub mod numeric;
pub mod types;

pub use half::f16;

pub use convert::*;
pub use dispatch::{dispatch, dispatch2, dispatch3, DispatchTable, Dispatcher, Dispatcher2, Dispatcher3, Thunk};
pub use element::{ComponentLayout, Element};
pub use error::{DispatchError, DispatchResult, FormatError};
pub use filter::*;
pub use format::{DataFormat, DataFormatId, FORMATS, FORMAT_COUNT};
pub use numeric::{NumericType, Primitive};
pub use types::*;
