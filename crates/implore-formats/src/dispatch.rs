//! Runtime format dispatch
//!
//! Turns a runtime [`DataFormatId`] into a call of a generic function
//! monomorphized for the matching [`Element`] type. The callable is a value
//! implementing [`Dispatcher`] (or [`Dispatcher2`] / [`Dispatcher3`] for two
//! or three independent formats); any extra arguments travel as its fields.
//!
//! # Tables
//!
//! For each `(Dispatcher, FormatFilter)` pair, [`DispatchTable::ENTRIES`] is
//! a compile-time array with one slot per catalog entry. A slot holds a
//! function pointer to the instantiation for that format, or `None` when the
//! filter rejects the format. Lookup is a single index by `id - 1`.
//!
//! Double and triple dispatch resolve one format per level through the same
//! single-format tables, so the effective table is the nested
//! `N x N (x N)` product restricted to formats every filter accepts.
//!
//! # Example
//!
//! ```ignore
//! struct ByteSize;
//!
//! impl Dispatcher for ByteSize {
//!     type Output = usize;
//!
//!     fn call<T: Element>(self) -> usize {
//!         std::mem::size_of::<T>()
//!     }
//! }
//!
//! let size = dispatch::<Floats, _>(DataFormatId::Vec3Float32, ByteSize)?;
//! assert_eq!(size, 12);
//! ```

use std::marker::PhantomData;

use crate::element::Element;
use crate::error::DispatchError;
use crate::filter::FormatFilter;
use crate::format::{DataFormatId, FORMAT_COUNT};

/// A generic operation over one element type
pub trait Dispatcher {
    type Output;

    fn call<T: Element>(self) -> Self::Output;
}

/// A generic operation over two independently typed elements
pub trait Dispatcher2 {
    type Output;

    fn call<T1: Element, T2: Element>(self) -> Self::Output;
}

/// A generic operation over three independently typed elements
pub trait Dispatcher3 {
    type Output;

    fn call<T1: Element, T2: Element, T3: Element>(self) -> Self::Output;
}

/// Table slot: the dispatcher instantiated for one element type
pub type Thunk<D> = fn(D) -> <D as Dispatcher>::Output;

fn invoke<T: Element, D: Dispatcher>(dispatcher: D) -> D::Output {
    dispatcher.call::<T>()
}

/// Dispatch table for dispatcher `D` restricted by filter `F`
pub struct DispatchTable<D, F>(PhantomData<fn(D) -> F>);

macro_rules! table_entries {
    ($($variant:ident = $id:literal => $ty:ty, $name:literal;)*) => {
        [$(
            if F::MASK[$id - 1] {
                Some(invoke::<$ty, D> as Thunk<D>)
            } else {
                None
            },
        )*]
    };
}

impl<D: Dispatcher, F: FormatFilter> DispatchTable<D, F> {
    /// One slot per catalog entry, `None` where `F` rejects the format
    pub const ENTRIES: [Option<Thunk<D>>; FORMAT_COUNT] = crate::for_each_format!(table_entries);

    /// Whether `id` has an instantiation in this table
    pub fn is_supported(id: DataFormatId) -> bool {
        id.index().is_some_and(|i| Self::ENTRIES[i].is_some())
    }

    pub fn lookup(id: DataFormatId) -> Result<Thunk<D>, DispatchError> {
        let Some(index) = id.index() else {
            tracing::debug!(filter = %F::name(), "dispatch on unspecialized format");
            return Err(DispatchError::FormatNotSpecialized);
        };

        match Self::ENTRIES[index] {
            Some(thunk) => Ok(thunk),
            None => {
                tracing::debug!(format = %id, filter = %F::name(), "format rejected by filter");
                Err(DispatchError::FormatNotSupported {
                    format: id,
                    expected: F::name(),
                })
            }
        }
    }
}

/// Call `dispatcher` with the element type of `id`.
///
/// Fails with [`DispatchError::FormatNotSpecialized`] for
/// [`DataFormatId::NotSpecialized`] and with
/// [`DispatchError::FormatNotSupported`] when `F` rejects the format.
pub fn dispatch<F, D>(id: DataFormatId, dispatcher: D) -> Result<D::Output, DispatchError>
where
    F: FormatFilter,
    D: Dispatcher,
{
    let thunk = DispatchTable::<D, F>::lookup(id)?;
    Ok(thunk(dispatcher))
}

/// Call `dispatcher` with the element types of `first` and `second`,
/// filtered by `F1` and `F2` respectively.
pub fn dispatch2<F1, F2, D>(
    first: DataFormatId,
    second: DataFormatId,
    dispatcher: D,
) -> Result<D::Output, DispatchError>
where
    F1: FormatFilter,
    F2: FormatFilter,
    D: Dispatcher2,
{
    dispatch::<F1, _>(
        first,
        Resolve2::<D, F2> {
            inner: dispatcher,
            second,
            filter: PhantomData,
        },
    )?
}

/// Call `dispatcher` with the element types of three formats, each with its
/// own filter.
pub fn dispatch3<F1, F2, F3, D>(
    first: DataFormatId,
    second: DataFormatId,
    third: DataFormatId,
    dispatcher: D,
) -> Result<D::Output, DispatchError>
where
    F1: FormatFilter,
    F2: FormatFilter,
    F3: FormatFilter,
    D: Dispatcher3,
{
    dispatch::<F1, _>(
        first,
        Resolve3::<D, F2, F3> {
            inner: dispatcher,
            second,
            third,
            filters: PhantomData,
        },
    )?
}

// Level 1 of double dispatch: T1 is known, resolve T2.
struct Resolve2<D, F2> {
    inner: D,
    second: DataFormatId,
    filter: PhantomData<fn() -> F2>,
}

impl<D: Dispatcher2, F2: FormatFilter> Dispatcher for Resolve2<D, F2> {
    type Output = Result<D::Output, DispatchError>;

    fn call<T1: Element>(self) -> Self::Output {
        dispatch::<F2, _>(
            self.second,
            Bound2::<D, T1> {
                inner: self.inner,
                first: PhantomData,
            },
        )
    }
}

struct Bound2<D, T1> {
    inner: D,
    first: PhantomData<fn() -> T1>,
}

impl<D: Dispatcher2, T1: Element> Dispatcher for Bound2<D, T1> {
    type Output = D::Output;

    fn call<T2: Element>(self) -> D::Output {
        self.inner.call::<T1, T2>()
    }
}

struct Resolve3<D, F2, F3> {
    inner: D,
    second: DataFormatId,
    third: DataFormatId,
    filters: PhantomData<fn() -> (F2, F3)>,
}

impl<D: Dispatcher3, F2: FormatFilter, F3: FormatFilter> Dispatcher for Resolve3<D, F2, F3> {
    type Output = Result<D::Output, DispatchError>;

    fn call<T1: Element>(self) -> Self::Output {
        dispatch::<F2, _>(
            self.second,
            Resolve3Second::<D, T1, F3> {
                inner: self.inner,
                third: self.third,
                marker: PhantomData,
            },
        )?
    }
}

struct Resolve3Second<D, T1, F3> {
    inner: D,
    third: DataFormatId,
    marker: PhantomData<fn() -> (T1, F3)>,
}

impl<D: Dispatcher3, T1: Element, F3: FormatFilter> Dispatcher for Resolve3Second<D, T1, F3> {
    type Output = Result<D::Output, DispatchError>;

    fn call<T2: Element>(self) -> Self::Output {
        dispatch::<F3, _>(
            self.third,
            Bound3::<D, T1, T2> {
                inner: self.inner,
                marker: PhantomData,
            },
        )
    }
}

struct Bound3<D, T1, T2> {
    inner: D,
    marker: PhantomData<fn() -> (T1, T2)>,
}

impl<D: Dispatcher3, T1: Element, T2: Element> Dispatcher for Bound3<D, T1, T2> {
    type Output = D::Output;

    fn call<T3: Element>(self) -> D::Output {
        self.inner.call::<T1, T2, T3>()
    }
}
