//! Format filters
//!
//! A filter decides which catalog formats a generic operation is
//! instantiated for. Filters are evaluated at compile time into a
//! [`FormatMask`]; dispatch tables only reference monomorphized code for the
//! formats whose mask bit is set.
//!
//! Filters compose with [`And`], [`Or`] and [`Not`]:
//!
//! ```ignore
//! type SmallUnsigned = And<UnsignedIntegerScalars, Not<Float1s>>;
//! ```

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::format::{DataFormat, CATALOG, FORMAT_COUNT};

/// One flag per catalog entry, indexed by `id - 1`
pub type FormatMask = [bool; FORMAT_COUNT];

/// Compile-time predicate over the format catalog
pub trait FormatFilter: 'static {
    const MASK: FormatMask;

    /// Name reported when dispatch rejects a format
    fn name() -> Cow<'static, str>;

    fn accepts(format: &DataFormat) -> bool {
        format.id.index().is_some_and(|i| Self::MASK[i])
    }

    /// Number of formats passing the filter
    fn count() -> usize {
        Self::MASK.iter().filter(|&&accepted| accepted).count()
    }
}

macro_rules! format_filter {
    ($(#[$meta:meta])* $name:ident, |$f:ident| $accepts:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl FormatFilter for $name {
            const MASK: FormatMask = {
                let mut mask = [false; FORMAT_COUNT];
                let mut i = 0;
                while i < FORMAT_COUNT {
                    let $f = &CATALOG[i];
                    mask[i] = $accepts;
                    i += 1;
                }
                mask
            };

            fn name() -> Cow<'static, str> {
                Cow::Borrowed(stringify!($name))
            }
        }
    };
}

format_filter!(
    /// Every scalar and vector format
    All, |f| f.rank() < 2
);
format_filter!(Scalars, |f| f.rank() < 2 && f.components == 1);
format_filter!(
    /// Vector formats of any length
    Vecs, |f| f.rank() < 2 && f.components > 1
);
format_filter!(Vec2s, |f| f.rank() < 2 && f.components == 2);
format_filter!(Vec3s, |f| f.rank() < 2 && f.components == 3);
format_filter!(Vec4s, |f| f.rank() < 2 && f.components == 4);
format_filter!(Floats, |f| f.rank() < 2 && f.is_float());
format_filter!(Float1s, |f| f.rank() < 2 && f.is_float() && f.components == 1);
format_filter!(Float2s, |f| f.rank() < 2 && f.is_float() && f.components == 2);
format_filter!(Float3s, |f| f.rank() < 2 && f.is_float() && f.components == 3);
format_filter!(Float4s, |f| f.rank() < 2 && f.is_float() && f.components == 4);
format_filter!(Integers, |f| f.rank() < 2 && f.is_integer());
format_filter!(SignedIntegers, |f| f.rank() < 2 && f.is_signed_integer());
format_filter!(UnsignedIntegers, |f| f.rank() < 2 && f.is_unsigned_integer());
format_filter!(IntegerScalars, |f| f.rank() < 2 && f.is_integer() && f.components == 1);
format_filter!(SignedIntegerScalars, |f| {
    f.rank() < 2 && f.is_signed_integer() && f.components == 1
});
format_filter!(UnsignedIntegerScalars, |f| {
    f.rank() < 2 && f.is_unsigned_integer() && f.components == 1
});

/// Formats accepted by both `A` and `B`
#[derive(Debug, Clone, Copy, Default)]
pub struct And<A, B>(PhantomData<(A, B)>);

impl<A: FormatFilter, B: FormatFilter> FormatFilter for And<A, B> {
    const MASK: FormatMask = {
        let mut mask = [false; FORMAT_COUNT];
        let mut i = 0;
        while i < FORMAT_COUNT {
            mask[i] = A::MASK[i] && B::MASK[i];
            i += 1;
        }
        mask
    };

    fn name() -> Cow<'static, str> {
        Cow::Owned(format!("({} & {})", A::name(), B::name()))
    }
}

/// Formats accepted by `A` or `B`
#[derive(Debug, Clone, Copy, Default)]
pub struct Or<A, B>(PhantomData<(A, B)>);

impl<A: FormatFilter, B: FormatFilter> FormatFilter for Or<A, B> {
    const MASK: FormatMask = {
        let mut mask = [false; FORMAT_COUNT];
        let mut i = 0;
        while i < FORMAT_COUNT {
            mask[i] = A::MASK[i] || B::MASK[i];
            i += 1;
        }
        mask
    };

    fn name() -> Cow<'static, str> {
        Cow::Owned(format!("({} | {})", A::name(), B::name()))
    }
}

/// Formats rejected by `A`
#[derive(Debug, Clone, Copy, Default)]
pub struct Not<A>(PhantomData<A>);

impl<A: FormatFilter> FormatFilter for Not<A> {
    const MASK: FormatMask = {
        let mut mask = [false; FORMAT_COUNT];
        let mut i = 0;
        while i < FORMAT_COUNT {
            mask[i] = !A::MASK[i];
            i += 1;
        }
        mask
    };

    fn name() -> Cow<'static, str> {
        Cow::Owned(format!("!{}", A::name()))
    }
}
