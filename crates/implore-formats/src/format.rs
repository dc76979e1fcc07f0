//! Format ids and static format descriptors
//!
//! [`DataFormatId`] is the runtime type tag carried by type-erased volumes.
//! [`FORMATS`] holds one [`DataFormat`] descriptor per id, with the
//! invariant `FORMATS[id - 1].id == id` for every id in `1..=FORMAT_COUNT`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{ComponentLayout, Element};
use crate::error::FormatError;
use crate::numeric::{NumericType, Primitive};

macro_rules! define_formats {
    ($($variant:ident = $id:literal => $ty:ty, $name:literal;)*) => {
        /// Runtime tag identifying a voxel format
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum DataFormatId {
            /// No format, never dispatchable
            NotSpecialized = 0,
            $($variant = $id,)*
        }

        /// Number of formats in the catalog
        pub const FORMAT_COUNT: usize = [$($id),*].len();

        impl DataFormatId {
            /// Every specialized format id, in catalog order
            pub const ALL: [DataFormatId; FORMAT_COUNT] = [$(DataFormatId::$variant,)*];
        }

        pub(crate) const CATALOG: [DataFormat; FORMAT_COUNT] = [
            $(DataFormat::of::<$ty>(DataFormatId::$variant, $name),)*
        ];
    };
}

crate::for_each_format!(define_formats);

/// All format descriptors, indexed by `id - 1`
pub static FORMATS: [DataFormat; FORMAT_COUNT] = CATALOG;

impl DataFormatId {
    /// Numeric value of the id
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Position in [`FORMATS`], `None` for [`DataFormatId::NotSpecialized`]
    pub const fn index(self) -> Option<usize> {
        match self {
            DataFormatId::NotSpecialized => None,
            id => Some(id as usize - 1),
        }
    }

    pub fn format(self) -> Option<&'static DataFormat> {
        self.index().map(|i| &FORMATS[i])
    }

    pub fn name(self) -> &'static str {
        self.format().map_or("NOT_SPECIALIZED", |f| f.name)
    }
}

impl Default for DataFormatId {
    fn default() -> Self {
        DataFormatId::NotSpecialized
    }
}

impl fmt::Display for DataFormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for DataFormatId {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataFormatId::NotSpecialized),
            v if (v as usize) <= FORMAT_COUNT => Ok(DataFormatId::ALL[v as usize - 1]),
            v => Err(FormatError::InvalidId(v)),
        }
    }
}

impl FromStr for DataFormatId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataFormat::from_name(s)
            .map(|f| f.id)
            .ok_or_else(|| FormatError::UnknownName(s.to_string()))
    }
}

/// Static descriptor of one voxel format
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataFormat {
    pub id: DataFormatId,

    /// Display name, e.g. `"FLOAT32"` or `"Vec3UINT8"`
    pub name: &'static str,

    /// Number of components (1-4)
    pub components: usize,

    /// Size of one element in bytes
    pub size: usize,

    /// Bits per component
    pub precision: usize,

    pub numeric_type: NumericType,

    /// Lowest representable component value
    pub lowest: f64,

    /// Largest representable component value
    pub max: f64,
}

impl DataFormat {
    const fn of<T: Element>(id: DataFormatId, name: &'static str) -> Self {
        Self {
            id,
            name,
            components: <T as ComponentLayout>::COMPONENTS,
            size: std::mem::size_of::<T>(),
            precision: <<T as ComponentLayout>::Primitive as Primitive>::PRECISION,
            numeric_type: <<T as ComponentLayout>::Primitive as Primitive>::NUMERIC_TYPE,
            lowest: <<T as ComponentLayout>::Primitive as Primitive>::LOWEST,
            max: <<T as ComponentLayout>::Primitive as Primitive>::MAX,
        }
    }

    /// Look up a descriptor by id
    pub fn get(id: DataFormatId) -> Option<&'static DataFormat> {
        id.format()
    }

    /// Look up a descriptor by display name (case sensitive)
    pub fn from_name(name: &str) -> Option<&'static DataFormat> {
        FORMATS.iter().find(|f| f.name == name)
    }

    /// Find the format with the given numeric kind, component count and
    /// bits per component
    pub fn find(
        numeric_type: NumericType,
        components: usize,
        precision: usize,
    ) -> Option<&'static DataFormat> {
        FORMATS.iter().find(|f| {
            f.numeric_type == numeric_type
                && f.components == components
                && f.precision == precision
        })
    }

    /// 0 for scalars, 1 for vectors
    pub const fn rank(&self) -> usize {
        if self.components > 1 {
            1
        } else {
            0
        }
    }

    pub const fn is_scalar(&self) -> bool {
        self.components == 1
    }

    pub const fn is_float(&self) -> bool {
        matches!(self.numeric_type, NumericType::Float)
    }

    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    pub const fn is_signed_integer(&self) -> bool {
        matches!(self.numeric_type, NumericType::SignedInteger)
    }

    pub const fn is_unsigned_integer(&self) -> bool {
        matches!(self.numeric_type, NumericType::UnsignedInteger)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
