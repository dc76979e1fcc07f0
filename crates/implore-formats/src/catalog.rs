//! The format catalog.
//!
//! Every supported voxel element type is listed exactly once in
//! [`for_each_format!`]. The id enum, the descriptor table, the [`Element`]
//! impls and the dispatch tables are all generated from this list.
//!
//! [`Element`]: crate::Element

/// Invoke `$callback!` with the full format catalog.
///
/// Each entry has the form `Variant = id => ElementType, "NAME";`. Ids are
/// dense and start at 1; id 0 is reserved for
/// [`DataFormatId::NotSpecialized`](crate::DataFormatId::NotSpecialized).
///
/// ```ignore
/// macro_rules! count {
///     ($($variant:ident = $id:literal => $ty:ty, $name:literal;)*) => {
///         [$($id),*].len()
///     };
/// }
/// assert_eq!(implore_formats::for_each_format!(count), 44);
/// ```
#[macro_export]
macro_rules! for_each_format {
    ($callback:ident) => {
        $callback! {
            Float16 = 1 => $crate::f16, "FLOAT16";
            Float32 = 2 => f32, "FLOAT32";
            Float64 = 3 => f64, "FLOAT64";
            Int8 = 4 => i8, "INT8";
            Int16 = 5 => i16, "INT16";
            Int32 = 6 => i32, "INT32";
            Int64 = 7 => i64, "INT64";
            UInt8 = 8 => u8, "UINT8";
            UInt16 = 9 => u16, "UINT16";
            UInt32 = 10 => u32, "UINT32";
            UInt64 = 11 => u64, "UINT64";

            Vec2Float16 = 12 => [$crate::f16; 2], "Vec2FLOAT16";
            Vec2Float32 = 13 => [f32; 2], "Vec2FLOAT32";
            Vec2Float64 = 14 => [f64; 2], "Vec2FLOAT64";
            Vec2Int8 = 15 => [i8; 2], "Vec2INT8";
            Vec2Int16 = 16 => [i16; 2], "Vec2INT16";
            Vec2Int32 = 17 => [i32; 2], "Vec2INT32";
            Vec2Int64 = 18 => [i64; 2], "Vec2INT64";
            Vec2UInt8 = 19 => [u8; 2], "Vec2UINT8";
            Vec2UInt16 = 20 => [u16; 2], "Vec2UINT16";
            Vec2UInt32 = 21 => [u32; 2], "Vec2UINT32";
            Vec2UInt64 = 22 => [u64; 2], "Vec2UINT64";

            Vec3Float16 = 23 => [$crate::f16; 3], "Vec3FLOAT16";
            Vec3Float32 = 24 => [f32; 3], "Vec3FLOAT32";
            Vec3Float64 = 25 => [f64; 3], "Vec3FLOAT64";
            Vec3Int8 = 26 => [i8; 3], "Vec3INT8";
            Vec3Int16 = 27 => [i16; 3], "Vec3INT16";
            Vec3Int32 = 28 => [i32; 3], "Vec3INT32";
            Vec3Int64 = 29 => [i64; 3], "Vec3INT64";
            Vec3UInt8 = 30 => [u8; 3], "Vec3UINT8";
            Vec3UInt16 = 31 => [u16; 3], "Vec3UINT16";
            Vec3UInt32 = 32 => [u32; 3], "Vec3UINT32";
            Vec3UInt64 = 33 => [u64; 3], "Vec3UINT64";

            Vec4Float16 = 34 => [$crate::f16; 4], "Vec4FLOAT16";
            Vec4Float32 = 35 => [f32; 4], "Vec4FLOAT32";
            Vec4Float64 = 36 => [f64; 4], "Vec4FLOAT64";
            Vec4Int8 = 37 => [i8; 4], "Vec4INT8";
            Vec4Int16 = 38 => [i16; 4], "Vec4INT16";
            Vec4Int32 = 39 => [i32; 4], "Vec4INT32";
            Vec4Int64 = 40 => [i64; 4], "Vec4INT64";
            Vec4UInt8 = 41 => [u8; 4], "Vec4UINT8";
            Vec4UInt16 = 42 => [u16; 4], "Vec4UINT16";
            Vec4UInt32 = 43 => [u32; 4], "Vec4UINT32";
            Vec4UInt64 = 44 => [u64; 4], "Vec4UINT64";
        }
    };
}
