//! Integer types accepted as raw index input and produced as index output.

/// An integer type that can carry a non-negative index.
///
/// Conversions are unchecked narrowing casts: callers only pass values that
/// fit, which debug builds verify.
pub trait IndexValue: Copy + Ord + Send + Sync + std::fmt::Debug + 'static {
    fn to_i64(self) -> i64;

    fn from_i64(value: i64) -> Self;
}

macro_rules! impl_index_value {
    ($($t:ty),*) => {
        $(
            impl IndexValue for $t {
                #[inline]
                fn to_i64(self) -> i64 {
                    debug_assert!(i64::try_from(self).is_ok(), "index {self} exceeds i64");
                    self as i64
                }

                #[inline]
                fn from_i64(value: i64) -> Self {
                    debug_assert!(
                        <$t>::try_from(value).is_ok(),
                        "index {value} does not fit into {}",
                        stringify!($t)
                    );
                    value as $t
                }
            }
        )*
    };
}

impl_index_value!(i32, i64, u32, u64, usize);
