//! Checked integer narrowing
//!
//! The three models disagree on integer widths: the declarative tree stores
//! every integer as `i64`, the transport model mixes `i64` and `i32`, and the
//! platform uses `u32` for CPU topology and boot order. Crossing any of those
//! boundaries goes through [`narrow`], which rejects values the target cannot
//! hold instead of wrapping them.

use crate::error::{ConvertError, Result};

/// An integer type that values can be narrowed into
pub trait IntKind: Copy {
    /// Name used in error messages
    const NAME: &'static str;
    const MIN: i128;
    const MAX: i128;

    /// Convert a value already known to lie in `MIN..=MAX`
    fn from_wide(value: i128) -> Self;
}

macro_rules! int_kind {
    ($($ty:ty),*) => {
        $(
            impl IntKind for $ty {
                const NAME: &'static str = stringify!($ty);
                const MIN: i128 = <$ty>::MIN as i128;
                const MAX: i128 = <$ty>::MAX as i128;

                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn from_wide(value: i128) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

int_kind!(u16, u32, u64, i32, i64);

/// Narrow `value` into `T`, failing instead of wrapping
///
/// Negative input for an unsigned target is a [`ConvertError::Negative`];
/// anything else outside `T`'s range is a [`ConvertError::OutOfRange`].
pub fn narrow<S, T>(value: S, field: &str) -> Result<T>
where
    S: Into<i128>,
    T: IntKind,
{
    let wide: i128 = value.into();
    if wide < T::MIN {
        if T::MIN == 0 {
            return Err(ConvertError::Negative {
                field: field.to_string(),
                value: wide,
                target: T::NAME,
            });
        }
        return Err(ConvertError::OutOfRange {
            field: field.to_string(),
            value: wide,
            target: T::NAME,
        });
    }
    if wide > T::MAX {
        return Err(ConvertError::OutOfRange {
            field: field.to_string(),
            value: wide,
            target: T::NAME,
        });
    }
    Ok(T::from_wide(wide))
}

/// [`narrow`] lifted over `Option`
pub fn narrow_opt<S, T>(value: Option<S>, field: &str) -> Result<Option<T>>
where
    S: Into<i128>,
    T: IntKind,
{
    value.map(|v| narrow(v, field)).transpose()
}

#[cfg(test)]
#[path = "narrow_test.rs"]
mod tests;
