//! Discriminated-union selection
//!
//! Every model encodes a union as a group of optional fields where exactly one
//! should be set. Branches are listed in priority order. Selecting yields:
//!
//! - `Ok(None)` when no branch is set, so callers can omit the field
//! - `Ok(Some(..))` with the single populated branch
//! - [`ConvertError::AmbiguousUnion`] naming every populated branch otherwise
//!
//! Re-encoding is done by the caller, which builds a target with exactly one
//! field set.

use crate::error::{ConvertError, Result, ResultExt};

/// Select the single populated branch of a union
pub fn pick<V, I>(union: &str, branches: I) -> Result<Option<(&'static str, V)>>
where
    I: IntoIterator<Item = (&'static str, Option<V>)>,
{
    let mut populated: Vec<(&'static str, V)> = branches
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();

    if populated.len() > 1 {
        return Err(ConvertError::AmbiguousUnion {
            union: union.to_string(),
            variants: populated.iter().map(|(name, _)| *name).collect(),
        });
    }
    Ok(populated.pop())
}

/// Name of the populated branch, from presence flags
pub fn variant<I>(union: &str, branches: I) -> Result<Option<&'static str>>
where
    I: IntoIterator<Item = (&'static str, bool)>,
{
    let selected = pick(
        union,
        branches
            .into_iter()
            .map(|(name, present)| (name, present.then_some(()))),
    )?;
    Ok(selected.map(|(name, _)| name))
}

/// Select the populated branch and unwrap its converted value
///
/// Each branch carries the result of converting that branch (computed only
/// when the branch is present). A conversion error is wrapped with the
/// branch name.
pub fn map_variant<T, I>(union: &str, branches: I) -> Result<Option<T>>
where
    I: IntoIterator<Item = (&'static str, Option<Result<T>>)>,
{
    match pick(union, branches)? {
        None => Ok(None),
        Some((name, converted)) => converted.for_field(name).map(Some),
    }
}

#[cfg(test)]
#[path = "union_test.rs"]
mod tests;
