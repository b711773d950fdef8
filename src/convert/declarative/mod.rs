//! Declarative <-> Transport transcoders
//!
//! `expand_*` functions read a declarative attribute tree and build the
//! transport shape; `flatten_*` functions go the other way and return
//! attribute maps. Top-level flattening stages every write in a
//! [`StagedState`](crate::state::StagedState) and commits only after the whole
//! object has converted.
//!
//! A nested declarative value is a list holding at most one map, so an absent
//! block reads as `None` and a present-but-empty block (`[{}]`) as an empty map.

pub mod data_volume;
pub mod devices;
pub mod domain;
pub mod dv;
pub mod metadata;
pub mod probe;
pub mod scheduling;
pub mod status;
pub mod vm;
pub mod volume;

use crate::codec::{narrow_opt, IntKind};
use crate::error::{Result, ResultExt};
use crate::state::{AttrMap, Fields};

pub use dv::{expand_data_volume, flatten_data_volume, vm_reference, DV_KEYS};
pub use vm::{expand_vm, flatten_vm, VM_KEYS};

/// Read an integer attribute and narrow it to the transport width
pub(crate) fn int_field<T: IntKind>(fields: &Fields<'_>, key: &str) -> Result<Option<T>> {
    narrow_opt(fields.int(key)?, key)
}

/// Like [`int_field`], treating zero as unset
pub(crate) fn int_ok_field<T: IntKind>(fields: &Fields<'_>, key: &str) -> Result<Option<T>> {
    narrow_opt(fields.int_ok(key)?, key)
}

/// Expand the single nested block under `key`, if present
pub(crate) fn expand_block<T, F>(fields: &Fields<'_>, key: &str, expand: F) -> Result<Option<T>>
where
    F: FnOnce(&Fields<'_>) -> Result<T>,
{
    fields
        .block(key)?
        .map(|block| expand(&block))
        .transpose()
        .for_field(key)
}

/// Expand every element of a block list, tagging failures with the index
pub(crate) fn expand_blocks<T, F>(fields: &Fields<'_>, key: &str, expand: F) -> Result<Vec<T>>
where
    F: Fn(&Fields<'_>) -> Result<T>,
{
    fields
        .blocks(key)?
        .iter()
        .enumerate()
        .map(|(index, block)| expand(block).for_field(&format!("{key}[{index}]")))
        .collect()
}

/// Flatten an optional value into a nested block
pub(crate) fn flatten_opt<S, F>(value: Option<&S>, flatten: F) -> Option<AttrMap>
where
    F: FnOnce(&S) -> AttrMap,
{
    value.map(flatten)
}

/// Flatten a fallible optional value, tagging failures with `key`
pub(crate) fn try_flatten_opt<S, F>(value: Option<&S>, key: &str, flatten: F) -> Result<Option<AttrMap>>
where
    F: FnOnce(&S) -> Result<AttrMap>,
{
    value.map(flatten).transpose().for_field(key)
}

/// Flatten every element of a list, tagging failures with the index
pub(crate) fn try_flatten_list<S, F>(values: &[S], key: &str, flatten: F) -> Result<Vec<AttrMap>>
where
    F: Fn(&S) -> Result<AttrMap>,
{
    values
        .iter()
        .enumerate()
        .map(|(index, value)| flatten(value).for_field(&format!("{key}[{index}]")))
        .collect()
}

#[cfg(test)]
#[path = "declarative_test.rs"]
mod tests;
