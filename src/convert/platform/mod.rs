//! Transport <-> Platform mappers
//!
//! Each substructure has a `*_to_platform` and a `*_to_transport` function
//! that copy fields one by one. Field names differ between the two models in
//! several places (cloud-init secret refs, disk targets, interface bindings,
//! required vs optional strings), so a structural JSON copy is not enough.
//! Required platform fields that are absent on the transport side fail with
//! [`ConvertError::MissingField`].
//!
//! Only the VM status subtree, whose two shapes match, goes through
//! [`super::bridge`].

pub mod data_volume;
pub mod domain;
pub mod metadata;
pub mod scheduling;
pub mod vm;
pub mod volume;

use crate::error::{ConvertError, Result};

pub use data_volume::{data_volume_to_platform, data_volume_to_transport};
pub use vm::{vm_to_platform, vm_to_transport};

/// Take a required string, failing with the field name when absent
pub(crate) fn required(value: &Option<String>, field: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| ConvertError::MissingField(field.to_string()))
}

/// Empty transport lists become absent platform lists
pub(crate) fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Empty transport maps become absent platform maps
pub(crate) fn non_empty_map<K: Clone + Ord, V: Clone>(
    values: &std::collections::BTreeMap<K, V>,
) -> Option<std::collections::BTreeMap<K, V>> {
    (!values.is_empty()).then(|| values.clone())
}

/// Convert every element, wrapping failures with the list name and index
pub(crate) fn map_list<S, T, F>(field: &str, items: &[S], convert: F) -> Result<Vec<T>>
where
    F: Fn(&S) -> Result<T>,
{
    items
        .iter()
        .enumerate()
        .map(|(index, item)| convert(item).map_err(|e| e.in_field(format!("{field}[{index}]"))))
        .collect()
}

#[cfg(test)]
#[path = "platform_test.rs"]
mod tests;
