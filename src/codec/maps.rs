//! String map helpers
//!
//! Labels, annotations, node selectors and resource lists are all string maps.
//! `BTreeMap` keeps their serialized order stable across runs.

use crate::codec::quantity::to_quantity;
use crate::config::TranscodeConfig;
use crate::error::{ResultExt, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::warn;

/// Drop annotations whose key starts with a reserved prefix
pub fn filter_reserved(
    annotations: &BTreeMap<String, String>,
    config: &TranscodeConfig,
) -> BTreeMap<String, String> {
    let mut kept = BTreeMap::new();
    let mut dropped = 0usize;
    for (key, value) in annotations {
        if config.is_reserved_annotation(key) {
            dropped += 1;
        } else {
            kept.insert(key.clone(), value.clone());
        }
    }
    if dropped > 0 {
        warn!(dropped, kept = kept.len(), "Filtered reserved annotations");
    }
    kept
}

/// Validate every value of a resource list and wrap it as a [`Quantity`]
pub fn to_quantity_map(values: &BTreeMap<String, String>) -> Result<BTreeMap<String, Quantity>> {
    values
        .iter()
        .map(|(name, value)| Ok((name.clone(), to_quantity(name, value).for_field(name)?)))
        .collect()
}

pub fn from_quantity_map(values: &BTreeMap<String, Quantity>) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(name, q)| (name.clone(), q.0.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_reserved_keeps_ordinary_keys() {
        let annotations = BTreeMap::from([
            ("kubevirt.io/latest-observed-api-version".to_string(), "v1".to_string()),
            ("owner".to_string(), "team-a".to_string()),
        ]);
        let kept = filter_reserved(&annotations, &TranscodeConfig::default());
        assert_eq!(kept, BTreeMap::from([("owner".to_string(), "team-a".to_string())]));
    }

    #[test]
    fn test_filter_reserved_honors_configured_prefix() {
        let annotations = BTreeMap::from([
            ("kubevirt.io/x".to_string(), "1".to_string()),
            ("example.com/y".to_string(), "2".to_string()),
        ]);
        let config = TranscodeConfig::default().with_reserved_annotation_prefixes(["example.com/"]);
        let kept = filter_reserved(&annotations, &config);
        assert_eq!(kept.keys().collect::<Vec<_>>(), ["kubevirt.io/x"]);
    }

    #[test]
    fn test_quantity_map_round_trip() {
        let requests = BTreeMap::from([
            ("cpu".to_string(), "500m".to_string()),
            ("memory".to_string(), "2Gi".to_string()),
        ]);
        let quantities = to_quantity_map(&requests).unwrap();
        assert_eq!(from_quantity_map(&quantities), requests);
    }

    #[test]
    fn test_quantity_map_names_bad_entry() {
        let requests = BTreeMap::from([("memory".to_string(), "lots".to_string())]);
        let err = to_quantity_map(&requests).unwrap_err();
        assert_eq!(err.field_path(), "memory");
    }
}
