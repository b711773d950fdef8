//! Tests for union selection

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

/// Test: no populated branch is the "no variant" sentinel, not an error
#[test]
fn test_no_variant_is_none() {
    let selected = variant("volumeSource", [("dataVolume", false), ("containerDisk", false)]);
    assert_eq!(selected.unwrap(), None);
}

/// Test: the single populated branch is returned
#[test]
fn test_single_variant() {
    let selected = variant("volumeSource", [("dataVolume", false), ("containerDisk", true)]);
    assert_eq!(selected.unwrap(), Some("containerDisk"));
}

/// Test: more than one populated branch is rejected and every branch is named
#[test]
fn test_ambiguous_union_rejected() {
    let err = variant(
        "networkSource",
        [("pod", true), ("multus", true)],
    )
    .unwrap_err();
    match err {
        ConvertError::AmbiguousUnion { union, variants } => {
            assert_eq!(union, "networkSource");
            assert_eq!(variants, ["pod", "multus"]);
        }
        other => panic!("expected AmbiguousUnion, got {other:?}"),
    }
}

/// Test: map_variant wraps the branch's conversion error with its name
#[test]
fn test_map_variant_wraps_branch_error() {
    let branches: [(&'static str, Option<Result<u32>>); 2] = [
        ("pod", None),
        (
            "multus",
            Some(Err(ConvertError::MissingField("networkName".to_string()))),
        ),
    ];
    let err = map_variant("networkSource", branches).unwrap_err();
    assert_eq!(err.to_string(), "failed to convert multus: networkName is required");
}

/// Test: map_variant returns the converted value
#[test]
fn test_map_variant_value() {
    let branches = [("pod", Some(Ok(7u32))), ("multus", None)];
    assert_eq!(map_variant("networkSource", branches).unwrap(), Some(7));
}
