#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    printable_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observed_generation: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SameShape {
    #[serde(skip_serializing_if = "Option::is_none")]
    printable_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observed_generation: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Renamed {
    #[serde(rename = "printableStatus", skip_serializing_if = "Option::is_none")]
    printable_status: Option<String>,
    #[serde(rename = "generation", skip_serializing_if = "Option::is_none")]
    generation: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Strict {
    count: u32,
}

/// Test: identical shapes bridge without loss
#[test]
fn test_bridge_same_shape() {
    let source = Source {
        printable_status: Some("Running".to_string()),
        observed_generation: Some(3),
    };

    let target: SameShape = bridge("status", &source).unwrap();

    assert_eq!(target.printable_status.as_deref(), Some("Running"));
    assert_eq!(target.observed_generation, Some(3));
}

/// Test: a field renamed on the target side is reported as drift
#[test]
fn test_bridge_detects_renamed_field() {
    let source = Source {
        printable_status: Some("Running".to_string()),
        observed_generation: Some(3),
    };

    let err = bridge::<_, Renamed>("status", &source).unwrap_err();

    match err {
        ConvertError::BridgeDrift { what, path } => {
            assert_eq!(what, "status");
            assert_eq!(path, "observedGeneration");
        }
        other => panic!("expected drift, got {other:?}"),
    }
}

/// Test: an absent source field is not drift even if the target lacks it
#[test]
fn test_bridge_ignores_absent_fields() {
    let source = Source {
        printable_status: Some("Stopped".to_string()),
        observed_generation: None,
    };

    let target: Renamed = bridge("status", &source).unwrap();

    assert_eq!(target.printable_status.as_deref(), Some("Stopped"));
    assert_eq!(target.generation, None);
}

/// Test: a value the target cannot hold is an unmarshal error naming the subtree
#[test]
fn test_bridge_unmarshal_error() {
    let err = bridge::<_, Strict>("counter", &json!({"count": -1})).unwrap_err();

    assert!(matches!(err, ConvertError::Unmarshal { .. }));
    assert!(err.to_string().starts_with("failed to unmarshal counter"));
}

/// Test: dropped paths inside arrays carry their index
#[test]
fn test_first_dropped_path_in_array() {
    let source = json!({"conditions": [{"type": "Ready"}, {"type": "Paused", "reason": "x"}]});
    let target = json!({"conditions": [{"type": "Ready"}, {"type": "Paused"}]});

    assert_eq!(
        first_dropped_path(&source, &target, String::new()).as_deref(),
        Some("conditions[1].reason")
    );
}

/// Test: empty marker objects must survive too
#[test]
fn test_first_dropped_path_marker_object() {
    let source = json!({"blank": {}});

    assert_eq!(
        first_dropped_path(&source, &json!({}), String::new()).as_deref(),
        Some("blank")
    );
    assert_eq!(first_dropped_path(&source, &source, String::new()), None);
}

/// Test: scalars are compared by presence only
#[test]
fn test_first_dropped_path_ignores_scalar_format() {
    let source = json!({"time": "2024-05-01T10:00:00.000Z"});
    let target = json!({"time": "2024-05-01T10:00:00Z"});

    assert_eq!(first_dropped_path(&source, &target, String::new()), None);
}
