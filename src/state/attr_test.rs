//! Tests for declarative attribute values

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use serde_json::json;

fn attrs(value: serde_json::Value) -> AttrMap {
    match value {
        serde_json::Value::Object(object) => map_from_json(object).unwrap(),
        other => panic!("expected object, got {other}"),
    }
}

/// Test: JSON nulls are dropped and nested blocks become list-of-map
#[test]
fn test_from_json_drops_nulls() {
    let map = attrs(json!({
        "name": "vm-1",
        "hostname": null,
        "cpu": [{"cores": 4}]
    }));
    assert!(!map.contains_key("hostname"));
    let fields = Fields::new(&map);
    let cpu = fields.block("cpu").unwrap().unwrap();
    assert_eq!(cpu.int("cores").unwrap(), Some(4));
}

/// Test: floats are rejected since the declarative model only holds integers
#[test]
fn test_from_json_rejects_float() {
    let err = Attr::from_json("cores", json!(1.5)).unwrap_err();
    assert!(matches!(err, ConvertError::TypeMismatch { .. }));
}

/// Test: a present-but-empty block reads as Some(empty)
#[test]
fn test_present_but_empty_block() {
    let map = attrs(json!({"bios": [{}], "efi": []}));
    let fields = Fields::new(&map);
    let bios = fields.block("bios").unwrap().unwrap();
    assert!(bios.map().is_empty());
    assert!(fields.block("efi").unwrap().is_none());
    assert!(fields.block("missing").unwrap().is_none());
}

/// Test: getters report the key on type mismatch
#[test]
fn test_type_mismatch_names_key() {
    let map = attrs(json!({"cores": "four"}));
    let err = Fields::new(&map).int("cores").unwrap_err();
    assert_eq!(err.to_string(), "cores has the wrong type, expected int");
}

/// Test: empty strings read as absent, zero ints only through int_ok
#[test]
fn test_zero_values() {
    let map = attrs(json!({"serial": "", "boot_order": 0}));
    let fields = Fields::new(&map);
    assert_eq!(fields.str("serial").unwrap(), None);
    assert_eq!(fields.int("boot_order").unwrap(), Some(0));
    assert_eq!(fields.int_ok("boot_order").unwrap(), None);
    assert!(!fields.has("boot_order"));
}

/// Test: sets deduplicate and ignore insertion order
#[test]
fn test_set_dedup_and_order() {
    let a: AttrSet = ["ReadWriteOnce", "ReadOnlyMany", "ReadWriteOnce"]
        .into_iter()
        .map(Attr::from)
        .collect();
    let b: AttrSet = ["ReadOnlyMany", "ReadWriteOnce"]
        .into_iter()
        .map(Attr::from)
        .collect();
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
    assert!(a.contains(&Attr::from("ReadOnlyMany")));
    assert_eq!(
        serde_json::to_string(&Attr::Set(a)).unwrap(),
        serde_json::to_string(&Attr::Set(b)).unwrap()
    );
}

/// Test: hash is stable across calls
#[test]
fn test_hash_is_deterministic() {
    let value = Attr::block(MapBuilder::new().set("bus", "virtio").build());
    assert_eq!(hash_attr(&value), hash_attr(&value.clone()));
    assert_ne!(hash_attr(&value), hash_attr(&Attr::from("virtio")));
}

/// Test: strings() accepts both lists and sets
#[test]
fn test_strings_from_list_or_set() {
    let mut map = AttrMap::new();
    map.insert("searches".into(), Attr::string_list(["a.local", "b.local"]));
    map.insert("modes".into(), Attr::string_set(["ReadWriteOnce"]));
    let fields = Fields::new(&map);
    assert_eq!(fields.strings("searches").unwrap(), ["a.local", "b.local"]);
    assert_eq!(fields.strings("modes").unwrap(), ["ReadWriteOnce"]);
}

/// Test: builder skips absent and empty values
#[test]
fn test_map_builder_skips_absent() {
    let map = MapBuilder::new()
        .str("name", Some("boot"))
        .str("serial", Some(""))
        .str("model", None)
        .int::<i64>("boot_order", None)
        .bool("read_only", Some(false))
        .blocks("ports", Vec::new())
        .block("disk", Some(AttrMap::new()))
        .build();
    assert_eq!(
        serde_json::to_value(Attr::Map(map)).unwrap(),
        json!({"name": "boot", "read_only": false, "disk": [{}]})
    );
}

/// Test: normalize drops zero leaves but keeps present-but-empty blocks
#[test]
fn test_normalize() {
    let map = attrs(json!({
        "name": "vm",
        "hostname": "",
        "labels": {},
        "resources": [{"over_commit_guest_overhead": false}],
        "firmware": [{"bootloader": [{"bios": [{}]}]}],
        "disk": []
    }));
    let normalized = normalize(&map);
    assert_eq!(
        serde_json::to_value(Attr::Map(normalized)).unwrap(),
        json!({
            "name": "vm",
            "resources": [{}],
            "firmware": [{"bootloader": [{"bios": [{}]}]}]
        })
    );
}
