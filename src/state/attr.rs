//! Attribute values of the declarative model
//!
//! The declarative model is a schema-validated tree of attributes. Nested
//! structures are encoded as a list holding zero or one map:
//!
//! - absent: `[]` (or the key is missing)
//! - present but empty: `[{}]`
//! - present: `[{ "cores": 4 }]`
//!
//! Sets are unordered and deduplicated by an FNV-1a hash of each element's
//! canonical JSON form, so the same set always serializes the same way.

use crate::error::{ConvertError, Result};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;

/// Map of attribute name to value
pub type AttrMap = BTreeMap<String, Attr>;

static EMPTY_MAP: AttrMap = BTreeMap::new();

/// A single declarative attribute value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attr {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Attr>),
    Set(AttrSet),
    Map(AttrMap),
}

impl Attr {
    /// One-element list holding `map`: the encoding of a present substructure
    pub fn block(map: AttrMap) -> Attr {
        Attr::List(vec![Attr::Map(map)])
    }

    pub fn blocks(maps: Vec<AttrMap>) -> Attr {
        Attr::List(maps.into_iter().map(Attr::Map).collect())
    }

    pub fn string_map(values: &BTreeMap<String, String>) -> Attr {
        Attr::Map(
            values
                .iter()
                .map(|(k, v)| (k.clone(), Attr::Str(v.clone())))
                .collect(),
        )
    }

    pub fn string_list<I, S>(values: I) -> Attr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attr::List(values.into_iter().map(|s| Attr::Str(s.into())).collect())
    }

    pub fn string_set<I, S>(values: I) -> Attr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attr::Set(values.into_iter().map(|s| Attr::Str(s.into())).collect())
    }

    /// True for the zero value of each type
    pub fn is_zero(&self) -> bool {
        match self {
            Attr::Bool(b) => !b,
            Attr::Int(n) => *n == 0,
            Attr::Str(s) => s.is_empty(),
            Attr::List(items) => items.is_empty(),
            Attr::Set(set) => set.is_empty(),
            Attr::Map(map) => map.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Attr::Bool(_) => "bool",
            Attr::Int(_) => "int",
            Attr::Str(_) => "string",
            Attr::List(_) => "list",
            Attr::Set(_) => "set",
            Attr::Map(_) => "map",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Attr::Bool(b) => Value::Bool(*b),
            Attr::Int(n) => Value::from(*n),
            Attr::Str(s) => Value::String(s.clone()),
            Attr::List(items) => Value::Array(items.iter().map(Attr::to_json).collect()),
            Attr::Set(set) => Value::Array(set.iter().map(Attr::to_json).collect()),
            Attr::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Build an attribute from JSON; `null` means absent
    pub fn from_json(field: &str, value: serde_json::Value) -> Result<Option<Attr>> {
        use serde_json::Value;
        let attr = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => Attr::Bool(b),
            Value::Number(n) => Attr::Int(n.as_i64().ok_or_else(|| ConvertError::TypeMismatch {
                field: field.to_string(),
                expected: "64-bit integer",
            })?),
            Value::String(s) => Attr::Str(s),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(attr) = Attr::from_json(field, item)? {
                        list.push(attr);
                    }
                }
                Attr::List(list)
            }
            Value::Object(object) => Attr::Map(map_from_json(object)?),
        };
        Ok(Some(attr))
    }
}

/// Build an attribute map from a JSON object, dropping `null` members
pub fn map_from_json(object: serde_json::Map<String, serde_json::Value>) -> Result<AttrMap> {
    let mut map = AttrMap::new();
    for (key, value) in object {
        if let Some(attr) = Attr::from_json(&key, value)? {
            map.insert(key, attr);
        }
    }
    Ok(map)
}

impl Serialize for Attr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Attr::Bool(b) => serializer.serialize_bool(*b),
            Attr::Int(n) => serializer.serialize_i64(*n),
            Attr::Str(s) => serializer.serialize_str(s),
            Attr::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Attr::Set(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for item in set.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Attr::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Attr::Bool(value)
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Attr::Int(value)
    }
}

impl From<i32> for Attr {
    fn from(value: i32) -> Self {
        Attr::Int(i64::from(value))
    }
}

impl From<u32> for Attr {
    fn from(value: u32) -> Self {
        Attr::Int(i64::from(value))
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::Str(value.to_string())
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::Str(value)
    }
}

impl From<AttrMap> for Attr {
    fn from(value: AttrMap) -> Self {
        Attr::Map(value)
    }
}

/// Unordered, deduplicated collection of attributes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrSet {
    /// Kept sorted by hash so equal sets compare and serialize identically
    items: Vec<(u64, Attr)>,
}

impl AttrSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`; returns false if an equal element was already present
    pub fn insert(&mut self, value: Attr) -> bool {
        let hash = hash_attr(&value);
        let start = self.items.partition_point(|(h, _)| *h < hash);
        let mut idx = start;
        while idx < self.items.len() && self.items[idx].0 == hash {
            if self.items[idx].1 == value {
                return false;
            }
            idx += 1;
        }
        self.items.insert(idx, (hash, value));
        true
    }

    pub fn contains(&self, value: &Attr) -> bool {
        let hash = hash_attr(value);
        self.items
            .iter()
            .any(|(h, item)| *h == hash && item == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.items.iter().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Attr> for AttrSet {
    fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> Self {
        let mut set = AttrSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// FNV-1a hash of an attribute's canonical JSON text
///
/// Deterministic across processes, unlike `DefaultHasher`.
pub fn hash_attr(value: &Attr) -> u64 {
    let canonical = value.to_json().to_string();
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in canonical.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Read-only typed view over an attribute map
///
/// Getters return `Ok(None)` when a key is missing and a type-mismatch error
/// when it holds the wrong kind of value.
#[derive(Clone, Copy, Debug)]
pub struct Fields<'a> {
    map: &'a AttrMap,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a AttrMap) -> Self {
        Self { map }
    }

    pub fn empty() -> Fields<'static> {
        Fields { map: &EMPTY_MAP }
    }

    pub fn map(&self) -> &'a AttrMap {
        self.map
    }

    pub fn get(&self, key: &str) -> Option<&'a Attr> {
        self.map.get(key)
    }

    /// True if `key` holds a non-zero value
    pub fn has(&self, key: &str) -> bool {
        self.map.get(key).is_some_and(|v| !v.is_zero())
    }

    /// String value; empty strings read as absent
    pub fn str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Attr::Str(s)) if s.is_empty() => Ok(None),
            Some(Attr::Str(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(mismatch(key, "string")),
        }
    }

    pub fn string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.str(key)?.map(str::to_string))
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Attr::Int(n)) => Ok(Some(*n)),
            Some(_) => Err(mismatch(key, "int")),
        }
    }

    /// Integer value; zero reads as absent
    pub fn int_ok(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.int(key)?.filter(|n| *n != 0))
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Attr::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(mismatch(key, "bool")),
        }
    }

    pub fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        match self.map.get(key) {
            None => Ok(BTreeMap::new()),
            Some(Attr::Map(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Attr::Str(s) => Ok((k.clone(), s.clone())),
                    _ => Err(mismatch(&format!("{key}.{k}"), "string")),
                })
                .collect(),
            Some(_) => Err(mismatch(key, "map of strings")),
        }
    }

    /// Strings from a list or set attribute
    pub fn strings(&self, key: &str) -> Result<Vec<String>> {
        let items: Vec<&Attr> = match self.map.get(key) {
            None => return Ok(Vec::new()),
            Some(Attr::List(items)) => items.iter().collect(),
            Some(Attr::Set(set)) => set.iter().collect(),
            Some(_) => return Err(mismatch(key, "list of strings")),
        };
        items
            .into_iter()
            .map(|item| match item {
                Attr::Str(s) => Ok(s.clone()),
                _ => Err(mismatch(key, "list of strings")),
            })
            .collect()
    }

    /// Every map element of a list or set attribute
    pub fn blocks(&self, key: &str) -> Result<Vec<Fields<'a>>> {
        let items: Vec<&'a Attr> = match self.map.get(key) {
            None => return Ok(Vec::new()),
            Some(Attr::List(items)) => items.iter().collect(),
            Some(Attr::Set(set)) => set.iter().collect(),
            Some(_) => return Err(mismatch(key, "list of blocks")),
        };
        items
            .into_iter()
            .map(|item| match item {
                Attr::Map(map) => Ok(Fields::new(map)),
                _ => Err(mismatch(key, "list of blocks")),
            })
            .collect()
    }

    /// The single element of a nested block, if present
    pub fn block(&self, key: &str) -> Result<Option<Fields<'a>>> {
        Ok(self.blocks(key)?.into_iter().next())
    }
}

fn mismatch(field: &str, expected: &'static str) -> ConvertError {
    ConvertError::TypeMismatch {
        field: field.to_string(),
        expected,
    }
}

/// Builds an attribute map, skipping absent values
#[derive(Clone, Debug, Default)]
pub struct MapBuilder {
    map: AttrMap,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Attr>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    /// Set a string; `None` and empty strings are skipped
    pub fn str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.set(key, v),
            _ => self,
        }
    }

    pub fn int<T: Into<i64>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(key, Attr::Int(v.into())),
            None => self,
        }
    }

    pub fn bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn block(self, key: &str, value: Option<AttrMap>) -> Self {
        match value {
            Some(map) => self.set(key, Attr::block(map)),
            None => self,
        }
    }

    pub fn blocks(self, key: &str, values: Vec<AttrMap>) -> Self {
        if values.is_empty() {
            return self;
        }
        self.set(key, Attr::blocks(values))
    }

    pub fn string_map(self, key: &str, values: &BTreeMap<String, String>) -> Self {
        if values.is_empty() {
            return self;
        }
        self.set(key, Attr::string_map(values))
    }

    pub fn strings(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.set(key, Attr::string_list(values.iter().cloned()))
    }

    pub fn string_set(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.set(key, Attr::string_set(values.iter().cloned()))
    }

    pub fn build(self) -> AttrMap {
        self.map
    }
}

/// Drop zero-valued leaves so absent and default compare equal
///
/// Present-but-empty blocks survive as `[{}]`.
pub fn normalize(map: &AttrMap) -> AttrMap {
    map.iter()
        .filter_map(|(key, value)| normalize_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn normalize_value(value: &Attr) -> Option<Attr> {
    match value {
        Attr::List(items) => {
            let items: Vec<Attr> = items
                .iter()
                .filter_map(|item| match item {
                    Attr::Map(map) => Some(Attr::Map(normalize(map))),
                    other => normalize_value(other),
                })
                .collect();
            (!items.is_empty()).then_some(Attr::List(items))
        }
        Attr::Map(map) => {
            let map = normalize(map);
            (!map.is_empty()).then_some(Attr::Map(map))
        }
        other if other.is_zero() => None,
        other => Some(other.clone()),
    }
}

#[cfg(test)]
#[path = "attr_test.rs"]
mod tests;
