//! Declarative state handle
//!
//! [`ResourceData`] is the persisted desired/actual state of one resource.
//! Transcoders never write to it directly: they stage every attribute in a
//! [`StagedState`] and commit once the whole object has converted, so a
//! failed conversion leaves the handle exactly as it was.

use crate::error::{ConvertError, StateError};
use crate::state::attr::{map_from_json, Attr, AttrMap, Fields};
use std::collections::BTreeSet;
use tracing::debug;

/// Read access to declarative state
pub trait StateReader {
    fn fields(&self) -> Fields<'_>;
}

/// Write access to declarative state
pub trait StateWriter {
    fn set(&mut self, key: &str, value: Attr) -> Result<(), StateError>;
}

/// In-memory declarative state for one resource
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceData {
    id: Option<String>,
    attrs: AttrMap,
    /// Top-level keys accepted by `set`; `None` accepts any key
    schema: Option<BTreeSet<String>>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict writes to the given top-level keys
    pub fn with_schema<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_attrs(attrs: AttrMap) -> Self {
        Self {
            attrs,
            ..Self::default()
        }
    }

    /// Load state from its JSON form
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConvertError> {
        match value {
            serde_json::Value::Object(object) => Ok(Self::from_attrs(map_from_json(object)?)),
            _ => Err(ConvertError::TypeMismatch {
                field: "state".to_string(),
                expected: "object",
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        Attr::Map(self.attrs.clone()).to_json()
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub fn get(&self, key: &str) -> Option<&Attr> {
        self.attrs.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }
}

impl StateReader for ResourceData {
    fn fields(&self) -> Fields<'_> {
        Fields::new(&self.attrs)
    }
}

impl StateWriter for ResourceData {
    fn set(&mut self, key: &str, value: Attr) -> Result<(), StateError> {
        if let Some(schema) = &self.schema {
            if !schema.contains(key) {
                return Err(StateError::UnknownKey(key.to_string()));
            }
        }
        self.attrs.insert(key.to_string(), value);
        Ok(())
    }
}

/// Attribute writes accumulated until the enclosing conversion succeeds
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagedState {
    writes: Vec<(String, Attr)>,
}

impl StagedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, key: &str, value: Attr) {
        self.writes.push((key.to_string(), value));
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every staged write to `target` in order
    pub fn commit<W: StateWriter + ?Sized>(self, target: &mut W) -> Result<(), ConvertError> {
        debug!(writes = self.writes.len(), "Committing staged state");
        for (key, value) in self.writes {
            target.set(&key, value)?;
        }
        Ok(())
    }
}

impl StateWriter for StagedState {
    fn set(&mut self, key: &str, value: Attr) -> Result<(), StateError> {
        self.stage(key, value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "resource_data_test.rs"]
mod tests;
