//! JSON bridge between structurally identical types
//!
//! Serializes the source with `serde_json` and deserializes it as the target.
//! Only valid where both sides share camelCase field names; everywhere else the
//! explicit mappers in [`super::platform`] are used.
//!
//! Unlike a bare serialize/deserialize pair, [`bridge`] re-serializes the
//! target and fails with [`ConvertError::BridgeDrift`] if any populated source
//! field did not survive. A renamed or missing field on one side therefore
//! surfaces as an error instead of silent data loss.

use crate::error::{ConvertError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Convert `source` into `T` through JSON, rejecting dropped fields
pub fn bridge<S, T>(what: &str, source: &S) -> Result<T>
where
    S: Serialize,
    T: Serialize + DeserializeOwned,
{
    let encoded = serde_json::to_value(source).map_err(|e| ConvertError::Marshal {
        what: what.to_string(),
        source: e,
    })?;
    let target: T =
        serde_json::from_value(encoded.clone()).map_err(|e| ConvertError::Unmarshal {
            what: what.to_string(),
            source: e,
        })?;
    let round_tripped = serde_json::to_value(&target).map_err(|e| ConvertError::Marshal {
        what: what.to_string(),
        source: e,
    })?;

    if let Some(path) = first_dropped_path(&encoded, &round_tripped, String::new()) {
        return Err(ConvertError::BridgeDrift {
            what: what.to_string(),
            path,
        });
    }
    Ok(target)
}

/// JSON path of the first populated value in `source` missing from `target`
///
/// Nulls count as absent. Only presence is compared: a timestamp that comes
/// back reformatted is not drift.
pub fn first_dropped_path(source: &Value, target: &Value, path: String) -> Option<String> {
    match (source, target) {
        (Value::Null, _) => None,
        (Value::Object(src), Value::Object(dst)) => src.iter().find_map(|(key, value)| {
            let child = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            match dst.get(key) {
                _ if value.is_null() => None,
                None | Some(Value::Null) => Some(child),
                Some(found) => first_dropped_path(value, found, child),
            }
        }),
        (Value::Array(src), Value::Array(dst)) => {
            src.iter().enumerate().find_map(|(index, value)| {
                let child = format!("{path}[{index}]");
                match dst.get(index) {
                    _ if value.is_null() => None,
                    None | Some(Value::Null) => Some(child),
                    Some(found) => first_dropped_path(value, found, child),
                }
            })
        }
        (Value::Object(_) | Value::Array(_), _) => Some(path),
        _ => None,
    }
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;
