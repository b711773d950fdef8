//! RFC 3339 timestamp codec
//!
//! Transport and declarative models hold timestamps as strings. The platform's
//! `Time` is converted through its serde representation so this module does
//! not depend on which datetime library `k8s-openapi` uses internally.

use crate::error::{ConvertError, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Reject strings that are not RFC 3339 timestamps
pub fn validate_rfc3339(field: &str, value: &str) -> Result<()> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| ConvertError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

pub fn to_k8s_time(field: &str, value: &str) -> Result<Time> {
    validate_rfc3339(field, value)?;
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|source| {
        ConvertError::Unmarshal {
            what: field.to_string(),
            source,
        }
    })
}

pub fn from_k8s_time(field: &str, time: &Time) -> Result<String> {
    match serde_json::to_value(time) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        Ok(_) => Err(ConvertError::TypeMismatch {
            field: field.to_string(),
            expected: "timestamp string",
        }),
        Err(source) => Err(ConvertError::Marshal {
            what: field.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rfc3339() {
        assert!(validate_rfc3339("time", "2024-05-01T10:00:00Z").is_ok());
        assert!(validate_rfc3339("time", "yesterday").is_err());
    }

    #[test]
    fn test_k8s_time_round_trip() {
        let time = to_k8s_time("time", "2024-05-01T10:00:00Z").unwrap();
        assert_eq!(from_k8s_time("time", &time).unwrap(), "2024-05-01T10:00:00Z");
    }
}
