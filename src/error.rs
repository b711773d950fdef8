//! Error types for transcoding between the three VM models
//!
//! Every failure carries enough context to name the field that broke. Composite
//! transcoders wrap inner failures with [`ResultExt::for_field`], which yields
//! messages such as `failed to convert cpu: failed to convert cores: ...`.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Errors raised while converting a VM or data volume between models
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to marshal {what}: {source}")]
    Marshal {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to unmarshal {what}: {source}")]
    Unmarshal {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} value {value} cannot be negative for {target}")]
    Negative {
        field: String,
        value: i128,
        target: &'static str,
    },

    #[error("{field} value {value} is out of range for {target}")]
    OutOfRange {
        field: String,
        value: i128,
        target: &'static str,
    },

    #[error("{0} is required")]
    MissingField(String),

    #[error("invalid {field}: {value} (expected one of {})", .allowed.join(", "))]
    InvalidEnum {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("invalid quantity for {field}: {value:?}")]
    InvalidQuantity { field: String, value: String },

    #[error("invalid timestamp for {field}: {value:?}")]
    InvalidTimestamp { field: String, value: String },

    #[error("invalid base64 in {field}: {source}")]
    Base64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{field} has the wrong type, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("{union} has more than one variant set: {}", .variants.join(", "))]
    AmbiguousUnion {
        union: String,
        variants: Vec<&'static str>,
    },

    #[error("bridging {what} dropped field {path}")]
    BridgeDrift { what: String, path: String },

    #[error("state write failed: {0}")]
    State(#[from] StateError),

    #[error("failed to convert {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Wrap this error with the name of the field being converted
    pub fn in_field(self, field: impl Into<String>) -> Self {
        ConvertError::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any `Field` context wrappers
    pub fn root_cause(&self) -> &ConvertError {
        match self {
            ConvertError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Dotted path of field names from the outermost wrapper inwards
    pub fn field_path(&self) -> String {
        let mut parts = Vec::new();
        let mut current = self;
        while let ConvertError::Field { field, source } = current {
            parts.push(field.as_str());
            current = source;
        }
        parts.join(".")
    }
}

/// Errors raised by a declarative state handle when a write is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("{0} is not a known attribute")]
    UnknownKey(String),

    #[error("failed to set {key}: {reason}")]
    Rejected { key: String, reason: String },
}

/// Adds field context to a `Result<T, ConvertError>`
pub trait ResultExt<T> {
    fn for_field(self, field: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn for_field(self, field: &str) -> Result<T> {
        self.map_err(|e| e.in_field(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_context_message() {
        let err = ConvertError::Negative {
            field: "cores".to_string(),
            value: -1,
            target: "u32",
        }
        .in_field("cores")
        .in_field("cpu");

        assert_eq!(
            err.to_string(),
            "failed to convert cpu: failed to convert cores: cores value -1 cannot be negative for u32"
        );
        assert_eq!(err.field_path(), "cpu.cores");
        assert!(matches!(err.root_cause(), ConvertError::Negative { .. }));
    }

    #[test]
    fn test_for_field_passes_ok_through() {
        let ok: Result<u32> = Ok(4);
        assert_eq!(ok.for_field("cpu").unwrap(), 4);
    }

    #[test]
    fn test_invalid_enum_lists_allowed_values() {
        let err = ConvertError::InvalidEnum {
            field: "volume mode".to_string(),
            value: "Raw".to_string(),
            allowed: &["Block", "Filesystem"],
        };
        assert_eq!(
            err.to_string(),
            "invalid volume mode: Raw (expected one of Block, Filesystem)"
        );
    }
}
