//! Transcoder configuration
//!
//! Holds the values that used to be hardcoded literals: the annotation prefixes
//! reserved for the platform and the namespace assumed when metadata has none.
//! Defaults match upstream KubeVirt; environment variables override them.

/// Annotation prefix owned by the platform, stripped when flattening metadata
pub const DEFAULT_RESERVED_ANNOTATION_PREFIX: &str = "kubevirt.io/";

/// Namespace written to the declarative model when metadata carries none
pub const DEFAULT_NAMESPACE: &str = "default";

/// Env var holding a comma-separated list of reserved annotation prefixes
pub const ENV_RESERVED_ANNOTATION_PREFIXES: &str = "VMTRANSCODE_RESERVED_ANNOTATION_PREFIXES";

/// Env var overriding the default namespace
pub const ENV_DEFAULT_NAMESPACE: &str = "VMTRANSCODE_DEFAULT_NAMESPACE";

/// Settings shared by every transcoder that touches object metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscodeConfig {
    reserved_annotation_prefixes: Vec<String>,
    default_namespace: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            reserved_annotation_prefixes: vec![DEFAULT_RESERVED_ANNOTATION_PREFIX.to_string()],
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl TranscodeConfig {
    /// Build a config from the process environment
    ///
    /// Unset or blank variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by `from_env` and tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RESERVED_ANNOTATION_PREFIXES) {
            let prefixes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !prefixes.is_empty() {
                config.reserved_annotation_prefixes = prefixes;
            }
        }

        if let Some(ns) = lookup(ENV_DEFAULT_NAMESPACE) {
            let ns = ns.trim();
            if !ns.is_empty() {
                config.default_namespace = ns.to_string();
            }
        }

        config
    }

    pub fn with_reserved_annotation_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_annotation_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    pub fn reserved_annotation_prefixes(&self) -> &[String] {
        &self.reserved_annotation_prefixes
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// True if the annotation key belongs to the platform
    pub fn is_reserved_annotation(&self, key: &str) -> bool {
        self.reserved_annotation_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TranscodeConfig::default();
        assert_eq!(config.default_namespace(), "default");
        assert_eq!(config.reserved_annotation_prefixes(), ["kubevirt.io/"]);
        assert!(config.is_reserved_annotation("kubevirt.io/latest-observed-api-version"));
        assert!(!config.is_reserved_annotation("team"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = TranscodeConfig::from_lookup(lookup(&[
            (ENV_RESERVED_ANNOTATION_PREFIXES, "kubevirt.io/, cdi.kubevirt.io/ ,"),
            (ENV_DEFAULT_NAMESPACE, "vms"),
        ]));
        assert_eq!(
            config.reserved_annotation_prefixes(),
            ["kubevirt.io/", "cdi.kubevirt.io/"]
        );
        assert_eq!(config.default_namespace(), "vms");
    }

    #[test]
    fn test_from_lookup_blank_values_keep_defaults() {
        let config = TranscodeConfig::from_lookup(lookup(&[
            (ENV_RESERVED_ANNOTATION_PREFIXES, " , "),
            (ENV_DEFAULT_NAMESPACE, "  "),
        ]));
        assert_eq!(config, TranscodeConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = TranscodeConfig::default()
            .with_reserved_annotation_prefixes(["example.com/"])
            .with_default_namespace("tenant-a");
        assert!(config.is_reserved_annotation("example.com/owner"));
        assert!(!config.is_reserved_annotation("kubevirt.io/owner"));
        assert_eq!(config.default_namespace(), "tenant-a");
    }
}
