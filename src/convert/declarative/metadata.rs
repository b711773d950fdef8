//! Object metadata
//!
//! The same keys are used for the flat top level of a VM and for the nested
//! `metadata` block of a data volume.

use crate::codec::filter_reserved;
use crate::config::TranscodeConfig;
use crate::error::{ConvertError, Result};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::VmObjectMeta;

/// Options for expanding metadata
#[derive(Clone, Copy, Debug, Default)]
pub struct MetadataOptions<'a> {
    /// Fail with a missing-field error when `name` is absent
    pub require_name: bool,
    /// Namespace used when none is declared
    pub default_namespace: Option<&'a str>,
}

impl<'a> MetadataOptions<'a> {
    /// Top-level objects: named, and placed in the configured namespace
    pub fn top_level(config: &'a TranscodeConfig) -> Self {
        Self {
            require_name: true,
            default_namespace: Some(config.default_namespace()),
        }
    }
}

pub fn expand_metadata(fields: &Fields<'_>, options: MetadataOptions<'_>) -> Result<VmObjectMeta> {
    let name = fields.string("name")?;
    if options.require_name && name.is_none() {
        return Err(ConvertError::MissingField("name".to_string()));
    }

    let namespace = fields
        .string("namespace")?
        .or_else(|| options.default_namespace.map(str::to_string));

    Ok(VmObjectMeta {
        name,
        generate_name: fields.string("generate_name")?,
        namespace,
        labels: fields.string_map("labels")?,
        annotations: fields.string_map("annotations")?,
        resource_version: fields.string("resource_version")?,
        uid: fields.string("uid")?,
        generation: fields.int_ok("generation")?,
        ..Default::default()
    })
}

/// Flatten metadata, dropping reserved annotations
///
/// `default_namespace` fills an absent namespace the same way expansion does.
pub fn flatten_metadata(
    meta: &VmObjectMeta,
    config: &TranscodeConfig,
    default_namespace: Option<&str>,
) -> AttrMap {
    let namespace = meta.namespace.as_deref().or(default_namespace);
    MapBuilder::new()
        .str("name", meta.name.as_deref())
        .str("generate_name", meta.generate_name.as_deref())
        .str("namespace", namespace)
        .string_map("labels", &meta.labels)
        .string_map("annotations", &filter_reserved(&meta.annotations, config))
        .str("resource_version", meta.resource_version.as_deref())
        .str("uid", meta.uid.as_deref())
        .int("generation", meta.generation)
        .build()
}
