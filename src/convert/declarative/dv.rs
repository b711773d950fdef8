//! Standalone data volume resource
//!
//! A data volume is hot-plugged into an existing VM named by `vm_name` and
//! `vm_namespace`. Those two keys address the request and are never written
//! back by [`flatten_data_volume`].

use super::data_volume::{expand_spec, flatten_spec};
use super::metadata::{expand_metadata, flatten_metadata, MetadataOptions};
use super::{expand_block, flatten_opt, try_flatten_opt};
use crate::config::TranscodeConfig;
use crate::error::{ConvertError, Result};
use crate::state::{AttrMap, Fields, MapBuilder, StagedState, StateReader, StateWriter};
use crate::transport::data_volume::*;
use crate::transport::domain::{VmDisk, VmDiskTarget};
use crate::transport::volume::VmDataVolumeRef;
use tracing::debug;

/// Top-level keys of the declarative data volume, in staging order
pub const DV_KEYS: &[&str] = &[
    "metadata",
    "spec",
    "status",
    "add_volume_options",
    "vm_name",
    "vm_namespace",
];

/// Name and namespace of the VM a data volume attaches to
pub fn vm_reference<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<(String, String)> {
    let fields = state.fields();
    let name = fields
        .string("vm_name")?
        .ok_or_else(|| ConvertError::MissingField("vm_name".to_string()))?;
    let namespace = fields
        .string("vm_namespace")?
        .unwrap_or_else(|| config.default_namespace().to_string());
    Ok((name, namespace))
}

/// Read a declarative data volume into an add-volume request
pub fn expand_data_volume<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<VmAddVolumeEntity> {
    let fields = state.fields();
    let metadata = expand_block(&fields, "metadata", |meta| {
        expand_metadata(meta, MetadataOptions::top_level(config))
    })?
    .ok_or_else(|| ConvertError::MissingField("metadata".to_string()))?;
    let spec = expand_block(&fields, "spec", expand_spec)?
        .ok_or_else(|| ConvertError::MissingField("spec".to_string()))?;

    let entity = VmAddVolumeEntity {
        add_volume_options: expand_block(&fields, "add_volume_options", expand_options)?,
        data_volume_template: Some(VmDataVolumeTemplateSpec {
            metadata: Some(metadata),
            spec: Some(spec),
            status: expand_block(&fields, "status", |status| {
                Ok(VmDataVolumeStatus {
                    phase: status.string("phase")?,
                    progress: status.string("progress")?,
                    restart_count: None,
                })
            })?,
        }),
        persist: Some(true),
    };

    debug!(
        name = ?entity
            .data_volume_template
            .as_ref()
            .and_then(|t| t.metadata.as_ref())
            .and_then(|m| m.name.as_deref()),
        "Expanded data volume"
    );
    Ok(entity)
}

fn expand_options(fields: &Fields<'_>) -> Result<VmAddVolumeOptions> {
    Ok(VmAddVolumeOptions {
        name: fields.string("name")?,
        disk: expand_block(fields, "disk", |disk| {
            Ok(VmDisk {
                name: disk.string("name")?,
                disk: Some(VmDiskTarget {
                    bus: disk.string("bus")?,
                    ..Default::default()
                }),
                ..Default::default()
            })
        })?,
        volume_source: expand_block(fields, "volume_source", |source| {
            Ok(VmHotplugVolumeSource {
                data_volume: expand_block(source, "data_volume", |dv| {
                    Ok(VmDataVolumeRef {
                        name: dv.string("name")?,
                        hotpluggable: dv.bool("hotpluggable")?,
                    })
                })?,
            })
        })?,
    })
}

fn flatten_options(options: &VmAddVolumeOptions) -> AttrMap {
    MapBuilder::new()
        .str("name", options.name.as_deref())
        .block(
            "disk",
            flatten_opt(options.disk.as_ref(), |disk| {
                MapBuilder::new()
                    .str("name", disk.name.as_deref())
                    .str(
                        "bus",
                        disk.disk.as_ref().and_then(|target| target.bus.as_deref()),
                    )
                    .build()
            }),
        )
        .block(
            "volume_source",
            flatten_opt(options.volume_source.as_ref(), |source| {
                MapBuilder::new()
                    .block(
                        "data_volume",
                        flatten_opt(source.data_volume.as_ref(), |dv| {
                            MapBuilder::new()
                                .str("name", dv.name.as_deref())
                                .bool("hotpluggable", dv.hotpluggable)
                                .build()
                        }),
                    )
                    .build()
            }),
        )
        .build()
}

/// Write an add-volume request into declarative state
///
/// Nothing reaches `state` unless the whole request converts.
pub fn flatten_data_volume<W: StateWriter + ?Sized>(
    entity: &VmAddVolumeEntity,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    let template = entity
        .data_volume_template
        .as_ref()
        .ok_or_else(|| ConvertError::MissingField("dataVolumeTemplate".to_string()))?;

    let mut attrs = MapBuilder::new()
        .block(
            "metadata",
            flatten_opt(template.metadata.as_ref(), |meta| {
                flatten_metadata(meta, config, Some(config.default_namespace()))
            }),
        )
        .block("spec", try_flatten_opt(template.spec.as_ref(), "spec", flatten_spec)?)
        .block(
            "status",
            flatten_opt(template.status.as_ref(), |status| {
                MapBuilder::new()
                    .str("phase", status.phase.as_deref())
                    .str("progress", status.progress.as_deref())
                    .build()
            }),
        )
        .block(
            "add_volume_options",
            flatten_opt(entity.add_volume_options.as_ref(), flatten_options),
        )
        .build();

    let mut staged = StagedState::new();
    for key in DV_KEYS {
        if let Some(value) = attrs.remove(*key) {
            staged.stage(key, value);
        }
    }
    debug!(keys = staged.len(), "Flattened data volume");
    staged.commit(state)
}
