//! Data volume templates, specs, import sources and storage requests

use super::metadata::{expand_metadata, flatten_metadata, MetadataOptions};
use super::scheduling::{expand_label_selector, flatten_label_selector};
use super::{expand_block, expand_blocks, flatten_opt, try_flatten_opt};
use crate::codec::to_quantity_map;
use crate::config::TranscodeConfig;
use crate::crd::data_volume::{DataVolumeContentType, RegistryPullMethod};
use crate::enums::{AccessMode, VolumeMode};
use crate::error::{ConvertError, Result, ResultExt};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::data_volume::*;
use crate::transport::Marker;
use crate::union;

/// Template metadata is named but never defaulted into a namespace
const TEMPLATE_METADATA: MetadataOptions<'static> = MetadataOptions {
    require_name: true,
    default_namespace: None,
};

pub fn expand_template(fields: &Fields<'_>) -> Result<VmDataVolumeTemplateSpec> {
    let metadata = expand_block(fields, "metadata", |meta| {
        expand_metadata(meta, TEMPLATE_METADATA)
    })?
    .ok_or_else(|| ConvertError::MissingField("metadata".to_string()))?;

    Ok(VmDataVolumeTemplateSpec {
        metadata: Some(metadata),
        spec: Some(
            expand_block(fields, "spec", expand_spec)?
                .ok_or_else(|| ConvertError::MissingField("spec".to_string()))?,
        ),
        status: None,
    })
}

pub fn flatten_template(
    template: &VmDataVolumeTemplateSpec,
    config: &TranscodeConfig,
) -> Result<AttrMap> {
    Ok(MapBuilder::new()
        .block(
            "metadata",
            flatten_opt(template.metadata.as_ref(), |meta| {
                flatten_metadata(meta, config, None)
            }),
        )
        .block("spec", try_flatten_opt(template.spec.as_ref(), "spec", flatten_spec)?)
        .build())
}

pub fn expand_spec(fields: &Fields<'_>) -> Result<VmDataVolumeSpec> {
    let content_type = fields.string("content_type")?;
    if let Some(content_type) = &content_type {
        DataVolumeContentType::parse(content_type).for_field("content_type")?;
    }

    Ok(VmDataVolumeSpec {
        source: expand_block(fields, "source", expand_source)?,
        pvc: expand_block(fields, "pvc", expand_storage)?,
        storage: expand_block(fields, "storage", expand_storage)?,
        content_type,
        checkpoints: expand_blocks(fields, "checkpoints", |checkpoint| {
            Ok(VmDataVolumeCheckpoint {
                previous: checkpoint.string("previous")?,
                current: checkpoint.string("current")?,
            })
        })?,
        final_checkpoint: fields.bool("final_checkpoint")?,
        preallocation: fields.bool("preallocation")?,
        priority_class_name: fields.string("priority_class_name")?,
    })
}

pub fn flatten_spec(spec: &VmDataVolumeSpec) -> Result<AttrMap> {
    let checkpoints = spec
        .checkpoints
        .iter()
        .map(|checkpoint| {
            MapBuilder::new()
                .str("previous", checkpoint.previous.as_deref())
                .str("current", checkpoint.current.as_deref())
                .build()
        })
        .collect();

    Ok(MapBuilder::new()
        .block("source", try_flatten_opt(spec.source.as_ref(), "source", flatten_source)?)
        .block("pvc", flatten_opt(spec.pvc.as_ref(), flatten_storage))
        .block("storage", flatten_opt(spec.storage.as_ref(), flatten_storage))
        .str("content_type", spec.content_type.as_deref())
        .blocks("checkpoints", checkpoints)
        .bool("final_checkpoint", spec.final_checkpoint)
        .bool("preallocation", spec.preallocation)
        .str("priority_class_name", spec.priority_class_name.as_deref())
        .build())
}

const SOURCES: [&str; 7] = ["http", "s3", "registry", "pvc", "blank", "imageio", "vddk"];

fn expand_source(fields: &Fields<'_>) -> Result<VmDataVolumeSource> {
    let present = SOURCES
        .iter()
        .map(|name| Ok((*name, fields.block(name)?.is_some())))
        .collect::<Result<Vec<_>>>()?;
    union::variant("data_volume_source", present)?;

    Ok(VmDataVolumeSource {
        http: expand_block(fields, "http", |http| {
            Ok(VmDataVolumeSourceHttp {
                url: http.string("url")?,
                secret_ref: http.string("secret_ref")?,
                cert_config_map: http.string("cert_config_map")?,
                extra_headers: http.strings("extra_headers")?,
                secret_extra_headers: http.strings("secret_extra_headers")?,
            })
        })?,
        s3: expand_block(fields, "s3", |s3| {
            Ok(VmDataVolumeSourceS3 {
                url: s3.string("url")?,
                secret_ref: s3.string("secret_ref")?,
                cert_config_map: s3.string("cert_config_map")?,
            })
        })?,
        registry: expand_block(fields, "registry", |registry| {
            let pull_method = registry.string("pull_method")?;
            if let Some(method) = &pull_method {
                RegistryPullMethod::parse(method).for_field("pull_method")?;
            }
            Ok(VmDataVolumeSourceRegistry {
                url: registry.string("url")?,
                image_stream: registry.string("image_stream")?,
                pull_method,
                secret_ref: registry.string("secret_ref")?,
                cert_config_map: registry.string("cert_config_map")?,
            })
        })?,
        pvc: expand_block(fields, "pvc", |pvc| {
            Ok(VmDataVolumeSourcePvc {
                namespace: pvc.string("namespace")?,
                name: pvc.string("name")?,
            })
        })?,
        blank: fields.block("blank")?.map(|_| Marker {}),
        imageio: expand_block(fields, "imageio", |imageio| {
            Ok(VmDataVolumeSourceImageIo {
                url: imageio.string("url")?,
                disk_id: imageio.string("disk_id")?,
                secret_ref: imageio.string("secret_ref")?,
                cert_config_map: imageio.string("cert_config_map")?,
            })
        })?,
        vddk: expand_block(fields, "vddk", |vddk| {
            Ok(VmDataVolumeSourceVddk {
                url: vddk.string("url")?,
                uuid: vddk.string("uuid")?,
                backing_file: vddk.string("backing_file")?,
                thumbprint: vddk.string("thumbprint")?,
                secret_ref: vddk.string("secret_ref")?,
                init_image_url: vddk.string("init_image_url")?,
            })
        })?,
    })
}

fn flatten_source(source: &VmDataVolumeSource) -> Result<AttrMap> {
    union::variant(
        "data_volume_source",
        [
            ("http", source.http.is_some()),
            ("s3", source.s3.is_some()),
            ("registry", source.registry.is_some()),
            ("pvc", source.pvc.is_some()),
            ("blank", source.blank.is_some()),
            ("imageio", source.imageio.is_some()),
            ("vddk", source.vddk.is_some()),
        ],
    )?;

    Ok(MapBuilder::new()
        .block(
            "http",
            flatten_opt(source.http.as_ref(), |http| {
                MapBuilder::new()
                    .str("url", http.url.as_deref())
                    .str("secret_ref", http.secret_ref.as_deref())
                    .str("cert_config_map", http.cert_config_map.as_deref())
                    .strings("extra_headers", &http.extra_headers)
                    .strings("secret_extra_headers", &http.secret_extra_headers)
                    .build()
            }),
        )
        .block(
            "s3",
            flatten_opt(source.s3.as_ref(), |s3| {
                MapBuilder::new()
                    .str("url", s3.url.as_deref())
                    .str("secret_ref", s3.secret_ref.as_deref())
                    .str("cert_config_map", s3.cert_config_map.as_deref())
                    .build()
            }),
        )
        .block(
            "registry",
            flatten_opt(source.registry.as_ref(), |registry| {
                MapBuilder::new()
                    .str("url", registry.url.as_deref())
                    .str("image_stream", registry.image_stream.as_deref())
                    .str("pull_method", registry.pull_method.as_deref())
                    .str("secret_ref", registry.secret_ref.as_deref())
                    .str("cert_config_map", registry.cert_config_map.as_deref())
                    .build()
            }),
        )
        .block(
            "pvc",
            flatten_opt(source.pvc.as_ref(), |pvc| {
                MapBuilder::new()
                    .str("namespace", pvc.namespace.as_deref())
                    .str("name", pvc.name.as_deref())
                    .build()
            }),
        )
        .block("blank", source.blank.map(|_| AttrMap::new()))
        .block(
            "imageio",
            flatten_opt(source.imageio.as_ref(), |imageio| {
                MapBuilder::new()
                    .str("url", imageio.url.as_deref())
                    .str("disk_id", imageio.disk_id.as_deref())
                    .str("secret_ref", imageio.secret_ref.as_deref())
                    .str("cert_config_map", imageio.cert_config_map.as_deref())
                    .build()
            }),
        )
        .block(
            "vddk",
            flatten_opt(source.vddk.as_ref(), |vddk| {
                MapBuilder::new()
                    .str("url", vddk.url.as_deref())
                    .str("uuid", vddk.uuid.as_deref())
                    .str("backing_file", vddk.backing_file.as_deref())
                    .str("thumbprint", vddk.thumbprint.as_deref())
                    .str("secret_ref", vddk.secret_ref.as_deref())
                    .str("init_image_url", vddk.init_image_url.as_deref())
                    .build()
            }),
        )
        .build())
}

fn expand_storage(fields: &Fields<'_>) -> Result<VmStorageSpec> {
    let access_modes = fields.strings("access_modes")?;
    for mode in &access_modes {
        AccessMode::parse(mode).for_field("access_modes")?;
    }
    let volume_mode = fields.string("volume_mode")?;
    if let Some(mode) = &volume_mode {
        VolumeMode::parse(mode).for_field("volume_mode")?;
    }

    Ok(VmStorageSpec {
        access_modes,
        selector: expand_block(fields, "selector", expand_label_selector)?,
        resources: expand_block(fields, "resources", |resources| {
            let requests = resources.string_map("requests")?;
            let limits = resources.string_map("limits")?;
            to_quantity_map(&requests).for_field("requests")?;
            to_quantity_map(&limits).for_field("limits")?;
            Ok(VmStorageResources { requests, limits })
        })?,
        volume_name: fields.string("volume_name")?,
        storage_class_name: fields.string("storage_class_name")?,
        volume_mode,
    })
}

fn flatten_storage(storage: &VmStorageSpec) -> AttrMap {
    MapBuilder::new()
        .string_set("access_modes", &storage.access_modes)
        .block(
            "selector",
            flatten_opt(storage.selector.as_ref(), flatten_label_selector),
        )
        .block(
            "resources",
            flatten_opt(storage.resources.as_ref(), |resources| {
                MapBuilder::new()
                    .string_map("requests", &resources.requests)
                    .string_map("limits", &resources.limits)
                    .build()
            }),
        )
        .str("volume_name", storage.volume_name.as_deref())
        .str("storage_class_name", storage.storage_class_name.as_deref())
        .str("volume_mode", storage.volume_mode.as_deref())
        .build()
}
