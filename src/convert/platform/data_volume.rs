//! Data volume mapping
//!
//! The transport side wraps a data volume in an add-volume entity carrying the
//! hotplug options used to attach it to a VM. The platform `DataVolume` has no
//! place for those options, so they are passed separately when going back.

use super::metadata::{metadata_to_platform, metadata_to_transport};
use super::scheduling::{label_selector_to_platform, label_selector_to_transport};
use super::{map_list, non_empty, required};
use crate::codec::{from_quantity_map, to_quantity_map};
use crate::crd::data_volume::*;
use crate::error::{ConvertError, Result, ResultExt};
use crate::transport::data_volume::*;
use crate::transport::Marker;
use crate::union;
use k8s_openapi::api::core::v1::{PersistentVolumeClaimSpec, VolumeResourceRequirements};
use tracing::debug;

/// Build a platform `DataVolume` from a transport add-volume entity
pub fn data_volume_to_platform(entity: &VmAddVolumeEntity) -> Result<DataVolume> {
    let template = entity
        .data_volume_template
        .as_ref()
        .ok_or_else(|| ConvertError::MissingField("dataVolumeTemplate".to_string()))?;
    let converted = template_to_platform(template)?;

    debug!(
        name = ?converted.metadata.as_ref().and_then(|m| m.name.as_deref()),
        "Converted data volume to platform"
    );
    Ok(DataVolume {
        metadata: converted.metadata.unwrap_or_default(),
        spec: converted.spec,
        status: template
            .status
            .as_ref()
            .map(|s| DataVolumeStatus {
                phase: s.phase.clone(),
                progress: s.progress.clone(),
                restart_count: s.restart_count,
            }),
    })
}

/// Wrap a platform `DataVolume` in a transport add-volume entity
///
/// The result is always persisted: hotplugged volumes are written back to the
/// VM spec rather than attached only to the running instance.
pub fn data_volume_to_transport(
    dv: &DataVolume,
    options: Option<VmAddVolumeOptions>,
) -> Result<VmAddVolumeEntity> {
    let template = template_to_transport(&DataVolumeTemplateSpec {
        metadata: Some(dv.metadata.clone()),
        spec: dv.spec.clone(),
    })?;

    Ok(VmAddVolumeEntity {
        add_volume_options: options,
        data_volume_template: Some(VmDataVolumeTemplateSpec {
            status: dv.status.as_ref().map(|s| VmDataVolumeStatus {
                phase: s.phase.clone(),
                progress: s.progress.clone(),
                restart_count: s.restart_count,
            }),
            ..template
        }),
        persist: Some(true),
    })
}

pub fn template_to_platform(template: &VmDataVolumeTemplateSpec) -> Result<DataVolumeTemplateSpec> {
    Ok(DataVolumeTemplateSpec {
        metadata: template
            .metadata
            .as_ref()
            .map(metadata_to_platform)
            .transpose()
            .for_field("metadata")?,
        spec: spec_to_platform(
            template
                .spec
                .as_ref()
                .ok_or_else(|| ConvertError::MissingField("spec".to_string()))?,
        )
        .for_field("spec")?,
    })
}

pub fn template_to_transport(template: &DataVolumeTemplateSpec) -> Result<VmDataVolumeTemplateSpec> {
    Ok(VmDataVolumeTemplateSpec {
        metadata: template
            .metadata
            .as_ref()
            .map(metadata_to_transport)
            .transpose()
            .for_field("metadata")?,
        spec: Some(spec_to_transport(&template.spec).for_field("spec")?),
        status: None,
    })
}

fn spec_to_platform(spec: &VmDataVolumeSpec) -> Result<DataVolumeSpec> {
    Ok(DataVolumeSpec {
        source: spec
            .source
            .as_ref()
            .map(source_to_platform)
            .transpose()
            .for_field("source")?
            .flatten(),
        pvc: spec
            .pvc
            .as_ref()
            .map(pvc_to_platform)
            .transpose()
            .for_field("pvc")?,
        storage: spec
            .storage
            .as_ref()
            .map(storage_to_platform)
            .transpose()
            .for_field("storage")?,
        content_type: spec
            .content_type
            .as_deref()
            .map(DataVolumeContentType::parse)
            .transpose()?,
        checkpoints: non_empty(&map_list("checkpoints", &spec.checkpoints, |c| {
            Ok(DataVolumeCheckpoint {
                previous: required(&c.previous, "previous")?,
                current: required(&c.current, "current")?,
            })
        })?),
        final_checkpoint: spec.final_checkpoint,
        preallocation: spec.preallocation,
        priority_class_name: spec.priority_class_name.clone(),
    })
}

fn spec_to_transport(spec: &DataVolumeSpec) -> Result<VmDataVolumeSpec> {
    Ok(VmDataVolumeSpec {
        source: spec
            .source
            .as_ref()
            .map(source_to_transport)
            .transpose()
            .for_field("source")?,
        pvc: spec.pvc.as_ref().map(pvc_to_transport),
        storage: spec.storage.as_ref().map(storage_to_transport),
        content_type: spec.content_type.map(|c| c.to_string()),
        checkpoints: spec
            .checkpoints
            .iter()
            .flatten()
            .map(|c| VmDataVolumeCheckpoint {
                previous: Some(c.previous.clone()),
                current: Some(c.current.clone()),
            })
            .collect(),
        final_checkpoint: spec.final_checkpoint,
        preallocation: spec.preallocation,
        priority_class_name: spec.priority_class_name.clone(),
    })
}

fn source_to_platform(source: &VmDataVolumeSource) -> Result<Option<DataVolumeSource>> {
    union::map_variant(
        "source",
        [
            (
                "http",
                source.http.as_ref().map(|http| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        http: Some(DataVolumeSourceHttp {
                            url: required(&http.url, "url")?,
                            secret_ref: http.secret_ref.clone(),
                            cert_config_map: http.cert_config_map.clone(),
                            extra_headers: non_empty(&http.extra_headers),
                            secret_extra_headers: non_empty(&http.secret_extra_headers),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "s3",
                source.s3.as_ref().map(|s3| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        s3: Some(DataVolumeSourceS3 {
                            url: required(&s3.url, "url")?,
                            secret_ref: s3.secret_ref.clone(),
                            cert_config_map: s3.cert_config_map.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "registry",
                source.registry.as_ref().map(|reg| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        registry: Some(DataVolumeSourceRegistry {
                            url: reg.url.clone(),
                            image_stream: reg.image_stream.clone(),
                            pull_method: reg
                                .pull_method
                                .as_deref()
                                .map(RegistryPullMethod::parse)
                                .transpose()?,
                            secret_ref: reg.secret_ref.clone(),
                            cert_config_map: reg.cert_config_map.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "pvc",
                source.pvc.as_ref().map(|pvc| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        pvc: Some(DataVolumeSourcePvc {
                            namespace: required(&pvc.namespace, "namespace")?,
                            name: required(&pvc.name, "name")?,
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "blank",
                source.blank.as_ref().map(|_| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        blank: Some(DataVolumeBlankImage {}),
                        ..Default::default()
                    })
                }),
            ),
            (
                "imageio",
                source.imageio.as_ref().map(|io| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        imageio: Some(DataVolumeSourceImageIo {
                            url: required(&io.url, "url")?,
                            disk_id: required(&io.disk_id, "diskId")?,
                            secret_ref: io.secret_ref.clone(),
                            cert_config_map: io.cert_config_map.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "vddk",
                source.vddk.as_ref().map(|vddk| -> Result<DataVolumeSource> {
                    Ok(DataVolumeSource {
                        vddk: Some(DataVolumeSourceVddk {
                            url: vddk.url.clone(),
                            uuid: vddk.uuid.clone(),
                            backing_file: vddk.backing_file.clone(),
                            thumbprint: vddk.thumbprint.clone(),
                            secret_ref: vddk.secret_ref.clone(),
                            init_image_url: vddk.init_image_url.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
        ],
    )
}

fn source_to_transport(source: &DataVolumeSource) -> Result<VmDataVolumeSource> {
    union::variant(
        "source",
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

    Ok(VmDataVolumeSource {
        http: source.http.as_ref().map(|http| VmDataVolumeSourceHttp {
            url: Some(http.url.clone()),
            secret_ref: http.secret_ref.clone(),
            cert_config_map: http.cert_config_map.clone(),
            extra_headers: http.extra_headers.clone().unwrap_or_default(),
            secret_extra_headers: http.secret_extra_headers.clone().unwrap_or_default(),
        }),
        s3: source.s3.as_ref().map(|s3| VmDataVolumeSourceS3 {
            url: Some(s3.url.clone()),
            secret_ref: s3.secret_ref.clone(),
            cert_config_map: s3.cert_config_map.clone(),
        }),
        registry: source.registry.as_ref().map(|reg| VmDataVolumeSourceRegistry {
            url: reg.url.clone(),
            image_stream: reg.image_stream.clone(),
            pull_method: reg.pull_method.map(|m| m.to_string()),
            secret_ref: reg.secret_ref.clone(),
            cert_config_map: reg.cert_config_map.clone(),
        }),
        pvc: source.pvc.as_ref().map(|pvc| VmDataVolumeSourcePvc {
            namespace: Some(pvc.namespace.clone()),
            name: Some(pvc.name.clone()),
        }),
        blank: source.blank.as_ref().map(|_| Marker {}),
        imageio: source.imageio.as_ref().map(|io| VmDataVolumeSourceImageIo {
            url: Some(io.url.clone()),
            disk_id: Some(io.disk_id.clone()),
            secret_ref: io.secret_ref.clone(),
            cert_config_map: io.cert_config_map.clone(),
        }),
        vddk: source.vddk.as_ref().map(|vddk| VmDataVolumeSourceVddk {
            url: vddk.url.clone(),
            uuid: vddk.uuid.clone(),
            backing_file: vddk.backing_file.clone(),
            thumbprint: vddk.thumbprint.clone(),
            secret_ref: vddk.secret_ref.clone(),
            init_image_url: vddk.init_image_url.clone(),
        }),
    })
}

fn resources_to_platform(resources: &VmStorageResources) -> Result<VolumeResourceRequirements> {
    Ok(VolumeResourceRequirements {
        requests: (!resources.requests.is_empty())
            .then(|| to_quantity_map(&resources.requests))
            .transpose()
            .for_field("requests")?,
        limits: (!resources.limits.is_empty())
            .then(|| to_quantity_map(&resources.limits))
            .transpose()
            .for_field("limits")?,
    })
}

fn resources_to_transport(resources: &VolumeResourceRequirements) -> VmStorageResources {
    VmStorageResources {
        requests: resources.requests.as_ref().map(from_quantity_map).unwrap_or_default(),
        limits: resources.limits.as_ref().map(from_quantity_map).unwrap_or_default(),
    }
}

fn pvc_to_platform(spec: &VmStorageSpec) -> Result<PersistentVolumeClaimSpec> {
    Ok(PersistentVolumeClaimSpec {
        access_modes: non_empty(&spec.access_modes),
        selector: spec
            .selector
            .as_ref()
            .map(label_selector_to_platform)
            .transpose()
            .for_field("selector")?,
        resources: spec
            .resources
            .as_ref()
            .map(resources_to_platform)
            .transpose()
            .for_field("resources")?,
        volume_name: spec.volume_name.clone(),
        storage_class_name: spec.storage_class_name.clone(),
        volume_mode: spec.volume_mode.clone(),
        ..Default::default()
    })
}

fn pvc_to_transport(spec: &PersistentVolumeClaimSpec) -> VmStorageSpec {
    VmStorageSpec {
        access_modes: spec.access_modes.clone().unwrap_or_default(),
        selector: spec.selector.as_ref().map(label_selector_to_transport),
        resources: spec.resources.as_ref().map(resources_to_transport),
        volume_name: spec.volume_name.clone(),
        storage_class_name: spec.storage_class_name.clone(),
        volume_mode: spec.volume_mode.clone(),
    }
}

fn storage_to_platform(spec: &VmStorageSpec) -> Result<StorageSpec> {
    Ok(StorageSpec {
        access_modes: non_empty(&spec.access_modes),
        selector: spec
            .selector
            .as_ref()
            .map(label_selector_to_platform)
            .transpose()
            .for_field("selector")?,
        resources: spec
            .resources
            .as_ref()
            .map(resources_to_platform)
            .transpose()
            .for_field("resources")?,
        volume_name: spec.volume_name.clone(),
        storage_class_name: spec.storage_class_name.clone(),
        volume_mode: spec.volume_mode.clone(),
    })
}

fn storage_to_transport(spec: &StorageSpec) -> VmStorageSpec {
    VmStorageSpec {
        access_modes: spec.access_modes.clone().unwrap_or_default(),
        selector: spec.selector.as_ref().map(label_selector_to_transport),
        resources: spec.resources.as_ref().map(resources_to_transport),
        volume_name: spec.volume_name.clone(),
        storage_class_name: spec.storage_class_name.clone(),
        volume_mode: spec.volume_mode.clone(),
    }
}
