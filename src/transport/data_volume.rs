//! Data volume templates and the add-volume request

use super::domain::VmDisk;
use super::metadata::VmObjectMeta;
use super::volume::VmDataVolumeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeTemplateSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VmObjectMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<VmDataVolumeSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VmDataVolumeStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VmDataVolumeSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvc: Option<VmStorageSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<VmStorageSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<VmDataVolumeCheckpoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_checkpoint: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preallocation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_count: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmDataVolumeCheckpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
}

/// Import source; exactly one field is set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmDataVolumeSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<VmDataVolumeSourceHttp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<VmDataVolumeSourceS3>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<VmDataVolumeSourceRegistry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvc: Option<VmDataVolumeSourcePvc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank: Option<super::Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub imageio: Option<VmDataVolumeSourceImageIo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vddk: Option<VmDataVolumeSourceVddk>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSourceHttp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_config_map: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_headers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_extra_headers: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSourceS3 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_config_map: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSourceRegistry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_stream: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_config_map: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmDataVolumeSourcePvc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSourceImageIo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_config_map: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDataVolumeSourceVddk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backing_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(rename = "initImageURL", skip_serializing_if = "Option::is_none")]
    pub init_image_url: Option<String>,
}

/// Storage request, used for both the `pvc` and `storage` fields
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmStorageSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_modes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<super::scheduling::VmLabelSelector>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<VmStorageResources>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_mode: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmStorageResources {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

/// Hotplug a data volume into a running VM
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmAddVolumeEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_volume_options: Option<VmAddVolumeOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_volume_template: Option<VmDataVolumeTemplateSpec>,

    /// Also add the volume to the VM spec, not only the running instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmAddVolumeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<VmDisk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_source: Option<VmHotplugVolumeSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmHotplugVolumeSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_volume: Option<VmDataVolumeRef>,
}
