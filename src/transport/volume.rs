//! Volumes and networks
//!
//! The vendor schema flattens the volume source union onto the volume itself,
//! the same way the platform does.

use super::domain::Marker;
use serde::{Deserialize, Serialize};

/// A volume; exactly one source field is set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmVolume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_volume: Option<VmDataVolumeRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_disk: Option<VmContainerDisk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init_no_cloud: Option<VmCloudInit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init_config_drive: Option<VmCloudInit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<VmPvcSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_disk: Option<VmEmptyDisk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_disk: Option<VmHostDisk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<VmConfigMapSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<VmEphemeral>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<VmServiceAccount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysprep: Option<VmSysprep>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<VmSecretSource>,

    #[serde(rename = "downwardAPI", skip_serializing_if = "Option::is_none")]
    pub downward_api: Option<VmDownwardApi>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downward_metrics: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_dump: Option<VmPvcSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmLocalObjectReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmDataVolumeRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotpluggable: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmContainerDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmCloudInit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data_secret_ref: Option<VmLocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data_base64: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_data_secret_ref: Option<VmLocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_data_base64: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_data: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmPvcSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotpluggable: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmEmptyDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmHostDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmConfigMapSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_label: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmEphemeral {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<VmClaimReference>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmClaimReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmServiceAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmSysprep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<VmLocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<VmLocalObjectReference>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmSecretSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_label: Option<String>,
}

/// Pod fields exposed to the guest as files
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDownwardApi {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<VmDownwardApiFile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_label: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDownwardApiFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<VmObjectFieldSelector>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_field_ref: Option<VmResourceFieldSelector>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmObjectFieldSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmResourceFieldSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub divisor: Option<String>,
}

/// A network; exactly one of `pod` or `multus` is set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<VmPodNetwork>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multus: Option<VmMultusNetwork>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmPodNetwork {
    #[serde(rename = "vmNetworkCIDR", skip_serializing_if = "Option::is_none")]
    pub vm_network_cidr: Option<String>,

    #[serde(rename = "vmIPv6NetworkCIDR", skip_serializing_if = "Option::is_none")]
    pub vm_ipv6_network_cidr: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmMultusNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}
