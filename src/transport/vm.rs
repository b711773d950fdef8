//! The cluster virtual machine and its spec and status

use super::data_volume::VmDataVolumeTemplateSpec;
use super::domain::VmDomainSpec;
use super::metadata::VmObjectMeta;
use super::scheduling::{VmAffinity, VmPodDnsConfig, VmProbe, VmToleration};
use super::volume::{VmNetwork, VmVolume};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterVirtualMachine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VmObjectMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<VmSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VmStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<VmTemplateSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_volume_templates: Vec<VmDataVolumeTemplateSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instancetype: Option<VmInstancetypeMatcher>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<VmInstancetypeMatcher>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmInstancetypeMatcher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infer_from_volume: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmTemplateSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VmObjectMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<VmInstanceSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmInstanceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<VmDomainSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<VmAffinity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<VmToleration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VmVolume>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<VmProbe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<VmProbe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<VmNetwork>,

    #[serde(rename = "dnsPolicy", skip_serializing_if = "Option::is_none")]
    pub dns_policy: Option<String>,

    #[serde(rename = "dnsConfig", skip_serializing_if = "Option::is_none")]
    pub dns_config: Option<VmPodDnsConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub printable_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<VmCondition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_change_requests: Vec<VmStateChangeRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_in_progress: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_in_progress: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_failure: Option<VmStartFailure>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_generation: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmCondition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmStateChangeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmStartFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consecutive_fail_count: Option<i32>,

    #[serde(rename = "lastFailedVMIUID", skip_serializing_if = "Option::is_none")]
    pub last_failed_vmi_uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_timestamp: Option<String>,
}
