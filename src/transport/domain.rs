//! Domain, CPU, memory, firmware, features and devices

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Zero-field marker; presence alone selects a union branch
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Marker {}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDomainSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<VmResourceRequirements>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<VmCpu>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<VmMemory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<VmMachine>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<VmFirmware>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<VmFeatures>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<VmClock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis: Option<VmChassis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_security: Option<VmLaunchSecurity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<VmDevices>,
}

/// Requests and limits as plain quantity strings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overcommit_guest_overhead: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmCpu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_cpu_placement: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmMemory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hugepages: Option<VmHugepages>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmHugepages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmMachine {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmFirmware {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootloader: Option<VmBootloader>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmBootloader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bios: Option<VmBios>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub efi: Option<VmEfi>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmBios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_serial: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmEfi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_boot: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acpi: Option<VmFeatureState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apic: Option<VmFeatureApic>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smm: Option<VmFeatureState>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmFeatureState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmFeatureApic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_of_interrupt: Option<bool>,
}

/// Guest clock; `timezone` and `utc` are alternatives
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmClock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc: Option<VmClockUtc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<VmTimer>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmClockUtc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_seconds: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmTimer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hpet: Option<VmTickTimer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kvm: Option<VmTimerState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pit: Option<VmTickTimer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtc: Option<VmRtcTimer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperv: Option<VmTimerState>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmTimerState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmTickTimer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_policy: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmRtcTimer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

/// SMBIOS chassis information
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmChassis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmLaunchSecurity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sev: Option<Marker>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDevices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<VmDisk>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<VmInterface>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<VmGpu>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_devices: Vec<VmHostDevice>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<VmInput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoattach_pod_interface: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoattach_graphics_device: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface_multiqueue: Option<bool>,
}

/// A disk; exactly one of `disk`, `lun` or `cdrom` is set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<VmDiskTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lun: Option<VmLunTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdrom: Option<VmCdRomTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    #[serde(rename = "dedicatedIOThread", skip_serializing_if = "Option::is_none")]
    pub dedicated_io_thread: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmDiskTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci_address: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmLunTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmCdRomTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tray: Option<String>,
}

/// A network interface; exactly one binding marker is set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slirp: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub masquerade: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sriov: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passt: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub macvtap: Option<Marker>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<VmPort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub acpi_index: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmPort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

/// A GPU passed through or mediated from the host
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmGpu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(rename = "virtualGPUOptions", skip_serializing_if = "Option::is_none")]
    pub virtual_gpu_options: Option<VmVgpuOptions>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmVgpuOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<VmVgpuDisplay>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmVgpuDisplay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(rename = "ramFB", skip_serializing_if = "Option::is_none")]
    pub ram_fb: Option<VmFeatureState>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmHostDevice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VmInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
}
