#![allow(clippy::unwrap_used)] // Tests can use unwrap for brevity
#![allow(clippy::expect_used)] // Tests can use expect for better error messages

use super::data_volume::{DataVolumeContentType, RegistryPullMethod};
use super::domain::DiskBus;
use super::virtual_machine::RunStrategy;
use super::volume::{EmptyDiskSource, HostDisk, Volume, VolumeSource};
use super::*;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResourceExt;

/// Test: a KubeVirt VirtualMachine manifest deserializes into the typed resource
#[test]
fn test_virtual_machine_deserialize_from_yaml() {
    let yaml = r#"
apiVersion: kubevirt.io/v1
kind: VirtualMachine
metadata:
  name: web-01
  namespace: apps
spec:
  runStrategy: RerunOnFailure
  template:
    spec:
      domain:
        cpu:
          cores: 2
        devices:
          disks:
            - name: root
              disk:
                bus: scsi
              bootOrder: 1
              dedicatedIOThread: true
      volumes:
        - name: root
          dataVolume:
            name: root-dv
      readinessProbe:
        guestAgentPing: {}
        periodSeconds: 5
status:
  printableStatus: Running
  ready: true
"#;

    let vm: VirtualMachine = serde_yaml::from_str(yaml).expect("Failed to deserialize VirtualMachine");

    assert_eq!(vm.metadata.name.as_deref(), Some("web-01"));
    assert_eq!(vm.spec.run_strategy, Some(RunStrategy::RerunOnFailure));
    assert!(vm.spec.running.is_none());

    let spec = vm.spec.template.spec.as_ref().unwrap();
    let disk = &spec.domain.devices.disks.as_ref().unwrap()[0];
    assert_eq!(disk.device.disk.as_ref().unwrap().bus, Some(DiskBus::Scsi));
    assert_eq!(disk.boot_order, Some(1));
    assert_eq!(disk.dedicated_io_thread, Some(true));

    let volume = &spec.volumes.as_ref().unwrap()[0];
    assert_eq!(volume.name, "root");
    assert_eq!(volume.source.data_volume.as_ref().unwrap().name, "root-dv");

    let probe = spec.readiness_probe.as_ref().unwrap();
    assert!(probe.handler.guest_agent_ping.is_some());
    assert_eq!(probe.period_seconds, Some(5));

    assert_eq!(
        vm.status.as_ref().unwrap().printable_status.as_deref(),
        Some("Running")
    );
}

/// Test: a CDI DataVolume manifest deserializes into the typed resource
#[test]
fn test_data_volume_deserialize_from_yaml() {
    let yaml = r#"
apiVersion: cdi.kubevirt.io/v1beta1
kind: DataVolume
metadata:
  name: fedora
spec:
  contentType: kubevirt
  source:
    registry:
      url: docker://quay.io/containerdisks/fedora:40
      pullMethod: node
  storage:
    accessModes:
      - ReadWriteOnce
    resources:
      requests:
        storage: 20Gi
status:
  phase: ImportInProgress
  progress: "42.0%"
"#;

    let dv: DataVolume = serde_yaml::from_str(yaml).expect("Failed to deserialize DataVolume");

    assert_eq!(dv.metadata.name.as_deref(), Some("fedora"));
    assert_eq!(dv.spec.content_type, Some(DataVolumeContentType::Kubevirt));

    let registry = dv.spec.source.as_ref().unwrap().registry.as_ref().unwrap();
    assert_eq!(registry.pull_method, Some(RegistryPullMethod::Node));

    let storage = dv.spec.storage.as_ref().unwrap();
    assert_eq!(storage.access_modes.as_deref(), Some(&["ReadWriteOnce".to_string()][..]));

    assert_eq!(dv.status.as_ref().unwrap().progress.as_deref(), Some("42.0%"));
}

/// Test: an unknown run strategy fails deserialization
#[test]
fn test_unknown_run_strategy_rejected() {
    let yaml = r#"
apiVersion: kubevirt.io/v1
kind: VirtualMachine
metadata:
  name: bad
spec:
  runStrategy: Sometimes
  template: {}
"#;

    let result: Result<VirtualMachine, _> = serde_yaml::from_str(yaml);
    assert!(result.is_err());
}

/// Test: serialization omits unset optional fields
#[test]
fn test_virtual_machine_serializes_sparse() {
    let vm = VirtualMachine::new(
        "sparse",
        VirtualMachineSpec {
            running: Some(false),
            ..Default::default()
        },
    );

    let json = serde_json::to_value(&vm).unwrap();

    assert_eq!(json["apiVersion"], "kubevirt.io/v1");
    assert_eq!(json["kind"], "VirtualMachine");
    assert_eq!(json["spec"]["running"], false);
    assert!(json["spec"].get("runStrategy").is_none());
    assert!(json["spec"].get("dataVolumeTemplates").is_none());
    assert!(json.get("status").is_none());
}

/// Test: the generated CRDs carry the KubeVirt and CDI groups
#[test]
fn test_crd_generation() {
    let vm = VirtualMachine::crd();
    assert_eq!(vm.spec.group, "kubevirt.io");
    assert_eq!(vm.spec.names.kind, "VirtualMachine");
    assert_eq!(vm.spec.names.short_names, Some(vec!["vm".to_string()]));
    assert_eq!(vm.spec.versions[0].name, "v1");

    let dv = DataVolume::crd();
    assert_eq!(dv.spec.group, "cdi.kubevirt.io");
    assert_eq!(dv.spec.names.kind, "DataVolume");
    assert_eq!(dv.spec.versions[0].name, "v1beta1");
    assert!(dv.spec.versions[0].subresources.is_some());
}

/// Test: the string enums accept only their listed names
#[test]
fn test_string_enum_parse() {
    assert_eq!(DiskBus::parse("virtio").unwrap(), DiskBus::Virtio);
    assert_eq!(RunStrategy::parse("Halted").unwrap().as_str(), "Halted");
    assert!(DataVolumeContentType::parse("Archive").is_err());
    assert_eq!(RegistryPullMethod::NAMES, &["pod", "node"]);
}

/// Test: volumes holding quantities deserialize, compare and appear in the CRD schema
#[test]
fn test_quantity_volumes() {
    let yaml = r#"
- name: scratch
  emptyDisk:
    capacity: 2Gi
- name: data
  hostDisk:
    path: /var/data.img
    type: DiskOrCreate
    capacity: 10Gi
"#;

    let volumes: Vec<Volume> = serde_yaml::from_str(yaml).expect("Failed to deserialize volumes");

    assert_eq!(
        volumes[0],
        Volume {
            name: "scratch".to_string(),
            source: VolumeSource {
                empty_disk: Some(EmptyDiskSource {
                    capacity: Quantity("2Gi".to_string()),
                }),
                ..Default::default()
            },
        }
    );
    assert_eq!(
        volumes[1].source.host_disk,
        Some(HostDisk {
            path: "/var/data.img".to_string(),
            type_: "DiskOrCreate".to_string(),
            capacity: Some(Quantity("10Gi".to_string())),
            shared: None,
        })
    );

    let schema = serde_json::to_string(&VirtualMachine::crd()).unwrap();
    for field in ["emptyDisk", "hostDisk", "downwardAPI", "memoryDump", "ioThreadsPolicy", "hostDevices"] {
        assert!(schema.contains(&format!("\"{field}\"")), "{field} missing from schema");
    }
}
