#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::data_volume::{data_volume_to_platform, data_volume_to_transport};
use super::domain::{devices_to_platform, domain_to_platform, domain_to_transport};
use super::metadata::{managed_fields_operation, metadata_to_platform, metadata_to_transport};
use super::scheduling::{probe_to_platform, probe_to_transport};
use super::volume::{network_to_platform, volume_to_platform, volume_to_transport};
use super::vm::{vm_to_platform, vm_to_transport};
use crate::codec::encode_chunks;
use crate::crd::domain::{DiskBus, InputType, IoThreadsPolicy};
use crate::error::ConvertError;
use crate::transport::*;
use crate::transport::domain::{VmCpu, VmDevices, VmDisk, VmDiskTarget, VmEfi, VmBootloader, VmFirmware, VmLunTarget};
use crate::transport::metadata::{VmFieldsV1, VmManagedFieldsEntry, VmOwnerReference};
use crate::transport::scheduling::{VmHttpGetAction, VmProbe, VmTcpSocketAction};
use crate::transport::volume::{VmCloudInit, VmLocalObjectReference, VmNetwork, VmVolume};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

const TRANSPORT_VM: &str = r#"
metadata:
  name: web-01
  namespace: apps
  labels:
    app: web
  annotations:
    owner: team-a
spec:
  runStrategy: Always
  template:
    metadata:
      labels:
        kubevirt.io/vm: web-01
    spec:
      domain:
        cpu:
          cores: 4
          sockets: 1
        memory:
          guest: 4Gi
        resources:
          requests:
            memory: 4Gi
        devices:
          disks:
            - name: boot
              disk:
                bus: virtio
              bootOrder: 1
          interfaces:
            - name: default
              masquerade: {}
      networks:
        - name: default
          pod: {}
      volumes:
        - name: boot
          dataVolume:
            name: boot-dv
        - name: cloudinit
          cloudInitNoCloud:
            userDataSecretRef:
              name: web-01-userdata
      tolerations:
        - key: dedicated
          operator: Equal
          value: vms
          effect: NoSchedule
          tolerationSeconds: 30
      readinessProbe:
        httpGet:
          port: "8080"
          path: /healthz
        periodSeconds: 10
  dataVolumeTemplates:
    - metadata:
        name: boot-dv
      spec:
        source:
          registry:
            url: docker://quay.io/containerdisks/fedora:40
        storage:
          accessModes:
            - ReadWriteOnce
          resources:
            requests:
              storage: 20Gi
status:
  printableStatus: Running
  ready: true
  conditions:
    - type: Ready
      status: "True"
      lastTransitionTime: "2024-05-01T10:00:00Z"
"#;

fn transport_vm() -> ClusterVirtualMachine {
    serde_yaml::from_str(TRANSPORT_VM).unwrap()
}

/// Test: a populated VM survives transport -> platform -> transport unchanged
#[test]
fn test_vm_round_trip() {
    let original = transport_vm();

    let platform = vm_to_platform(&original).unwrap();
    let back = vm_to_transport(&platform).unwrap();

    assert_eq!(back, original);
}

/// Test: the end-to-end sample lands in the expected platform fields
#[test]
fn test_vm_to_platform_fields() {
    let vm = vm_to_platform(&transport_vm()).unwrap();

    let spec = vm.spec.template.spec.as_ref().unwrap();
    assert_eq!(spec.domain.cpu.as_ref().unwrap().cores, Some(4));

    let disks = spec.domain.devices.disks.as_ref().unwrap();
    assert_eq!(disks[0].name, "boot");
    assert_eq!(disks[0].device.disk.as_ref().unwrap().bus, Some(DiskBus::Virtio));
    assert_eq!(disks[0].boot_order, Some(1));

    let volumes = spec.volumes.as_ref().unwrap();
    assert_eq!(volumes[0].source.data_volume.as_ref().unwrap().name, "boot-dv");
    let cloud_init = volumes[1].source.cloud_init_no_cloud.as_ref().unwrap();
    assert_eq!(cloud_init.user_data_secret_ref.as_ref().unwrap().name, "web-01-userdata");

    let probe = spec.readiness_probe.as_ref().unwrap();
    assert_eq!(probe.handler.http_get.as_ref().unwrap().port, IntOrString::Int(8080));

    assert_eq!(vm.status.as_ref().unwrap().printable_status.as_deref(), Some("Running"));
}

/// Test: the cloud-init secret ref is renamed on the platform side
#[test]
fn test_cloud_init_secret_ref_rename() {
    let volume = VmVolume {
        name: Some("cloudinit".to_string()),
        cloud_init_config_drive: Some(VmCloudInit {
            user_data_secret_ref: Some(VmLocalObjectReference {
                name: Some("secret".to_string()),
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    let platform = volume_to_platform(&volume).unwrap();
    let json = serde_json::to_value(&platform).unwrap();

    assert_eq!(json["cloudInitConfigDrive"]["secretRef"]["name"], "secret");
    assert_eq!(volume_to_transport(&platform).unwrap(), volume);
}

/// Test: two populated volume sources are rejected
#[test]
fn test_volume_source_ambiguous() {
    let volume: VmVolume = serde_json::from_value(serde_json::json!({
        "name": "mixed",
        "dataVolume": {"name": "dv"},
        "containerDisk": {"image": "quay.io/img"}
    }))
    .unwrap();

    let err = volume_to_platform(&volume).unwrap_err();

    match err {
        ConvertError::AmbiguousUnion { union, variants } => {
            assert_eq!(union, "volume_source");
            assert_eq!(variants, vec!["data_volume", "container_disk"]);
        }
        other => panic!("expected ambiguous union, got {other:?}"),
    }
}

/// Test: a host disk with an unknown type is rejected
#[test]
fn test_host_disk_type_validated() {
    let volume: VmVolume = serde_json::from_value(serde_json::json!({
        "name": "host",
        "hostDisk": {"path": "/var/data.img", "type": "File"}
    }))
    .unwrap();

    let err = volume_to_platform(&volume).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));
    assert_eq!(err.field_path(), "host_disk");
}

/// Test: a network without a source cannot be placed
#[test]
fn test_network_requires_source() {
    let network = VmNetwork {
        name: Some("default".to_string()),
        ..Default::default()
    };

    let err = network_to_platform(&network).unwrap_err();

    assert!(matches!(err, ConvertError::MissingField(ref f) if f == "network_source"));
}

/// Test: disk target union and bus validation
#[test]
fn test_disk_device_union_and_bus() {
    let ambiguous = VmDevices {
        disks: vec![VmDisk {
            name: Some("d".to_string()),
            disk: Some(VmDiskTarget::default()),
            lun: Some(VmLunTarget::default()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = devices_to_platform(&ambiguous).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::AmbiguousUnion { .. }));
    assert_eq!(err.field_path(), "disks[0]");

    let bad_bus = VmDevices {
        disks: vec![VmDisk {
            name: Some("d".to_string()),
            disk: Some(VmDiskTarget {
                bus: Some("ide".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = devices_to_platform(&bad_bus).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));
    assert_eq!(err.field_path(), "disks[0].disk");
}

/// Test: negative CPU counts are not wrapped into huge unsigned values
#[test]
fn test_negative_cores_rejected() {
    let domain = VmDomainSpec {
        cpu: Some(VmCpu {
            cores: Some(-2),
            ..Default::default()
        }),
        ..Default::default()
    };

    let err = domain_to_platform(&domain).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::Negative { value: -2, .. }));
    assert_eq!(err.field_path(), "cpu");
}

/// Test: an EFI bootloader without secure boot gets it disabled explicitly
#[test]
fn test_efi_secure_boot_default() {
    let domain = VmDomainSpec {
        firmware: Some(VmFirmware {
            bootloader: Some(VmBootloader {
                efi: Some(VmEfi::default()),
                bios: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    let platform = domain_to_platform(&domain).unwrap();
    let efi = platform.firmware.unwrap().bootloader.unwrap().efi.unwrap();

    assert_eq!(efi.secure_boot, Some(false));
}

/// Test: owner references require every identifying field
#[test]
fn test_owner_reference_requires_uid() {
    let meta = VmObjectMeta {
        name: Some("vm".to_string()),
        owner_references: vec![VmOwnerReference {
            api_version: Some("v1".to_string()),
            kind: Some("Pod".to_string()),
            name: Some("owner".to_string()),
            uid: None,
            ..Default::default()
        }],
        ..Default::default()
    };

    let err = metadata_to_platform(&meta).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "uid"));
    assert_eq!(err.field_path(), "ownerReferences[0]");
}

/// Test: managed fields carry their raw JSON through base64 chunks
#[test]
fn test_managed_fields_round_trip() {
    let raw = encode_chunks(br#"{"f:metadata":{"f:labels":{}}}"#);
    let meta = VmObjectMeta {
        name: Some("vm".to_string()),
        managed_fields: vec![VmManagedFieldsEntry {
            manager: Some("kubectl".to_string()),
            operation: Some("Update".to_string()),
            time: Some("2024-05-01T10:00:00Z".to_string()),
            fields_type: Some("FieldsV1".to_string()),
            fields_v1: Some(VmFieldsV1 { raw: raw.clone() }),
            ..Default::default()
        }],
        ..Default::default()
    };

    let platform = metadata_to_platform(&meta).unwrap();
    let entry = &platform.managed_fields.as_ref().unwrap()[0];
    assert_eq!(
        entry.fields_v1.as_ref().unwrap().0,
        serde_json::json!({"f:metadata": {"f:labels": {}}})
    );

    let back = metadata_to_transport(&platform).unwrap();
    assert_eq!(back.managed_fields[0].operation.as_deref(), Some("Update"));
    assert_eq!(back.managed_fields[0].time.as_deref(), Some("2024-05-01T10:00:00Z"));
    assert!(!back.managed_fields[0].fields_v1.as_ref().unwrap().raw.is_empty());
}

/// Test: unknown managed-fields operations fall back to Apply
#[test]
fn test_managed_fields_operation_fallback() {
    assert_eq!(managed_fields_operation(Some("Update")).as_deref(), Some("Update"));
    assert_eq!(managed_fields_operation(Some("Patch")).as_deref(), Some("Apply"));
    assert_eq!(managed_fields_operation(None), None);
}

/// Test: probe ports keep named ports as strings
#[test]
fn test_probe_port_named() {
    let probe = VmProbe {
        tcp_socket: Some(VmTcpSocketAction {
            port: Some("ssh".to_string()),
            host: None,
        }),
        ..Default::default()
    };

    let platform = probe_to_platform(&probe).unwrap();
    assert_eq!(
        platform.handler.tcp_socket.as_ref().unwrap().port,
        IntOrString::String("ssh".to_string())
    );
    assert_eq!(probe_to_transport(&platform).unwrap(), probe);
}

/// Test: an HTTP probe without a port is incomplete
#[test]
fn test_probe_http_requires_port() {
    let probe = VmProbe {
        http_get: Some(VmHttpGetAction {
            path: Some("/".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let err = probe_to_platform(&probe).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "port"));
    assert_eq!(err.field_path(), "http_get");
}

/// Test: a status condition without a type cannot be represented
#[test]
fn test_status_condition_requires_type() {
    let mut vm = transport_vm();
    vm.status.as_mut().unwrap().conditions[0].type_ = None;

    let err = vm_to_platform(&vm).unwrap_err();

    assert!(matches!(err, ConvertError::Unmarshal { ref what, .. } if what == "status"));
}

/// Test: an unknown run strategy is rejected
#[test]
fn test_run_strategy_validated() {
    let mut vm = transport_vm();
    vm.spec.as_mut().unwrap().run_strategy = Some("Sometimes".to_string());

    let err = vm_to_platform(&vm).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));
    assert_eq!(err.field_path(), "spec.runStrategy");
}

/// Test: data volumes travel in a persisted add-volume entity
#[test]
fn test_data_volume_entity() {
    let entity: VmAddVolumeEntity = serde_json::from_value(serde_json::json!({
        "dataVolumeTemplate": {
            "metadata": {"name": "data", "namespace": "apps"},
            "spec": {
                "source": {"blank": {}},
                "pvc": {
                    "accessModes": ["ReadWriteOnce"],
                    "resources": {"requests": {"storage": "10Gi"}}
                },
                "contentType": "kubevirt"
            },
            "status": {"phase": "Succeeded", "progress": "100.0%"}
        },
        "addVolumeOptions": {"name": "data"},
        "persist": true
    }))
    .unwrap();

    let dv = data_volume_to_platform(&entity).unwrap();
    assert_eq!(dv.metadata.name.as_deref(), Some("data"));
    assert!(dv.spec.source.as_ref().unwrap().blank.is_some());
    assert_eq!(dv.status.as_ref().unwrap().phase.as_deref(), Some("Succeeded"));

    let back = data_volume_to_transport(&dv, entity.add_volume_options.clone()).unwrap();
    assert_eq!(back, entity);
}

/// Test: a data volume entity without a template is incomplete
#[test]
fn test_data_volume_requires_template() {
    let err = data_volume_to_platform(&VmAddVolumeEntity::default()).unwrap_err();

    assert!(matches!(err, ConvertError::MissingField(ref f) if f == "dataVolumeTemplate"));
}

/// Test: where the shapes agree, the explicit domain mapper matches the JSON bridge
#[test]
fn test_domain_mapper_matches_bridge() {
    let domain: VmDomainSpec = serde_json::from_value(serde_json::json!({
        "cpu": {"cores": 2, "sockets": 1, "model": "host-passthrough"},
        "memory": {"guest": "4Gi"},
        "devices": {
            "disks": [
                {"name": "root", "disk": {"bus": "virtio"}, "bootOrder": 1},
                {"name": "seed", "cdrom": {"bus": "sata"}}
            ],
            "autoattachPodInterface": false
        }
    }))
    .unwrap();

    let mapped = domain_to_platform(&domain).unwrap();
    let bridged: crate::crd::domain::DomainSpec =
        crate::convert::bridge::bridge("domain", &domain).unwrap();

    assert_eq!(mapped, bridged);
}

/// Test: clock, chassis, launch security and passthrough devices map both ways
#[test]
fn test_extended_domain_round_trip() {
    let domain: VmDomainSpec = serde_json::from_value(serde_json::json!({
        "clock": {
            "timezone": "America/New_York",
            "timer": {"pit": {"tickPolicy": "delay"}, "hyperv": {"present": true}}
        },
        "chassis": {"version": "2.1"},
        "launchSecurity": {"sev": {}},
        "ioThreadsPolicy": "shared",
        "devices": {
            "gpus": [{
                "name": "gpu0",
                "deviceName": "nvidia.com/A100",
                "virtualGPUOptions": {"display": {"enabled": false}}
            }],
            "hostDevices": [{"name": "fpga", "deviceName": "xilinx.com/u200", "tag": "accel"}],
            "inputs": [{"name": "tablet", "type": "tablet"}]
        }
    }))
    .unwrap();

    let platform = domain_to_platform(&domain).unwrap();

    assert_eq!(platform.io_threads_policy, Some(IoThreadsPolicy::Shared));
    assert!(platform.launch_security.as_ref().unwrap().sev.is_some());
    assert_eq!(platform.devices.inputs.as_ref().unwrap()[0].type_, InputType::Tablet);
    assert_eq!(domain_to_transport(&platform).unwrap(), domain);

    let bridged: crate::crd::domain::DomainSpec =
        crate::convert::bridge::bridge("domain", &domain).unwrap();
    assert_eq!(platform, bridged);
}

/// Test: passthrough devices need a device name, inputs a known type, clocks a single offset
#[test]
fn test_extended_domain_validation() {
    let devices: VmDevices =
        serde_json::from_value(serde_json::json!({"gpus": [{"name": "gpu0"}]})).unwrap();
    let err = devices_to_platform(&devices).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "deviceName"));
    assert_eq!(err.field_path(), "gpus[0]");

    let devices: VmDevices =
        serde_json::from_value(serde_json::json!({"inputs": [{"name": "kbd", "type": "keyboard"}]}))
            .unwrap();
    let err = devices_to_platform(&devices).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));
    assert_eq!(err.field_path(), "inputs[0].type");

    let domain: VmDomainSpec =
        serde_json::from_value(serde_json::json!({"clock": {"timezone": "UTC", "utc": {}}})).unwrap();
    let err = domain_to_platform(&domain).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::AmbiguousUnion { .. }));
    assert_eq!(err.field_path(), "clock");
}

/// Test: secret, downward API, downward metrics and memory dump volumes map both ways
#[test]
fn test_extended_volume_sources() {
    let sources = [
        serde_json::json!({"secret": {"secretName": "tls", "optional": true}}),
        serde_json::json!({"downwardAPI": {
            "fields": [{"path": "cpu", "resourceFieldRef": {"resource": "limits.cpu", "divisor": "1m"}}],
            "volumeLabel": "INFO"
        }}),
        serde_json::json!({"downwardMetrics": {}}),
        serde_json::json!({"memoryDump": {"claimName": "dump", "hotpluggable": true}}),
    ];

    for source in sources {
        let mut json = source;
        json["name"] = serde_json::json!("v");
        let volume: VmVolume = serde_json::from_value(json.clone()).unwrap();

        let platform = volume_to_platform(&volume).unwrap();

        assert_eq!(serde_json::to_value(&platform).unwrap(), json);
        assert_eq!(volume_to_transport(&platform).unwrap(), volume);
    }
}

/// Test: the new volume sources report missing required names with their path
#[test]
fn test_extended_volume_sources_require_names() {
    let volume: VmVolume = serde_json::from_value(serde_json::json!({
        "name": "dump",
        "memoryDump": {"hotpluggable": true}
    }))
    .unwrap();
    let err = volume_to_platform(&volume).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "claimName"));
    assert_eq!(err.field_path(), "memory_dump");

    let volume: VmVolume = serde_json::from_value(serde_json::json!({
        "name": "info",
        "downwardAPI": {"fields": [{"fieldRef": {"fieldPath": "metadata.name"}}]}
    }))
    .unwrap();
    let err = volume_to_platform(&volume).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "path"));
    assert_eq!(err.field_path(), "downward_api.fields[0]");
}
