#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::crd::domain::DiskBus;
use crate::error::ConvertError;
use crate::state::{ResourceData, StateReader};
use serde_json::{json, Value};

fn declarative_vm() -> Value {
    json!({
        "name": "web-01",
        "labels": {"app": "web"},
        "run_strategy": "Always",
        "cpu": [{"cores": 4}],
        "memory": [{"guest": "2Gi"}],
        "disk": [{"name": "boot", "disk_device": [{"disk": [{"bus": "virtio"}]}]}],
        "volume": [{"name": "boot", "volume_source": [{"data_volume": [{"name": "boot-dv"}]}]}],
        "network": [{"name": "default", "network_source": [{"pod": [{}]}]}]
    })
}

fn declarative_dv() -> Value {
    json!({
        "metadata": [{"name": "scratch"}],
        "spec": [{
            "source": [{"blank": [{}]}],
            "storage": [{"resources": [{"requests": {"storage": "5Gi"}}]}]
        }],
        "add_volume_options": [{"name": "scratch"}],
        "vm_name": "web-01"
    })
}

fn state(value: Value) -> ResourceData {
    ResourceData::from_json(value).unwrap()
}

const PLATFORM_VM: &str = r#"
apiVersion: kubevirt.io/v1
kind: VirtualMachine
metadata:
  name: db-01
  namespace: data
  annotations:
    kubevirt.io/latest-observed-api-version: v1
    team: storage
spec:
  running: true
  template:
    spec:
      domain:
        cpu:
          cores: 2
        devices:
          disks:
            - name: root
              disk:
                bus: sata
      volumes:
        - name: root
          containerDisk:
            image: quay.io/containerdisks/debian:12
"#;

/// Test: declarative -> platform keeps cores, disk bus and data volume
#[test]
fn test_declarative_vm_to_platform() {
    let config = TranscodeConfig::default();

    let vm = declarative_vm_to_platform(&state(declarative_vm()), &config).unwrap();

    assert_eq!(vm.metadata.namespace.as_deref(), Some("default"));
    let spec = vm.spec.template.spec.as_ref().unwrap();
    assert_eq!(spec.domain.cpu.as_ref().unwrap().cores, Some(4));
    let disk = &spec.domain.devices.disks.as_ref().unwrap()[0];
    assert_eq!(disk.device.disk.as_ref().unwrap().bus, Some(DiskBus::Virtio));
    let volume = &spec.volumes.as_ref().unwrap()[0];
    assert_eq!(volume.source.data_volume.as_ref().unwrap().name, "boot-dv");
}

/// Flatten `input` once through transport only and once through the platform
fn flatten_both_ways(input: &ResourceData) -> (ResourceData, ResourceData) {
    let config = TranscodeConfig::default();

    let transport = declarative_vm_to_transport(input, &config).unwrap();
    let mut direct = ResourceData::new();
    transport_vm_to_declarative(&transport, &mut direct, &config).unwrap();

    let platform = declarative_vm_to_platform(input, &config).unwrap();
    let mut via_platform = ResourceData::new();
    platform_vm_to_declarative(&platform, &mut via_platform, &config).unwrap();

    (direct, via_platform)
}

/// Test: going through the platform flattens to the same state as going through transport only
#[test]
fn test_platform_leg_is_transparent() {
    let (direct, via_platform) = flatten_both_ways(&state(declarative_vm()));

    assert_eq!(via_platform, direct);
}

/// Test: a declared bootloader with no branch selected survives the platform leg
#[test]
fn test_platform_leg_keeps_empty_bootloader() {
    let config = TranscodeConfig::default();
    let mut vm = declarative_vm();
    vm["firmware"] = json!([{"bootloader": [{}]}]);
    let input = state(vm);

    let platform = declarative_vm_to_platform(&input, &config).unwrap();
    let firmware = platform.spec.template.spec.as_ref().unwrap().domain.firmware.as_ref().unwrap();
    assert_eq!(firmware.bootloader, Some(Default::default()));

    let (direct, via_platform) = flatten_both_ways(&input);
    assert_eq!(via_platform, direct);

    let fields = via_platform.fields();
    let firmware = fields.block("firmware").unwrap().unwrap();
    let bootloader = firmware.block("bootloader").unwrap().expect("bootloader dropped");
    assert!(bootloader.map().is_empty());
}

/// Test: clock, chassis, launch security, passthrough devices and the secret,
/// downward API, downward metrics and memory dump volumes cross the platform
#[test]
fn test_platform_leg_keeps_extended_domain() {
    let config = TranscodeConfig::default();
    let mut vm = declarative_vm();
    let extra = json!({
        "clock": [{
            "timezone": "Europe/Berlin",
            "timer": [{"hpet": [{"present": false}], "rtc": [{"tick_policy": "catchup", "track": "guest"}]}]
        }],
        "chassis": [{"manufacturer": "Acme", "sku": "A1"}],
        "launch_security": [{"sev": [{}]}],
        "io_threads_policy": "supplementalPool",
        "gpu": [{
            "name": "gpu0",
            "device_name": "nvidia.com/TU104GL",
            "virtual_gpu_options": [{"display": [{"enabled": true, "ram_fb": [{"enabled": true}]}]}]
        }],
        "host_device": [{"name": "qat", "device_name": "intel.com/qat"}],
        "input": [{"name": "tablet", "type": "tablet", "bus": "usb"}],
        "volume": [
            {"name": "boot", "volume_source": [{"data_volume": [{"name": "boot-dv"}]}]},
            {"name": "creds", "volume_source": [{"secret": [{"secret_name": "db-creds", "optional": true}]}]},
            {"name": "podinfo", "volume_source": [{"downward_api": [{"field": [
                {"path": "labels", "field_ref": [{"field_path": "metadata.labels"}]},
                {"path": "mem", "resource_field_ref": [{"resource": "limits.memory", "divisor": "1Mi"}]}
            ]}]}]},
            {"name": "metrics", "volume_source": [{"downward_metrics": [{}]}]},
            {"name": "dump", "volume_source": [{"memory_dump": [{"claim_name": "dump-pvc", "hotpluggable": true}]}]}
        ]
    });
    for (key, value) in extra.as_object().unwrap() {
        vm[key] = value.clone();
    }
    let input = state(vm);

    let platform = declarative_vm_to_platform(&input, &config).unwrap();
    let json = serde_json::to_value(&platform).unwrap();
    let domain = &json["spec"]["template"]["spec"]["domain"];
    assert_eq!(domain["clock"]["timezone"], "Europe/Berlin");
    assert_eq!(domain["clock"]["timer"]["rtc"]["tickPolicy"], "catchup");
    assert_eq!(domain["chassis"]["manufacturer"], "Acme");
    assert_eq!(domain["launchSecurity"]["sev"], json!({}));
    assert_eq!(domain["ioThreadsPolicy"], "supplementalPool");
    assert_eq!(domain["devices"]["gpus"][0]["virtualGPUOptions"]["display"]["ramFB"]["enabled"], true);
    assert_eq!(domain["devices"]["hostDevices"][0]["deviceName"], "intel.com/qat");
    assert_eq!(domain["devices"]["inputs"][0]["bus"], "usb");
    let volumes = &json["spec"]["template"]["spec"]["volumes"];
    assert_eq!(volumes[1]["secret"]["secretName"], "db-creds");
    assert_eq!(volumes[2]["downwardAPI"]["fields"][0]["fieldRef"]["fieldPath"], "metadata.labels");
    assert_eq!(volumes[2]["downwardAPI"]["fields"][1]["resourceFieldRef"]["divisor"], "1Mi");
    assert_eq!(volumes[3]["downwardMetrics"], json!({}));
    assert_eq!(volumes[4]["memoryDump"]["claimName"], "dump-pvc");

    let (direct, via_platform) = flatten_both_ways(&input);
    assert_eq!(via_platform, direct);
    assert_eq!(via_platform.to_json()["clock"], extra["clock"]);
    assert_eq!(via_platform.to_json()["gpu"], extra["gpu"]);
    assert_eq!(via_platform.to_json()["volume"], extra["volume"]);
}

/// Test: a platform VM flattens with reserved annotations stripped and running mapped
#[test]
fn test_platform_vm_to_declarative() {
    let config = TranscodeConfig::default();
    let vm: VirtualMachine = serde_yaml::from_str(PLATFORM_VM).unwrap();
    let mut out = ResourceData::new();

    platform_vm_to_declarative(&vm, &mut out, &config).unwrap();

    let fields = out.fields();
    assert_eq!(fields.string("name").unwrap().as_deref(), Some("db-01"));
    assert_eq!(fields.string("namespace").unwrap().as_deref(), Some("data"));
    let annotations = fields.string_map("annotations").unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations.get("team").map(String::as_str), Some("storage"));
    assert_eq!(fields.bool("run_on_launch").unwrap(), Some(true));
    assert!(fields.get("run_strategy").is_none());
}

/// Test: a platform VM that cannot be flattened leaves the state untouched
#[test]
fn test_platform_failure_leaves_state() {
    let config = TranscodeConfig::default();
    let mut vm: VirtualMachine = serde_yaml::from_str(PLATFORM_VM).unwrap();
    let volumes = vm.spec.template.spec.as_mut().unwrap().volumes.as_mut().unwrap();
    volumes[0].source.data_volume = serde_json::from_value(json!({"name": "extra"})).unwrap();

    let mut out = state(json!({"name": "keep-me"}));
    let before = out.clone();

    let err = platform_vm_to_declarative(&vm, &mut out, &config).unwrap_err();

    assert!(matches!(err.root_cause(), ConvertError::AmbiguousUnion { .. }));
    assert_eq!(out, before);
}

/// Test: a declarative data volume reaches the platform and comes back without its VM reference
#[test]
fn test_data_volume_directions() {
    let config = TranscodeConfig::default();

    let dv = declarative_dv_to_platform(&state(declarative_dv()), &config).unwrap();
    assert_eq!(dv.metadata.name.as_deref(), Some("scratch"));
    assert_eq!(dv.metadata.namespace.as_deref(), Some("default"));
    assert!(dv.spec.source.as_ref().unwrap().blank.is_some());

    let mut out = ResourceData::new();
    platform_dv_to_declarative(&dv, &mut out, &config).unwrap();

    let fields = out.fields();
    assert!(fields.block("spec").unwrap().is_some());
    assert!(fields.get("add_volume_options").is_none());
    assert!(fields.get("vm_name").is_none());
}

/// Test: options handed to the platform -> transport direction are attached and persisted
#[test]
fn test_platform_dv_to_transport_options() {
    let config = TranscodeConfig::default();
    let entity = declarative_dv_to_transport(&state(declarative_dv()), &config).unwrap();
    let dv = transport_dv_to_platform(&entity).unwrap();

    let back = platform_dv_to_transport(&dv, entity.add_volume_options.clone()).unwrap();

    assert_eq!(back, entity);
    assert_eq!(back.persist, Some(true));
}
