#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::TranscodeConfig;
use crate::convert::platform::vm_to_platform;
use crate::crd::domain::DiskBus;
use crate::error::ConvertError;
use crate::state::{normalize, Attr, AttrMap, ResourceData, StateReader};
use crate::transport::domain::VmBios;
use crate::transport::ClusterVirtualMachine;
use serde_json::{json, Value};

fn declarative_vm() -> Value {
    json!({
        "name": "web-01",
        "namespace": "apps",
        "labels": {"app": "web"},
        "annotations": {"owner": "team-a"},
        "run_strategy": "Always",
        "template_labels": {"kubevirt.io/vm": "web-01"},
        "cpu": [{"cores": 4, "sockets": 1}],
        "memory": [{"guest": "4Gi"}],
        "resources": [{"requests": {"memory": "4Gi"}}],
        "disk": [{
            "name": "boot",
            "boot_order": 1,
            "disk_device": [{"disk": [{"bus": "virtio"}]}]
        }],
        "interface": [{"name": "default", "interface_binding_method": "InterfaceMasquerade"}],
        "network": [{"name": "default", "network_source": [{"pod": [{}]}]}],
        "volume": [
            {"name": "boot", "volume_source": [{"data_volume": [{"name": "boot-dv"}]}]},
            {"name": "cloudinit", "volume_source": [{
                "cloud_init_no_cloud": [{"user_data_secret_ref": [{"name": "web-01-userdata"}]}]
            }]}
        ],
        "tolerations": [{
            "key": "dedicated",
            "operator": "Equal",
            "value": "vms",
            "effect": "NoSchedule",
            "toleration_seconds": "30"
        }],
        "readiness_probe": [{
            "http_get": [{"port": "8080", "path": "/healthz"}],
            "period_seconds": 10
        }],
        "data_volume_templates": [{
            "metadata": [{"name": "boot-dv"}],
            "spec": [{
                "source": [{"registry": [{"url": "docker://quay.io/containerdisks/fedora:40"}]}],
                "storage": [{
                    "access_modes": ["ReadWriteOnce"],
                    "resources": [{"requests": {"storage": "20Gi"}}]
                }]
            }]
        }],
        "status": [{
            "printable_status": "Running",
            "ready": true,
            "conditions": [{
                "type": "Ready",
                "status": "True",
                "last_transition_time": "2024-05-01T10:00:00Z"
            }]
        }]
    })
}

fn state(value: Value) -> ResourceData {
    ResourceData::from_json(value).unwrap()
}

fn with(mut value: Value, key: &str, attr: Value) -> Value {
    value[key] = attr;
    value
}

fn without(mut value: Value, key: &str) -> Value {
    value.as_object_mut().unwrap().remove(key);
    value
}

/// Sets read back from JSON as lists; compare both sides in list form
fn as_lists(map: &AttrMap) -> AttrMap {
    fn convert(attr: &Attr) -> Attr {
        match attr {
            Attr::Set(set) => Attr::List(set.iter().map(convert).collect()),
            Attr::List(items) => Attr::List(items.iter().map(convert).collect()),
            Attr::Map(map) => Attr::Map(as_lists(map)),
            other => other.clone(),
        }
    }
    map.iter().map(|(k, v)| (k.clone(), convert(v))).collect()
}

fn round_trip(value: Value) -> ResourceData {
    let config = TranscodeConfig::default();
    let vm = expand_vm(&state(value), &config).unwrap();
    let mut out = ResourceData::new().with_schema(VM_KEYS.iter().copied());
    flatten_vm(&vm, &mut out, &config).unwrap();
    out
}

/// Test: a declarative VM survives expand -> flatten unchanged
#[test]
fn test_vm_round_trip() {
    let original = state(declarative_vm());
    let back = round_trip(declarative_vm());

    assert_eq!(
        as_lists(&normalize(back.attrs())),
        as_lists(&normalize(original.attrs()))
    );
}

/// Test: the declarative sample reaches the platform with cores, bus and data volume intact
#[test]
fn test_declarative_to_platform() {
    let config = TranscodeConfig::default();
    let transport = expand_vm(&state(declarative_vm()), &config).unwrap();
    let vm = vm_to_platform(&transport).unwrap();

    assert_eq!(vm.metadata.namespace.as_deref(), Some("apps"));
    let spec = vm.spec.template.spec.as_ref().unwrap();
    assert_eq!(spec.domain.cpu.as_ref().unwrap().cores, Some(4));

    let disk = &spec.domain.devices.disks.as_ref().unwrap()[0];
    assert_eq!(disk.name, "boot");
    assert_eq!(disk.device.disk.as_ref().unwrap().bus, Some(DiskBus::Virtio));

    let volumes = spec.volumes.as_ref().unwrap();
    assert_eq!(volumes[0].source.data_volume.as_ref().unwrap().name, "boot-dv");

    let templates = vm.spec.data_volume_templates.as_ref().unwrap();
    assert_eq!(templates[0].metadata.as_ref().unwrap().name.as_deref(), Some("boot-dv"));
}

/// Test: the toleration seconds string becomes an integer
#[test]
fn test_toleration_seconds_parsed() {
    let vm = expand_vm(&state(declarative_vm()), &TranscodeConfig::default()).unwrap();
    let spec = vm.spec.unwrap().template.unwrap().spec.unwrap();
    assert_eq!(spec.tolerations[0].toleration_seconds, Some(30));

    let bad = with(
        declarative_vm(),
        "tolerations",
        json!([{"key": "a", "toleration_seconds": "soon"}]),
    );
    let err = expand_vm(&state(bad), &TranscodeConfig::default()).unwrap_err();
    assert_eq!(err.field_path(), "tolerations[0]");
    assert!(matches!(err.root_cause(), ConvertError::TypeMismatch { .. }));
}

/// Test: a missing namespace takes the configured default
#[test]
fn test_default_namespace() {
    let value = without(declarative_vm(), "namespace");

    let vm = expand_vm(&state(value.clone()), &TranscodeConfig::default()).unwrap();
    assert_eq!(vm.metadata.unwrap().namespace.as_deref(), Some("default"));

    let config = TranscodeConfig::default().with_default_namespace("lab");
    let vm = expand_vm(&state(value), &config).unwrap();
    assert_eq!(vm.metadata.unwrap().namespace.as_deref(), Some("lab"));
}

/// Test: data volume template metadata is not given a namespace
#[test]
fn test_template_namespace_not_defaulted() {
    let vm = expand_vm(&state(declarative_vm()), &TranscodeConfig::default()).unwrap();
    let template = &vm.spec.unwrap().data_volume_templates[0];
    assert_eq!(template.metadata.as_ref().unwrap().namespace, None);
}

/// Test: reserved annotations are kept on expand and dropped on flatten
#[test]
fn test_reserved_annotations_filtered_on_flatten() {
    let config = TranscodeConfig::default();
    let value = with(
        declarative_vm(),
        "annotations",
        json!({"owner": "team-a", "kubevirt.io/latest-observed-api-version": "v1"}),
    );

    let vm = expand_vm(&state(value), &config).unwrap();
    assert_eq!(vm.metadata.as_ref().unwrap().annotations.len(), 2);

    let mut out = ResourceData::new();
    flatten_vm(&vm, &mut out, &config).unwrap();
    let annotations = out.fields().string_map("annotations").unwrap();
    assert_eq!(annotations.keys().collect::<Vec<_>>(), ["owner"]);
}

/// Test: a failed flatten leaves the state handle untouched
#[test]
fn test_failed_flatten_commits_nothing() {
    let config = TranscodeConfig::default();
    let mut vm = expand_vm(&state(declarative_vm()), &config).unwrap();
    let template = vm.spec.as_mut().unwrap().template.as_mut().unwrap();
    template.spec.as_mut().unwrap().volumes[0].container_disk = Some(Default::default());

    let mut target = state(json!({"name": "previous", "hostname": "old"}));
    let before = target.clone();

    let err = flatten_vm(&vm, &mut target, &config).unwrap_err();
    assert_eq!(err.field_path(), "spec.template.volume[0]");
    assert!(matches!(err.root_cause(), ConvertError::AmbiguousUnion { .. }));
    assert_eq!(target, before);
}

/// Test: staging writes keys in table order and only the keys that are present
#[test]
fn test_flatten_writes_only_present_keys() {
    let out = round_trip(declarative_vm());
    assert!(out.get("hostname").is_none());
    assert!(out.get("affinity").is_none());
    assert_eq!(out.get("name"), Some(&Attr::from("web-01")));
}

/// Test: two populated volume sources are rejected with the union path
#[test]
fn test_volume_source_union_exclusive() {
    let value = with(
        declarative_vm(),
        "volume",
        json!([{
            "name": "boot",
            "volume_source": [{
                "data_volume": [{"name": "boot-dv"}],
                "container_disk": [{"image_url": "quay.io/fedora"}]
            }]
        }]),
    );
    let err = expand_vm(&state(value), &TranscodeConfig::default()).unwrap_err();
    assert_eq!(err.field_path(), "volume[0].volume_source");
    match err.root_cause() {
        ConvertError::AmbiguousUnion { variants, .. } => {
            assert_eq!(variants, &["data_volume", "container_disk"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test: enumerated strings are checked on the way in
#[test]
fn test_enum_validation() {
    let config = TranscodeConfig::default();

    let value = with(
        declarative_vm(),
        "tolerations",
        json!([{"key": "a", "operator": "Maybe"}]),
    );
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "tolerations[0].operator");
    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));

    let value = with(
        declarative_vm(),
        "interface",
        json!([{"name": "default", "interface_binding_method": "InterfaceTap"}]),
    );
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "interface[0].interface_binding_method");

    let mut value = declarative_vm();
    value["data_volume_templates"][0]["spec"][0]["storage"][0]["access_modes"] = json!(["ReadSometimes"]);
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(
        err.field_path(),
        "data_volume_templates[0].spec.storage.access_modes"
    );

    let value = with(declarative_vm(), "run_strategy", json!("Sometimes"));
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "run_strategy");
}

/// Test: run_on_launch maps onto running or the Manual strategy
#[test]
fn test_run_flags() {
    let config = TranscodeConfig::default();
    let base = without(declarative_vm(), "run_strategy");

    let vm = expand_vm(&state(with(base.clone(), "run_on_launch", json!(true))), &config).unwrap();
    let spec = vm.spec.unwrap();
    assert_eq!(spec.running, Some(true));
    assert_eq!(spec.run_strategy, None);

    let vm = expand_vm(&state(with(base.clone(), "run_on_launch", json!(false))), &config).unwrap();
    let spec = vm.spec.as_ref().unwrap();
    assert_eq!(spec.running, None);
    assert_eq!(spec.run_strategy.as_deref(), Some("Manual"));

    let mut out = ResourceData::new();
    flatten_vm(&vm, &mut out, &config).unwrap();
    assert_eq!(out.get("run_on_launch"), Some(&Attr::Bool(false)));
    assert_eq!(out.get("run_strategy"), Some(&Attr::from("Manual")));

    let value = with(
        with(base, "run_on_launch", json!(true)),
        "run_strategy",
        json!("Halted"),
    );
    let spec = expand_vm(&state(value), &config).unwrap().spec.unwrap();
    assert_eq!(spec.running, None);
    assert_eq!(spec.run_strategy.as_deref(), Some("Halted"));
}

/// Test: a negative guest memory size is rejected
#[test]
fn test_negative_memory_rejected() {
    let value = with(declarative_vm(), "memory", json!([{"guest": "-1Gi"}]));
    let err = expand_vm(&state(value), &TranscodeConfig::default()).unwrap_err();
    assert_eq!(err.field_path(), "memory");
    assert!(matches!(err.root_cause(), ConvertError::InvalidQuantity { .. }));

    let value = with(declarative_vm(), "memory", json!([{"guest": "100Ei"}]));
    let err = expand_vm(&state(value), &TranscodeConfig::default()).unwrap_err();
    assert!(matches!(err.root_cause(), ConvertError::InvalidQuantity { .. }));
}

/// Test: clock, chassis, security, passthrough devices and extra volume sources survive expand -> flatten
#[test]
fn test_extended_domain_round_trip() {
    let mut value = declarative_vm();
    value["clock"] = json!([{"utc": [{"offset_seconds": 3600}], "timer": [{"kvm": [{"present": true}]}]}]);
    value["chassis"] = json!([{"serial": "CH-42", "asset": "rack-7"}]);
    value["launch_security"] = json!([{"sev": [{}]}]);
    value["io_threads_policy"] = json!("auto");
    value["gpu"] = json!([{"name": "gpu0", "device_name": "nvidia.com/GRID_T4-1Q", "tag": "display"}]);
    value["host_device"] = json!([{"name": "nic", "device_name": "mellanox.com/cx5"}]);
    value["input"] = json!([{"name": "tablet", "type": "tablet", "bus": "virtio"}]);
    value["volume"] = json!([
        {"name": "creds", "volume_source": [{"secret": [{"secret_name": "db", "volume_label": "CREDS"}]}]},
        {"name": "info", "volume_source": [{"downward_api": [{
            "field": [{"path": "name", "mode": 420, "field_ref": [{"field_path": "metadata.name"}]}]
        }]}]},
        {"name": "metrics", "volume_source": [{"downward_metrics": [{}]}]},
        {"name": "dump", "volume_source": [{"memory_dump": [{"claim_name": "dump", "read_only": true}]}]}
    ]);

    let config = TranscodeConfig::default();
    let vm = expand_vm(&state(value.clone()), &config).unwrap();
    let instance = vm.spec.as_ref().unwrap().template.as_ref().unwrap().spec.as_ref().unwrap();
    let domain = instance.domain.as_ref().unwrap();
    assert_eq!(domain.clock.as_ref().unwrap().utc.as_ref().unwrap().offset_seconds, Some(3600));
    assert!(domain.launch_security.as_ref().unwrap().sev.is_some());
    assert_eq!(domain.devices.as_ref().unwrap().inputs[0].bus.as_deref(), Some("virtio"));
    assert_eq!(instance.volumes[1].downward_api.as_ref().unwrap().fields[0].mode, Some(420));
    assert!(instance.volumes[2].downward_metrics.is_some());

    let back = round_trip(value.clone());
    assert_eq!(
        as_lists(&normalize(back.attrs())),
        as_lists(&normalize(state(value).attrs()))
    );
}

/// Test: the clock offset union and the io threads and input enums are checked
#[test]
fn test_extended_domain_validation() {
    let config = TranscodeConfig::default();

    let value = with(
        declarative_vm(),
        "clock",
        json!([{"timezone": "UTC", "utc": [{"offset_seconds": 0}]}]),
    );
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "clock");
    assert!(matches!(err.root_cause(), ConvertError::AmbiguousUnion { .. }));

    let value = with(declarative_vm(), "io_threads_policy", json!("dedicated"));
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "io_threads_policy");
    assert!(matches!(err.root_cause(), ConvertError::InvalidEnum { .. }));

    let value = with(
        declarative_vm(),
        "input",
        json!([{"name": "kbd", "type": "keyboard"}]),
    );
    let err = expand_vm(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "input[0].type");

    let value = with(
        declarative_vm(),
        "volume",
        json!([{"name": "x", "volume_source": [{
            "secret": [{"secret_name": "db"}],
            "downward_metrics": [{}]
        }]}]),
    );
    let err = expand_vm(&state(value), &config).unwrap_err();
    match err.root_cause() {
        ConvertError::AmbiguousUnion { variants, .. } => {
            assert_eq!(variants, &["secret", "downward_metrics"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test: integers too wide for the transport are rejected, not truncated
#[test]
fn test_boot_order_out_of_range() {
    let wide: i64 = 1 << 40;
    let value = with(
        declarative_vm(),
        "disk",
        json!([{"name": "boot", "boot_order": wide}]),
    );
    let err = expand_vm(&state(value), &TranscodeConfig::default()).unwrap_err();
    assert_eq!(err.field_path(), "disk[0]");
    assert!(matches!(err.root_cause(), ConvertError::OutOfRange { .. }));
}

/// Test: a declared-but-empty BIOS block stays an empty marker
#[test]
fn test_empty_bios_block() {
    let value = with(
        declarative_vm(),
        "firmware",
        json!([{"bootloader": [{"bios": [{}]}]}]),
    );
    let vm = expand_vm(&state(value.clone()), &TranscodeConfig::default()).unwrap();
    let template = vm.spec.unwrap().template.unwrap();
    let domain = template.spec.unwrap().domain.unwrap();
    let bootloader = domain.firmware.as_ref().unwrap().bootloader.as_ref().unwrap();
    assert_eq!(bootloader.bios, Some(VmBios::default()));

    let back = round_trip(value);
    let firmware = back.fields().block("firmware").unwrap().unwrap();
    let bootloader = firmware.block("bootloader").unwrap().unwrap();
    let bios = bootloader.block("bios").unwrap().unwrap();
    assert!(bios.map().is_empty());
}

/// Test: a port without a number is rejected
#[test]
fn test_interface_port_requires_number() {
    let value = with(
        declarative_vm(),
        "interface",
        json!([{"name": "default", "ports": [{"name": "http"}]}]),
    );
    let err = expand_vm(&state(value), &TranscodeConfig::default()).unwrap_err();
    assert_eq!(err.field_path(), "interface[0].ports[0]");
    assert!(matches!(err.root_cause(), ConvertError::MissingField(f) if f == "port"));
}

/// Test: condition type keeps an explicit empty string apart from absent
#[test]
fn test_condition_empty_type_preserved() {
    let value = with(
        declarative_vm(),
        "status",
        json!([{"conditions": [{"type": "", "status": "False"}, {"status": "True"}]}]),
    );
    let vm = expand_vm(&state(value), &TranscodeConfig::default()).unwrap();
    let conditions = &vm.status.as_ref().unwrap().conditions;
    assert_eq!(conditions[0].type_.as_deref(), Some(""));
    assert_eq!(conditions[1].type_, None);

    let mut out = ResourceData::new();
    flatten_vm(&vm, &mut out, &TranscodeConfig::default()).unwrap();
    let status = out.fields().block("status").unwrap().unwrap();
    let flattened = status.blocks("conditions").unwrap();
    assert_eq!(flattened[0].get("type"), Some(&Attr::from("")));
    assert!(flattened[1].get("type").is_none());
}

/// Test: a VM missing its name is rejected
#[test]
fn test_vm_requires_name() {
    let err = expand_vm(&state(without(declarative_vm(), "name")), &TranscodeConfig::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::MissingField(ref f) if f == "name"));
}

/// Test: a transport VM flattens into schema-checked state
#[test]
fn test_flatten_transport_vm() {
    let vm: ClusterVirtualMachine = serde_yaml::from_str(
        r#"
metadata:
  name: db-01
spec:
  running: true
  template:
    spec:
      domain:
        cpu:
          cores: 2
        devices:
          interfaces:
            - name: default
              bridge: {}
"#,
    )
    .unwrap();

    let mut out = ResourceData::new().with_schema(VM_KEYS.iter().copied());
    flatten_vm(&vm, &mut out, &TranscodeConfig::default()).unwrap();

    assert_eq!(out.get("namespace"), Some(&Attr::from("default")));
    assert_eq!(out.get("run_on_launch"), Some(&Attr::Bool(true)));
    assert!(out.get("run_strategy").is_none());
    let cpu = out.fields().block("cpu").unwrap().unwrap();
    assert_eq!(cpu.int("cores").unwrap(), Some(2));
    let interface = &out.fields().blocks("interface").unwrap()[0];
    assert_eq!(
        interface.str("interface_binding_method").unwrap(),
        Some("InterfaceBridge")
    );
}

fn declarative_dv() -> Value {
    json!({
        "metadata": [{"name": "scratch", "labels": {"tier": "fast"}}],
        "spec": [{
            "source": [{"blank": [{}]}],
            "pvc": [{
                "access_modes": ["ReadWriteOnce"],
                "volume_mode": "Block",
                "resources": [{"requests": {"storage": "10Gi"}}]
            }],
            "content_type": "kubevirt"
        }],
        "add_volume_options": [{
            "name": "scratch",
            "disk": [{"name": "scratch", "bus": "scsi"}],
            "volume_source": [{"data_volume": [{"name": "scratch", "hotpluggable": true}]}]
        }],
        "vm_name": "web-01"
    })
}

/// Test: a declarative data volume becomes a persisted add-volume request
#[test]
fn test_expand_data_volume() {
    let config = TranscodeConfig::default();
    let entity = expand_data_volume(&state(declarative_dv()), &config).unwrap();

    assert_eq!(entity.persist, Some(true));
    let template = entity.data_volume_template.as_ref().unwrap();
    let meta = template.metadata.as_ref().unwrap();
    assert_eq!(meta.name.as_deref(), Some("scratch"));
    assert_eq!(meta.namespace.as_deref(), Some("default"));

    let spec = template.spec.as_ref().unwrap();
    assert!(spec.source.as_ref().unwrap().blank.is_some());
    assert_eq!(spec.pvc.as_ref().unwrap().volume_mode.as_deref(), Some("Block"));

    let options = entity.add_volume_options.as_ref().unwrap();
    let disk = options.disk.as_ref().unwrap();
    assert_eq!(disk.disk.as_ref().unwrap().bus.as_deref(), Some("scsi"));
}

/// Test: the data volume flattens back without touching the VM reference
#[test]
fn test_data_volume_round_trip() {
    let config = TranscodeConfig::default();
    let original = state(declarative_dv());
    let entity = expand_data_volume(&original, &config).unwrap();

    let mut out = state(json!({"vm_name": "web-01"})).with_schema(DV_KEYS.iter().copied());
    flatten_data_volume(&entity, &mut out, &config).unwrap();

    let mut expected_attrs = original.attrs().clone();
    if let Some(Attr::List(meta)) = expected_attrs.get_mut("metadata") {
        if let Some(Attr::Map(meta)) = meta.first_mut() {
            meta.insert("namespace".to_string(), Attr::from("default"));
        }
    }
    assert_eq!(
        as_lists(&normalize(out.attrs())),
        as_lists(&normalize(&expected_attrs))
    );
}

/// Test: the VM reference needs a name and defaults its namespace
#[test]
fn test_vm_reference() {
    let config = TranscodeConfig::default();
    let (name, namespace) = vm_reference(&state(declarative_dv()), &config).unwrap();
    assert_eq!((name.as_str(), namespace.as_str()), ("web-01", "default"));

    let err = vm_reference(&state(without(declarative_dv(), "vm_name")), &config).unwrap_err();
    assert!(matches!(err, ConvertError::MissingField(ref f) if f == "vm_name"));
}

/// Test: data volume content type and volume mode are validated
#[test]
fn test_data_volume_enum_validation() {
    let config = TranscodeConfig::default();

    let mut value = declarative_dv();
    value["spec"][0]["content_type"] = json!("iso");
    let err = expand_data_volume(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "spec.content_type");

    let mut value = declarative_dv();
    value["spec"][0]["pvc"][0]["volume_mode"] = json!("Raw");
    let err = expand_data_volume(&state(value), &config).unwrap_err();
    assert_eq!(err.field_path(), "spec.pvc.volume_mode");
}
