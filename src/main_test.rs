#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use clap::CommandFactory;
use serde_json::json;

fn declarative_vm() -> Value {
    json!({
        "name": "web-01",
        "namespace": "apps",
        "run_on_launch": true,
        "cpu": [{"cores": 4}],
        "disk": [{"name": "boot", "disk_device": [{"disk": [{"bus": "virtio"}]}]}],
        "volume": [{"name": "boot", "volume_source": [{"data_volume": [{"name": "boot-dv"}]}]}]
    })
}

/// Test: the argument definitions are consistent
#[test]
fn test_cli_definition() {
    Args::command().debug_assert();
}

/// Test: model and kind flags parse, kind defaults to vm
#[test]
fn test_parse_args() {
    let args = Args::try_parse_from(["vmtranscode", "--from", "declarative", "--to", "platform"]).unwrap();

    assert_eq!(args.from, Model::Declarative);
    assert_eq!(args.to, Model::Platform);
    assert_eq!(args.kind, Kind::Vm);
    assert!(args.input.is_none());

    let args = Args::try_parse_from([
        "vmtranscode",
        "--from",
        "transport",
        "--to",
        "declarative",
        "--kind",
        "dv",
        "dv.json",
    ])
    .unwrap();
    assert_eq!(args.kind, Kind::Dv);
    assert_eq!(args.input, Some(PathBuf::from("dv.json")));
}

/// Test: an unknown model is rejected by the parser
#[test]
fn test_parse_args_unknown_model() {
    let result = Args::try_parse_from(["vmtranscode", "--from", "terraform", "--to", "platform"]);
    assert!(result.is_err());
}

/// Test: a declarative VM comes out as a platform VirtualMachine
#[test]
fn test_transcode_declarative_to_platform() {
    let config = TranscodeConfig::default();

    let output = transcode(
        Model::Declarative,
        Model::Platform,
        Kind::Vm,
        declarative_vm(),
        &config,
    )
    .unwrap();

    assert_eq!(output["apiVersion"], "kubevirt.io/v1");
    assert_eq!(output["kind"], "VirtualMachine");
    assert_eq!(output["spec"]["running"], true);
    let spec = &output["spec"]["template"]["spec"];
    assert_eq!(spec["domain"]["cpu"]["cores"], 4);
    assert_eq!(spec["domain"]["devices"]["disks"][0]["disk"]["bus"], "virtio");
    assert_eq!(spec["volumes"][0]["dataVolume"]["name"], "boot-dv");
}

/// Test: platform output read back into the declarative model matches the input
#[test]
fn test_transcode_platform_back_to_declarative() {
    let config = TranscodeConfig::default();
    let platform = transcode(
        Model::Declarative,
        Model::Platform,
        Kind::Vm,
        declarative_vm(),
        &config,
    )
    .unwrap();

    let back = transcode(Model::Platform, Model::Declarative, Kind::Vm, platform, &config).unwrap();

    assert_eq!(back, declarative_vm());
}

/// Test: a transport data volume is written as declarative state
#[test]
fn test_transcode_data_volume() {
    let config = TranscodeConfig::default();
    let entity = json!({
        "dataVolumeTemplate": {
            "metadata": {"name": "scratch", "namespace": "apps"},
            "spec": {"source": {"blank": {}}}
        },
        "persist": true
    });

    let output = transcode(Model::Transport, Model::Declarative, Kind::Dv, entity, &config).unwrap();

    assert_eq!(output["metadata"][0]["name"], "scratch");
    assert_eq!(output["metadata"][0]["namespace"], "apps");
    assert!(output["spec"][0]["source"][0]["blank"].is_array());
    assert!(output.get("vm_name").is_none());
}

/// Test: conversion errors name the direction that failed
#[test]
fn test_transcode_error_context() {
    let config = TranscodeConfig::default();
    let input = json!({"namespace": "apps"});

    let err = transcode(Model::Declarative, Model::Transport, Kind::Vm, input, &config).unwrap_err();

    assert!(err.to_string().contains("Declarative"));
    let root = err.root_cause().to_string();
    assert!(root.contains("name"), "unexpected root cause: {root}");
}
