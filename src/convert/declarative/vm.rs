//! Virtual machine resource
//!
//! The declarative VM is flat: metadata, run flags, domain, scheduling,
//! volumes and networks all sit at the top level of the resource (see
//! [`VM_KEYS`]). Only `status` and the nested structures are blocks.

use super::data_volume::{expand_template, flatten_template};
use super::devices::{expand_devices, flatten_devices};
use super::domain::*;
use super::metadata::{expand_metadata, flatten_metadata, MetadataOptions};
use super::probe::{expand_probe, flatten_probe};
use super::scheduling::*;
use super::status::{expand_status, flatten_status};
use super::volume::{expand_network, expand_volume, flatten_network, flatten_volume};
use super::{expand_block, expand_blocks, flatten_opt, try_flatten_list, try_flatten_opt};
use crate::codec::filter_reserved;
use crate::config::TranscodeConfig;
use crate::crd::virtual_machine::RunStrategy;
use crate::error::{Result, ResultExt};
use crate::state::{Attr, AttrMap, Fields, MapBuilder, StagedState, StateReader, StateWriter};
use crate::transport::domain::{VmDomainSpec, VmMachine};
use crate::transport::metadata::VmObjectMeta;
use crate::transport::vm::*;
use tracing::debug;

/// Top-level keys of the declarative VM, in staging order
pub const VM_KEYS: &[&str] = &[
    "name",
    "namespace",
    "generate_name",
    "labels",
    "annotations",
    "resource_version",
    "uid",
    "generation",
    "run_on_launch",
    "run_strategy",
    "instancetype",
    "preference",
    "data_volume_templates",
    "template_labels",
    "template_annotations",
    "cpu",
    "memory",
    "resources",
    "firmware",
    "features",
    "clock",
    "chassis",
    "launch_security",
    "io_threads_policy",
    "machine_type",
    "disk",
    "interface",
    "gpu",
    "host_device",
    "input",
    "autoattach_pod_interface",
    "node_selector",
    "affinity",
    "scheduler_name",
    "tolerations",
    "eviction_strategy",
    "termination_grace_period_seconds",
    "priority_class_name",
    "liveness_probe",
    "readiness_probe",
    "volume",
    "network",
    "hostname",
    "subdomain",
    "dns_policy",
    "pod_dns_config",
    "status",
];

/// Run strategy emitted when `run_on_launch` is false
const MANUAL: &str = "Manual";

/// Read a declarative VM into its transport shape
pub fn expand_vm<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<ClusterVirtualMachine> {
    let fields = state.fields();
    let metadata = expand_metadata(&fields, MetadataOptions::top_level(config))?;

    let vm = ClusterVirtualMachine {
        spec: Some(expand_spec(&fields)?),
        status: expand_block(&fields, "status", expand_status)?,
        metadata: Some(metadata),
    };

    debug!(
        name = ?vm.metadata.as_ref().and_then(|m| m.name.as_deref()),
        "Expanded virtual machine"
    );
    Ok(vm)
}

fn expand_spec(fields: &Fields<'_>) -> Result<VmSpec> {
    let run_strategy = fields.string("run_strategy")?;
    if let Some(strategy) = &run_strategy {
        RunStrategy::parse(strategy).for_field("run_strategy")?;
    }
    let (running, run_strategy) = match (run_strategy, fields.bool("run_on_launch")?) {
        (Some(strategy), _) => (None, Some(strategy)),
        (None, Some(true)) => (Some(true), None),
        (None, Some(false)) => (None, Some(MANUAL.to_string())),
        (None, None) => (None, None),
    };

    let template_meta = VmObjectMeta {
        labels: fields.string_map("template_labels")?,
        annotations: fields.string_map("template_annotations")?,
        ..Default::default()
    };

    Ok(VmSpec {
        running,
        run_strategy,
        template: Some(VmTemplateSpec {
            metadata: (template_meta != VmObjectMeta::default()).then_some(template_meta),
            spec: Some(expand_instance_spec(fields)?),
        }),
        data_volume_templates: expand_blocks(fields, "data_volume_templates", expand_template)?,
        instancetype: expand_block(fields, "instancetype", expand_matcher)?,
        preference: expand_block(fields, "preference", expand_matcher)?,
    })
}

fn expand_matcher(fields: &Fields<'_>) -> Result<VmInstancetypeMatcher> {
    Ok(VmInstancetypeMatcher {
        name: fields.string("name")?,
        kind: fields.string("kind")?,
        revision_name: fields.string("revision_name")?,
        infer_from_volume: fields.string("infer_from_volume")?,
    })
}

fn flatten_matcher(matcher: &VmInstancetypeMatcher) -> AttrMap {
    MapBuilder::new()
        .str("name", matcher.name.as_deref())
        .str("kind", matcher.kind.as_deref())
        .str("revision_name", matcher.revision_name.as_deref())
        .str("infer_from_volume", matcher.infer_from_volume.as_deref())
        .build()
}

fn expand_domain(fields: &Fields<'_>) -> Result<Option<VmDomainSpec>> {
    let domain = VmDomainSpec {
        resources: expand_block(fields, "resources", expand_resources)?,
        cpu: expand_block(fields, "cpu", expand_cpu)?,
        memory: expand_block(fields, "memory", expand_memory)?,
        machine: fields
            .string("machine_type")?
            .map(|type_| VmMachine { type_: Some(type_) }),
        firmware: expand_block(fields, "firmware", expand_firmware)?,
        features: expand_block(fields, "features", expand_features)?,
        clock: expand_block(fields, "clock", expand_clock)?,
        chassis: expand_block(fields, "chassis", expand_chassis)?,
        launch_security: expand_block(fields, "launch_security", expand_launch_security)?,
        io_threads_policy: expand_io_threads_policy(fields)?,
        devices: expand_devices(fields)?,
    };
    Ok((domain != VmDomainSpec::default()).then_some(domain))
}

fn expand_instance_spec(fields: &Fields<'_>) -> Result<VmInstanceSpec> {
    Ok(VmInstanceSpec {
        priority_class_name: fields.string("priority_class_name")?,
        domain: expand_domain(fields)?,
        node_selector: fields.string_map("node_selector")?,
        affinity: expand_block(fields, "affinity", expand_affinity)?,
        scheduler_name: fields.string("scheduler_name")?,
        tolerations: expand_blocks(fields, "tolerations", expand_toleration)?,
        eviction_strategy: fields.string("eviction_strategy")?,
        termination_grace_period_seconds: fields.int("termination_grace_period_seconds")?,
        volumes: expand_blocks(fields, "volume", expand_volume)?,
        liveness_probe: expand_block(fields, "liveness_probe", expand_probe)?,
        readiness_probe: expand_block(fields, "readiness_probe", expand_probe)?,
        hostname: fields.string("hostname")?,
        subdomain: fields.string("subdomain")?,
        networks: expand_blocks(fields, "network", expand_network)?,
        dns_policy: fields.string("dns_policy")?,
        dns_config: expand_block(fields, "pod_dns_config", expand_dns_config)?,
    })
}

/// Write a transport VM into declarative state
///
/// Nothing reaches `state` unless the whole VM converts.
pub fn flatten_vm<W: StateWriter + ?Sized>(
    vm: &ClusterVirtualMachine,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    let mut attrs = flatten_attrs(vm, config)?;

    let mut staged = StagedState::new();
    for key in VM_KEYS {
        if let Some(value) = attrs.remove(*key) {
            staged.stage(key, value);
        }
    }
    debug!(
        name = ?vm.metadata.as_ref().and_then(|m| m.name.as_deref()),
        keys = staged.len(),
        "Flattened virtual machine"
    );
    staged.commit(state)
}

fn flatten_attrs(vm: &ClusterVirtualMachine, config: &TranscodeConfig) -> Result<AttrMap> {
    let default_meta = VmObjectMeta::default();
    let metadata = vm.metadata.as_ref().unwrap_or(&default_meta);
    let mut attrs = flatten_metadata(metadata, config, Some(config.default_namespace()));

    if let Some(spec) = &vm.spec {
        attrs.extend(flatten_spec(spec, config).for_field("spec")?);
    }
    if let Some(status) = &vm.status {
        attrs.insert("status".to_string(), Attr::block(flatten_status(status)));
    }
    Ok(attrs)
}

fn run_on_launch(spec: &VmSpec) -> Option<bool> {
    match (spec.running, spec.run_strategy.as_deref()) {
        (Some(running), _) => Some(running),
        (None, Some(MANUAL)) => Some(false),
        _ => None,
    }
}

fn flatten_spec(spec: &VmSpec, config: &TranscodeConfig) -> Result<AttrMap> {
    let templates = try_flatten_list(&spec.data_volume_templates, "data_volume_templates", |t| {
        flatten_template(t, config)
    })?;

    let mut attrs = MapBuilder::new()
        .bool("run_on_launch", run_on_launch(spec))
        .str("run_strategy", spec.run_strategy.as_deref())
        .block("instancetype", flatten_opt(spec.instancetype.as_ref(), flatten_matcher))
        .block("preference", flatten_opt(spec.preference.as_ref(), flatten_matcher))
        .blocks("data_volume_templates", templates)
        .build();

    if let Some(template) = &spec.template {
        if let Some(meta) = &template.metadata {
            attrs.extend(
                MapBuilder::new()
                    .string_map("template_labels", &meta.labels)
                    .string_map(
                        "template_annotations",
                        &filter_reserved(&meta.annotations, config),
                    )
                    .build(),
            );
        }
        if let Some(instance) = &template.spec {
            attrs.extend(flatten_instance_spec(instance).for_field("template")?);
        }
    }
    Ok(attrs)
}

fn flatten_domain(domain: &VmDomainSpec) -> Result<AttrMap> {
    let mut attrs = MapBuilder::new()
        .block("cpu", flatten_opt(domain.cpu.as_ref(), flatten_cpu))
        .block("memory", flatten_opt(domain.memory.as_ref(), flatten_memory))
        .block("resources", flatten_opt(domain.resources.as_ref(), flatten_resources))
        .block(
            "firmware",
            try_flatten_opt(domain.firmware.as_ref(), "firmware", flatten_firmware)?,
        )
        .block("features", flatten_opt(domain.features.as_ref(), flatten_features))
        .block("clock", try_flatten_opt(domain.clock.as_ref(), "clock", flatten_clock)?)
        .block("chassis", flatten_opt(domain.chassis.as_ref(), flatten_chassis))
        .block(
            "launch_security",
            flatten_opt(domain.launch_security.as_ref(), flatten_launch_security),
        )
        .str("io_threads_policy", domain.io_threads_policy.as_deref())
        .str(
            "machine_type",
            domain.machine.as_ref().and_then(|m| m.type_.as_deref()),
        )
        .build();

    if let Some(devices) = &domain.devices {
        for (key, value) in flatten_devices(devices)? {
            attrs.insert(key.to_string(), value);
        }
    }
    Ok(attrs)
}

fn flatten_instance_spec(spec: &VmInstanceSpec) -> Result<AttrMap> {
    let tolerations = spec.tolerations.iter().map(flatten_toleration).collect();
    let volumes = try_flatten_list(&spec.volumes, "volume", flatten_volume)?;
    let networks = try_flatten_list(&spec.networks, "network", flatten_network)?;

    let mut attrs = MapBuilder::new()
        .str("priority_class_name", spec.priority_class_name.as_deref())
        .string_map("node_selector", &spec.node_selector)
        .block("affinity", flatten_opt(spec.affinity.as_ref(), flatten_affinity))
        .str("scheduler_name", spec.scheduler_name.as_deref())
        .blocks("tolerations", tolerations)
        .str("eviction_strategy", spec.eviction_strategy.as_deref())
        .int(
            "termination_grace_period_seconds",
            spec.termination_grace_period_seconds,
        )
        .blocks("volume", volumes)
        .block(
            "liveness_probe",
            try_flatten_opt(spec.liveness_probe.as_ref(), "liveness_probe", flatten_probe)?,
        )
        .block(
            "readiness_probe",
            try_flatten_opt(spec.readiness_probe.as_ref(), "readiness_probe", flatten_probe)?,
        )
        .str("hostname", spec.hostname.as_deref())
        .str("subdomain", spec.subdomain.as_deref())
        .blocks("network", networks)
        .str("dns_policy", spec.dns_policy.as_deref())
        .block(
            "pod_dns_config",
            flatten_opt(spec.dns_config.as_ref(), flatten_dns_config),
        )
        .build();

    if let Some(domain) = &spec.domain {
        attrs.extend(flatten_domain(domain).for_field("domain")?);
    }
    Ok(attrs)
}
