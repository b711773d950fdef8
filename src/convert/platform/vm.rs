//! Virtual machine mapping

use super::data_volume::{template_to_platform, template_to_transport};
use super::domain::{domain_to_platform, domain_to_transport};
use super::metadata::{metadata_to_platform, metadata_to_transport};
use super::scheduling::*;
use super::volume::{network_to_platform, network_to_transport, volume_to_platform, volume_to_transport};
use super::{map_list, non_empty, non_empty_map};
use crate::convert::bridge::bridge;
use crate::crd::domain::DomainSpec;
use crate::crd::virtual_machine::*;
use crate::error::{ConvertError, Result, ResultExt};
use crate::transport::vm::*;
use tracing::{debug, warn};

pub fn vm_to_platform(vm: &ClusterVirtualMachine) -> Result<VirtualMachine> {
    let spec = vm
        .spec
        .as_ref()
        .ok_or_else(|| ConvertError::MissingField("spec".to_string()))?;

    let converted = VirtualMachine {
        metadata: vm
            .metadata
            .as_ref()
            .map(metadata_to_platform)
            .transpose()
            .for_field("metadata")?
            .unwrap_or_default(),
        spec: spec_to_platform(spec).for_field("spec")?,
        status: vm
            .status
            .as_ref()
            .map(|status| bridge::<_, VirtualMachineStatus>("status", status))
            .transpose()?,
    };

    debug!(name = ?converted.metadata.name, "Converted virtual machine to platform");
    Ok(converted)
}

pub fn vm_to_transport(vm: &VirtualMachine) -> Result<ClusterVirtualMachine> {
    let converted = ClusterVirtualMachine {
        metadata: Some(metadata_to_transport(&vm.metadata).for_field("metadata")?),
        spec: Some(spec_to_transport(&vm.spec).for_field("spec")?),
        status: vm
            .status
            .as_ref()
            .map(|status| bridge::<_, VmStatus>("status", status))
            .transpose()?,
    };

    debug!(name = ?vm.metadata.name, "Converted virtual machine to transport");
    Ok(converted)
}

fn spec_to_platform(spec: &VmSpec) -> Result<VirtualMachineSpec> {
    if spec.running.is_some() && spec.run_strategy.is_some() {
        warn!("Both running and runStrategy are set; the platform will reject one of them");
    }

    Ok(VirtualMachineSpec {
        running: spec.running,
        run_strategy: spec
            .run_strategy
            .as_deref()
            .map(RunStrategy::parse)
            .transpose()
            .for_field("runStrategy")?,
        template: spec
            .template
            .as_ref()
            .map(template_spec_to_platform)
            .transpose()
            .for_field("template")?
            .unwrap_or_default(),
        data_volume_templates: non_empty(&map_list(
            "dataVolumeTemplates",
            &spec.data_volume_templates,
            template_to_platform,
        )?),
        instancetype: spec.instancetype.as_ref().map(matcher_to_platform),
        preference: spec.preference.as_ref().map(matcher_to_platform),
    })
}

fn spec_to_transport(spec: &VirtualMachineSpec) -> Result<VmSpec> {
    Ok(VmSpec {
        running: spec.running,
        run_strategy: spec.run_strategy.map(|s| s.to_string()),
        template: (spec.template != VirtualMachineInstanceTemplateSpec::default())
            .then(|| template_spec_to_transport(&spec.template))
            .transpose()
            .for_field("template")?,
        data_volume_templates: map_list(
            "dataVolumeTemplates",
            spec.data_volume_templates.as_deref().unwrap_or_default(),
            template_to_transport,
        )?,
        instancetype: spec.instancetype.as_ref().map(matcher_to_transport),
        preference: spec.preference.as_ref().map(matcher_to_transport),
    })
}

fn matcher_to_platform(matcher: &VmInstancetypeMatcher) -> InstancetypeMatcher {
    InstancetypeMatcher {
        name: matcher.name.clone(),
        kind: matcher.kind.clone(),
        revision_name: matcher.revision_name.clone(),
        infer_from_volume: matcher.infer_from_volume.clone(),
    }
}

fn matcher_to_transport(matcher: &InstancetypeMatcher) -> VmInstancetypeMatcher {
    VmInstancetypeMatcher {
        name: matcher.name.clone(),
        kind: matcher.kind.clone(),
        revision_name: matcher.revision_name.clone(),
        infer_from_volume: matcher.infer_from_volume.clone(),
    }
}

fn template_spec_to_platform(template: &VmTemplateSpec) -> Result<VirtualMachineInstanceTemplateSpec> {
    Ok(VirtualMachineInstanceTemplateSpec {
        metadata: template
            .metadata
            .as_ref()
            .map(metadata_to_platform)
            .transpose()
            .for_field("metadata")?,
        spec: template
            .spec
            .as_ref()
            .map(instance_spec_to_platform)
            .transpose()
            .for_field("spec")?,
    })
}

fn template_spec_to_transport(template: &VirtualMachineInstanceTemplateSpec) -> Result<VmTemplateSpec> {
    Ok(VmTemplateSpec {
        metadata: template
            .metadata
            .as_ref()
            .map(metadata_to_transport)
            .transpose()
            .for_field("metadata")?,
        spec: template
            .spec
            .as_ref()
            .map(instance_spec_to_transport)
            .transpose()
            .for_field("spec")?,
    })
}

fn probe_opt_to_platform(probe: &Option<crate::transport::scheduling::VmProbe>, field: &str) -> Result<Option<Probe>> {
    probe.as_ref().map(probe_to_platform).transpose().for_field(field)
}

pub fn instance_spec_to_platform(spec: &VmInstanceSpec) -> Result<VirtualMachineInstanceSpec> {
    Ok(VirtualMachineInstanceSpec {
        priority_class_name: spec.priority_class_name.clone(),
        domain: spec
            .domain
            .as_ref()
            .map(domain_to_platform)
            .transpose()
            .for_field("domain")?
            .unwrap_or_default(),
        node_selector: non_empty_map(&spec.node_selector),
        affinity: spec
            .affinity
            .as_ref()
            .map(affinity_to_platform)
            .transpose()
            .for_field("affinity")?,
        scheduler_name: spec.scheduler_name.clone(),
        tolerations: non_empty(
            &spec
                .tolerations
                .iter()
                .map(toleration_to_platform)
                .collect::<Vec<_>>(),
        ),
        eviction_strategy: spec.eviction_strategy.clone(),
        termination_grace_period_seconds: spec.termination_grace_period_seconds,
        volumes: non_empty(&map_list("volumes", &spec.volumes, volume_to_platform)?),
        liveness_probe: probe_opt_to_platform(&spec.liveness_probe, "livenessProbe")?,
        readiness_probe: probe_opt_to_platform(&spec.readiness_probe, "readinessProbe")?,
        hostname: spec.hostname.clone(),
        subdomain: spec.subdomain.clone(),
        networks: non_empty(&map_list("networks", &spec.networks, network_to_platform)?),
        dns_policy: spec.dns_policy.clone(),
        dns_config: spec.dns_config.as_ref().map(dns_config_to_platform),
    })
}

pub fn instance_spec_to_transport(spec: &VirtualMachineInstanceSpec) -> Result<VmInstanceSpec> {
    Ok(VmInstanceSpec {
        priority_class_name: spec.priority_class_name.clone(),
        domain: (spec.domain != DomainSpec::default())
            .then(|| domain_to_transport(&spec.domain))
            .transpose()
            .for_field("domain")?,
        node_selector: spec.node_selector.clone().unwrap_or_default(),
        affinity: spec.affinity.as_ref().map(affinity_to_transport),
        scheduler_name: spec.scheduler_name.clone(),
        tolerations: spec
            .tolerations
            .iter()
            .flatten()
            .map(toleration_to_transport)
            .collect(),
        eviction_strategy: spec.eviction_strategy.clone(),
        termination_grace_period_seconds: spec.termination_grace_period_seconds,
        volumes: map_list(
            "volumes",
            spec.volumes.as_deref().unwrap_or_default(),
            volume_to_transport,
        )?,
        liveness_probe: spec
            .liveness_probe
            .as_ref()
            .map(probe_to_transport)
            .transpose()
            .for_field("livenessProbe")?,
        readiness_probe: spec
            .readiness_probe
            .as_ref()
            .map(probe_to_transport)
            .transpose()
            .for_field("readinessProbe")?,
        hostname: spec.hostname.clone(),
        subdomain: spec.subdomain.clone(),
        networks: map_list(
            "networks",
            spec.networks.as_deref().unwrap_or_default(),
            network_to_transport,
        )?,
        dns_policy: spec.dns_policy.clone(),
        dns_config: spec.dns_config.as_ref().map(dns_config_to_transport),
    })
}
