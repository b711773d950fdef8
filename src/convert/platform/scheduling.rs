//! Affinity, tolerations, DNS config and probes

use super::{map_list, non_empty, non_empty_map, required};
use crate::codec::{port_from_string, port_to_string};
use crate::crd::virtual_machine::{GuestAgentPing, Probe, ProbeHandler};
use crate::error::{ConvertError, Result, ResultExt};
use crate::transport::scheduling::*;
use crate::transport::Marker;
use crate::union;
use k8s_openapi::api::core::v1::{
    Affinity, ExecAction, HTTPGetAction, HTTPHeader, NodeAffinity, NodeSelector,
    NodeSelectorRequirement, NodeSelectorTerm, PodAffinity, PodAffinityTerm, PodAntiAffinity,
    PodDNSConfig, PodDNSConfigOption, PreferredSchedulingTerm, TCPSocketAction, Toleration,
    WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};

fn missing(field: &str) -> ConvertError {
    ConvertError::MissingField(field.to_string())
}

pub fn affinity_to_platform(affinity: &VmAffinity) -> Result<Affinity> {
    let pod_affinity = affinity
        .pod_affinity
        .as_ref()
        .map(pod_terms_to_platform)
        .transpose()
        .for_field("podAffinity")?;
    let pod_anti_affinity = affinity
        .pod_anti_affinity
        .as_ref()
        .map(pod_terms_to_platform)
        .transpose()
        .for_field("podAntiAffinity")?;

    Ok(Affinity {
        node_affinity: affinity
            .node_affinity
            .as_ref()
            .map(node_affinity_to_platform)
            .transpose()
            .for_field("nodeAffinity")?,
        pod_affinity: pod_affinity.map(|(required, preferred)| PodAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        }),
        pod_anti_affinity: pod_anti_affinity.map(|(required, preferred)| PodAntiAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        }),
    })
}

pub fn affinity_to_transport(affinity: &Affinity) -> VmAffinity {
    VmAffinity {
        node_affinity: affinity.node_affinity.as_ref().map(node_affinity_to_transport),
        pod_affinity: affinity.pod_affinity.as_ref().map(|pa| {
            pod_terms_to_transport(
                pa.required_during_scheduling_ignored_during_execution.as_deref(),
                pa.preferred_during_scheduling_ignored_during_execution.as_deref(),
            )
        }),
        pod_anti_affinity: affinity.pod_anti_affinity.as_ref().map(|pa| {
            pod_terms_to_transport(
                pa.required_during_scheduling_ignored_during_execution.as_deref(),
                pa.preferred_during_scheduling_ignored_during_execution.as_deref(),
            )
        }),
    }
}

fn node_affinity_to_platform(node: &VmNodeAffinity) -> Result<NodeAffinity> {
    Ok(NodeAffinity {
        required_during_scheduling_ignored_during_execution: node
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .map(|selector| -> Result<NodeSelector> {
                Ok(NodeSelector {
                    node_selector_terms: map_list(
                        "nodeSelectorTerms",
                        &selector.node_selector_terms,
                        node_term_to_platform,
                    )?,
                })
            })
            .transpose()?,
        preferred_during_scheduling_ignored_during_execution: non_empty(&map_list(
            "preferredDuringSchedulingIgnoredDuringExecution",
            &node.preferred_during_scheduling_ignored_during_execution,
            |term| {
                Ok(PreferredSchedulingTerm {
                    weight: term.weight.ok_or_else(|| missing("weight"))?,
                    preference: node_term_to_platform(
                        term.preference.as_ref().ok_or_else(|| missing("preference"))?,
                    )?,
                })
            },
        )?),
    })
}

fn node_affinity_to_transport(node: &NodeAffinity) -> VmNodeAffinity {
    VmNodeAffinity {
        required_during_scheduling_ignored_during_execution: node
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .map(|selector| VmNodeSelector {
                node_selector_terms: selector
                    .node_selector_terms
                    .iter()
                    .map(node_term_to_transport)
                    .collect(),
            }),
        preferred_during_scheduling_ignored_during_execution: node
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .flatten()
            .map(|term| VmPreferredSchedulingTerm {
                weight: Some(term.weight),
                preference: Some(node_term_to_transport(&term.preference)),
            })
            .collect(),
    }
}

fn node_requirement_to_platform(req: &VmNodeSelectorRequirement) -> Result<NodeSelectorRequirement> {
    Ok(NodeSelectorRequirement {
        key: required(&req.key, "key")?,
        operator: required(&req.operator, "operator")?,
        values: non_empty(&req.values),
    })
}

fn node_requirement_to_transport(req: &NodeSelectorRequirement) -> VmNodeSelectorRequirement {
    VmNodeSelectorRequirement {
        key: Some(req.key.clone()),
        operator: Some(req.operator.clone()),
        values: req.values.clone().unwrap_or_default(),
    }
}

fn node_term_to_platform(term: &VmNodeSelectorTerm) -> Result<NodeSelectorTerm> {
    Ok(NodeSelectorTerm {
        match_expressions: non_empty(&map_list(
            "matchExpressions",
            &term.match_expressions,
            node_requirement_to_platform,
        )?),
        match_fields: non_empty(&map_list(
            "matchFields",
            &term.match_fields,
            node_requirement_to_platform,
        )?),
    })
}

fn node_term_to_transport(term: &NodeSelectorTerm) -> VmNodeSelectorTerm {
    VmNodeSelectorTerm {
        match_expressions: term
            .match_expressions
            .iter()
            .flatten()
            .map(node_requirement_to_transport)
            .collect(),
        match_fields: term
            .match_fields
            .iter()
            .flatten()
            .map(node_requirement_to_transport)
            .collect(),
    }
}

type PodTerms = (Option<Vec<PodAffinityTerm>>, Option<Vec<WeightedPodAffinityTerm>>);

fn pod_terms_to_platform(affinity: &VmPodAffinity) -> Result<PodTerms> {
    let required = map_list(
        "requiredDuringSchedulingIgnoredDuringExecution",
        &affinity.required_during_scheduling_ignored_during_execution,
        pod_term_to_platform,
    )?;
    let preferred = map_list(
        "preferredDuringSchedulingIgnoredDuringExecution",
        &affinity.preferred_during_scheduling_ignored_during_execution,
        |term| {
            Ok(WeightedPodAffinityTerm {
                weight: term.weight.ok_or_else(|| missing("weight"))?,
                pod_affinity_term: pod_term_to_platform(
                    term.pod_affinity_term
                        .as_ref()
                        .ok_or_else(|| missing("podAffinityTerm"))?,
                )
                .for_field("podAffinityTerm")?,
            })
        },
    )?;
    Ok((non_empty(&required), non_empty(&preferred)))
}

fn pod_terms_to_transport(
    required: Option<&[PodAffinityTerm]>,
    preferred: Option<&[WeightedPodAffinityTerm]>,
) -> VmPodAffinity {
    VmPodAffinity {
        required_during_scheduling_ignored_during_execution: required
            .unwrap_or_default()
            .iter()
            .map(pod_term_to_transport)
            .collect(),
        preferred_during_scheduling_ignored_during_execution: preferred
            .unwrap_or_default()
            .iter()
            .map(|term| VmWeightedPodAffinityTerm {
                weight: Some(term.weight),
                pod_affinity_term: Some(pod_term_to_transport(&term.pod_affinity_term)),
            })
            .collect(),
    }
}

fn pod_term_to_platform(term: &VmPodAffinityTerm) -> Result<PodAffinityTerm> {
    Ok(PodAffinityTerm {
        label_selector: term
            .label_selector
            .as_ref()
            .map(label_selector_to_platform)
            .transpose()
            .for_field("labelSelector")?,
        namespaces: non_empty(&term.namespaces),
        topology_key: required(&term.topology_key, "topologyKey")?,
        ..Default::default()
    })
}

fn pod_term_to_transport(term: &PodAffinityTerm) -> VmPodAffinityTerm {
    VmPodAffinityTerm {
        label_selector: term.label_selector.as_ref().map(label_selector_to_transport),
        namespaces: term.namespaces.clone().unwrap_or_default(),
        topology_key: Some(term.topology_key.clone()),
    }
}

pub fn label_selector_to_platform(selector: &VmLabelSelector) -> Result<LabelSelector> {
    Ok(LabelSelector {
        match_labels: non_empty_map(&selector.match_labels),
        match_expressions: non_empty(&map_list(
            "matchExpressions",
            &selector.match_expressions,
            |req| {
                Ok(LabelSelectorRequirement {
                    key: required(&req.key, "key")?,
                    operator: required(&req.operator, "operator")?,
                    values: non_empty(&req.values),
                })
            },
        )?),
    })
}

pub fn label_selector_to_transport(selector: &LabelSelector) -> VmLabelSelector {
    VmLabelSelector {
        match_labels: selector.match_labels.clone().unwrap_or_default(),
        match_expressions: selector
            .match_expressions
            .iter()
            .flatten()
            .map(|req| VmLabelSelectorRequirement {
                key: Some(req.key.clone()),
                operator: Some(req.operator.clone()),
                values: req.values.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

pub fn toleration_to_platform(toleration: &VmToleration) -> Toleration {
    Toleration {
        key: toleration.key.clone(),
        operator: toleration.operator.clone(),
        value: toleration.value.clone(),
        effect: toleration.effect.clone(),
        toleration_seconds: toleration.toleration_seconds,
    }
}

pub fn toleration_to_transport(toleration: &Toleration) -> VmToleration {
    VmToleration {
        key: toleration.key.clone(),
        operator: toleration.operator.clone(),
        value: toleration.value.clone(),
        effect: toleration.effect.clone(),
        toleration_seconds: toleration.toleration_seconds,
    }
}

pub fn dns_config_to_platform(config: &VmPodDnsConfig) -> PodDNSConfig {
    PodDNSConfig {
        nameservers: non_empty(&config.nameservers),
        searches: non_empty(&config.searches),
        options: non_empty(
            &config
                .options
                .iter()
                .map(|o| PodDNSConfigOption {
                    name: o.name.clone(),
                    value: o.value.clone(),
                })
                .collect::<Vec<_>>(),
        ),
    }
}

pub fn dns_config_to_transport(config: &PodDNSConfig) -> VmPodDnsConfig {
    VmPodDnsConfig {
        nameservers: config.nameservers.clone().unwrap_or_default(),
        searches: config.searches.clone().unwrap_or_default(),
        options: config
            .options
            .iter()
            .flatten()
            .map(|o| VmPodDnsConfigOption {
                name: o.name.clone(),
                value: o.value.clone(),
            })
            .collect(),
    }
}

pub fn probe_to_platform(probe: &VmProbe) -> Result<Probe> {
    let handler = union::map_variant(
        "probe_handler",
        [
            (
                "exec",
                probe.exec.as_ref().map(|exec| -> Result<ProbeHandler> {
                    Ok(ProbeHandler {
                        exec: Some(ExecAction {
                            command: non_empty(&exec.command),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "http_get",
                probe.http_get.as_ref().map(|http| -> Result<ProbeHandler> {
                    let port = http.port.as_deref().ok_or_else(|| missing("port"))?;
                    Ok(ProbeHandler {
                        http_get: Some(HTTPGetAction {
                            path: http.path.clone(),
                            port: port_from_string(port),
                            host: http.host.clone(),
                            scheme: http.scheme.clone(),
                            http_headers: non_empty(&map_list("httpHeaders", &http.http_headers, |h| {
                                Ok(HTTPHeader {
                                    name: required(&h.name, "name")?,
                                    value: h.value.clone().unwrap_or_default(),
                                })
                            })?),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "tcp_socket",
                probe.tcp_socket.as_ref().map(|tcp| -> Result<ProbeHandler> {
                    let port = tcp.port.as_deref().ok_or_else(|| missing("port"))?;
                    Ok(ProbeHandler {
                        tcp_socket: Some(TCPSocketAction {
                            port: port_from_string(port),
                            host: tcp.host.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "guest_agent_ping",
                probe.guest_agent_ping.as_ref().map(|_| -> Result<ProbeHandler> {
                    Ok(ProbeHandler {
                        guest_agent_ping: Some(GuestAgentPing {}),
                        ..Default::default()
                    })
                }),
            ),
        ],
    )?;

    Ok(Probe {
        handler: handler.unwrap_or_default(),
        initial_delay_seconds: probe.initial_delay_seconds,
        timeout_seconds: probe.timeout_seconds,
        period_seconds: probe.period_seconds,
        success_threshold: probe.success_threshold,
        failure_threshold: probe.failure_threshold,
    })
}

pub fn probe_to_transport(probe: &Probe) -> Result<VmProbe> {
    let handler = &probe.handler;
    union::variant(
        "probe_handler",
        [
            ("exec", handler.exec.is_some()),
            ("http_get", handler.http_get.is_some()),
            ("tcp_socket", handler.tcp_socket.is_some()),
            ("guest_agent_ping", handler.guest_agent_ping.is_some()),
        ],
    )?;

    Ok(VmProbe {
        exec: handler.exec.as_ref().map(|exec| VmExecAction {
            command: exec.command.clone().unwrap_or_default(),
        }),
        http_get: handler.http_get.as_ref().map(|http| VmHttpGetAction {
            path: http.path.clone(),
            port: Some(port_to_string(&http.port)),
            host: http.host.clone(),
            scheme: http.scheme.clone(),
            http_headers: http
                .http_headers
                .iter()
                .flatten()
                .map(|h| VmHttpHeader {
                    name: Some(h.name.clone()),
                    value: Some(h.value.clone()),
                })
                .collect(),
        }),
        tcp_socket: handler.tcp_socket.as_ref().map(|tcp| VmTcpSocketAction {
            port: Some(port_to_string(&tcp.port)),
            host: tcp.host.clone(),
        }),
        guest_agent_ping: handler.guest_agent_ping.as_ref().map(|_| Marker {}),
        initial_delay_seconds: probe.initial_delay_seconds,
        timeout_seconds: probe.timeout_seconds,
        period_seconds: probe.period_seconds,
        success_threshold: probe.success_threshold,
        failure_threshold: probe.failure_threshold,
    })
}
