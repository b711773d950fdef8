//! Affinity, tolerations and pod DNS configuration

use super::{expand_block, expand_blocks, flatten_opt, int_field};
use crate::enums::{
    LabelSelectorOperator, NodeSelectorOperator, TolerationEffect, TolerationOperator,
};
use crate::error::{ConvertError, Result, ResultExt};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::scheduling::*;

const REQUIRED: &str = "required_during_scheduling_ignored_during_execution";
const PREFERRED: &str = "preferred_during_scheduling_ignored_during_execution";

pub fn expand_affinity(fields: &Fields<'_>) -> Result<VmAffinity> {
    Ok(VmAffinity {
        node_affinity: expand_block(fields, "node_affinity", expand_node_affinity)?,
        pod_affinity: expand_block(fields, "pod_affinity", expand_pod_affinity)?,
        pod_anti_affinity: expand_block(fields, "pod_anti_affinity", expand_pod_affinity)?,
    })
}

pub fn flatten_affinity(affinity: &VmAffinity) -> AttrMap {
    MapBuilder::new()
        .block(
            "node_affinity",
            flatten_opt(affinity.node_affinity.as_ref(), flatten_node_affinity),
        )
        .block(
            "pod_affinity",
            flatten_opt(affinity.pod_affinity.as_ref(), flatten_pod_affinity),
        )
        .block(
            "pod_anti_affinity",
            flatten_opt(affinity.pod_anti_affinity.as_ref(), flatten_pod_affinity),
        )
        .build()
}

fn expand_node_affinity(fields: &Fields<'_>) -> Result<VmNodeAffinity> {
    Ok(VmNodeAffinity {
        required_during_scheduling_ignored_during_execution: expand_block(fields, REQUIRED, |req| {
            Ok(VmNodeSelector {
                node_selector_terms: expand_blocks(req, "node_selector_term", expand_node_term)?,
            })
        })?,
        preferred_during_scheduling_ignored_during_execution: expand_blocks(
            fields,
            PREFERRED,
            |pref| {
                Ok(VmPreferredSchedulingTerm {
                    weight: int_field(pref, "weight")?,
                    preference: expand_block(pref, "preference", expand_node_term)?,
                })
            },
        )?,
    })
}

fn flatten_node_affinity(affinity: &VmNodeAffinity) -> AttrMap {
    let preferred = affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .map(|term| {
            MapBuilder::new()
                .int("weight", term.weight)
                .block("preference", flatten_opt(term.preference.as_ref(), flatten_node_term))
                .build()
        })
        .collect();

    MapBuilder::new()
        .block(
            REQUIRED,
            flatten_opt(
                affinity.required_during_scheduling_ignored_during_execution.as_ref(),
                |selector| {
                    MapBuilder::new()
                        .blocks(
                            "node_selector_term",
                            selector.node_selector_terms.iter().map(flatten_node_term).collect(),
                        )
                        .build()
                },
            ),
        )
        .blocks(PREFERRED, preferred)
        .build()
}

fn expand_node_term(fields: &Fields<'_>) -> Result<VmNodeSelectorTerm> {
    Ok(VmNodeSelectorTerm {
        match_expressions: expand_blocks(fields, "match_expressions", expand_node_requirement)?,
        match_fields: expand_blocks(fields, "match_fields", expand_node_requirement)?,
    })
}

fn expand_node_requirement(fields: &Fields<'_>) -> Result<VmNodeSelectorRequirement> {
    let operator = fields.string("operator")?;
    if let Some(operator) = &operator {
        NodeSelectorOperator::parse(operator).for_field("operator")?;
    }
    Ok(VmNodeSelectorRequirement {
        key: fields.string("key")?,
        operator,
        values: fields.strings("values")?,
    })
}

fn flatten_node_term(term: &VmNodeSelectorTerm) -> AttrMap {
    let requirement = |req: &VmNodeSelectorRequirement| {
        MapBuilder::new()
            .str("key", req.key.as_deref())
            .str("operator", req.operator.as_deref())
            .string_set("values", &req.values)
            .build()
    };
    MapBuilder::new()
        .blocks(
            "match_expressions",
            term.match_expressions.iter().map(requirement).collect(),
        )
        .blocks("match_fields", term.match_fields.iter().map(requirement).collect())
        .build()
}

fn expand_pod_affinity(fields: &Fields<'_>) -> Result<VmPodAffinity> {
    Ok(VmPodAffinity {
        required_during_scheduling_ignored_during_execution: expand_blocks(
            fields,
            REQUIRED,
            expand_pod_term,
        )?,
        preferred_during_scheduling_ignored_during_execution: expand_blocks(
            fields,
            PREFERRED,
            |pref| {
                Ok(VmWeightedPodAffinityTerm {
                    weight: int_field(pref, "weight")?,
                    pod_affinity_term: expand_block(pref, "pod_affinity_term", expand_pod_term)?,
                })
            },
        )?,
    })
}

fn flatten_pod_affinity(affinity: &VmPodAffinity) -> AttrMap {
    let preferred = affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .map(|term| {
            MapBuilder::new()
                .int("weight", term.weight)
                .block(
                    "pod_affinity_term",
                    flatten_opt(term.pod_affinity_term.as_ref(), flatten_pod_term),
                )
                .build()
        })
        .collect();

    MapBuilder::new()
        .blocks(
            REQUIRED,
            affinity
                .required_during_scheduling_ignored_during_execution
                .iter()
                .map(flatten_pod_term)
                .collect(),
        )
        .blocks(PREFERRED, preferred)
        .build()
}

fn expand_pod_term(fields: &Fields<'_>) -> Result<VmPodAffinityTerm> {
    Ok(VmPodAffinityTerm {
        label_selector: expand_block(fields, "label_selector", expand_label_selector)?,
        namespaces: fields.strings("namespaces")?,
        topology_key: fields.string("topology_key")?,
    })
}

fn flatten_pod_term(term: &VmPodAffinityTerm) -> AttrMap {
    MapBuilder::new()
        .block(
            "label_selector",
            flatten_opt(term.label_selector.as_ref(), flatten_label_selector),
        )
        .string_set("namespaces", &term.namespaces)
        .str("topology_key", term.topology_key.as_deref())
        .build()
}

pub fn expand_label_selector(fields: &Fields<'_>) -> Result<VmLabelSelector> {
    Ok(VmLabelSelector {
        match_labels: fields.string_map("match_labels")?,
        match_expressions: expand_blocks(fields, "match_expressions", |req| {
            let operator = req.string("operator")?;
            if let Some(operator) = &operator {
                LabelSelectorOperator::parse(operator).for_field("operator")?;
            }
            Ok(VmLabelSelectorRequirement {
                key: req.string("key")?,
                operator,
                values: req.strings("values")?,
            })
        })?,
    })
}

pub fn flatten_label_selector(selector: &VmLabelSelector) -> AttrMap {
    MapBuilder::new()
        .string_map("match_labels", &selector.match_labels)
        .blocks(
            "match_expressions",
            selector
                .match_expressions
                .iter()
                .map(|req| {
                    MapBuilder::new()
                        .str("key", req.key.as_deref())
                        .str("operator", req.operator.as_deref())
                        .string_set("values", &req.values)
                        .build()
                })
                .collect(),
        )
        .build()
}

/// Tolerations carry `toleration_seconds` as a decimal string
pub fn expand_toleration(fields: &Fields<'_>) -> Result<VmToleration> {
    let operator = fields.string("operator")?;
    if let Some(operator) = &operator {
        TolerationOperator::parse(operator).for_field("operator")?;
    }
    let effect = fields.string("effect")?;
    if let Some(effect) = &effect {
        TolerationEffect::parse(effect).for_field("effect")?;
    }
    let toleration_seconds = fields
        .str("toleration_seconds")?
        .map(|seconds| {
            seconds.parse::<i64>().map_err(|_| ConvertError::TypeMismatch {
                field: "toleration_seconds".to_string(),
                expected: "integer string",
            })
        })
        .transpose()?;

    Ok(VmToleration {
        key: fields.string("key")?,
        operator,
        value: fields.string("value")?,
        effect,
        toleration_seconds,
    })
}

pub fn flatten_toleration(toleration: &VmToleration) -> AttrMap {
    MapBuilder::new()
        .str("key", toleration.key.as_deref())
        .str("operator", toleration.operator.as_deref())
        .str("value", toleration.value.as_deref())
        .str("effect", toleration.effect.as_deref())
        .str(
            "toleration_seconds",
            toleration.toleration_seconds.map(|s| s.to_string()).as_deref(),
        )
        .build()
}

pub fn expand_dns_config(fields: &Fields<'_>) -> Result<VmPodDnsConfig> {
    Ok(VmPodDnsConfig {
        nameservers: fields.strings("nameservers")?,
        searches: fields.strings("searches")?,
        options: expand_blocks(fields, "option", |option| {
            Ok(VmPodDnsConfigOption {
                name: option.string("name")?,
                value: option.string("value")?,
            })
        })?,
    })
}

pub fn flatten_dns_config(config: &VmPodDnsConfig) -> AttrMap {
    MapBuilder::new()
        .strings("nameservers", &config.nameservers)
        .strings("searches", &config.searches)
        .blocks(
            "option",
            config
                .options
                .iter()
                .map(|option| {
                    MapBuilder::new()
                        .str("name", option.name.as_deref())
                        .str("value", option.value.as_deref())
                        .build()
                })
                .collect(),
        )
        .build()
}
