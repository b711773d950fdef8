//! Object metadata, owner references and managed fields

use super::{map_list, non_empty, non_empty_map, required};
use crate::codec::{decode_chunks, encode_chunks, from_k8s_time, to_k8s_time};
use crate::error::{ConvertError, Result};
use crate::transport::metadata::{VmFieldsV1, VmManagedFieldsEntry, VmObjectMeta, VmOwnerReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    FieldsV1, ManagedFieldsEntry, ObjectMeta, OwnerReference,
};
use tracing::warn;

pub const OPERATION_APPLY: &str = "Apply";
pub const OPERATION_UPDATE: &str = "Update";

pub fn metadata_to_platform(meta: &VmObjectMeta) -> Result<ObjectMeta> {
    Ok(ObjectMeta {
        name: meta.name.clone(),
        generate_name: meta.generate_name.clone(),
        namespace: meta.namespace.clone(),
        labels: non_empty_map(&meta.labels),
        annotations: non_empty_map(&meta.annotations),
        resource_version: meta.resource_version.clone(),
        uid: meta.uid.clone(),
        generation: meta.generation,
        creation_timestamp: meta
            .creation_timestamp
            .as_deref()
            .map(|t| to_k8s_time("creationTimestamp", t))
            .transpose()?,
        deletion_grace_period_seconds: meta.deletion_grace_period_seconds,
        finalizers: non_empty(&meta.finalizers),
        owner_references: non_empty(&map_list(
            "ownerReferences",
            &meta.owner_references,
            owner_reference_to_platform,
        )?),
        managed_fields: non_empty(&map_list(
            "managedFields",
            &meta.managed_fields,
            managed_fields_to_platform,
        )?),
        ..Default::default()
    })
}

pub fn metadata_to_transport(meta: &ObjectMeta) -> Result<VmObjectMeta> {
    Ok(VmObjectMeta {
        name: meta.name.clone(),
        generate_name: meta.generate_name.clone(),
        namespace: meta.namespace.clone(),
        labels: meta.labels.clone().unwrap_or_default(),
        annotations: meta.annotations.clone().unwrap_or_default(),
        resource_version: meta.resource_version.clone(),
        uid: meta.uid.clone(),
        generation: meta.generation,
        creation_timestamp: meta
            .creation_timestamp
            .as_ref()
            .map(|t| from_k8s_time("creationTimestamp", t))
            .transpose()?,
        deletion_grace_period_seconds: meta.deletion_grace_period_seconds,
        finalizers: meta.finalizers.clone().unwrap_or_default(),
        owner_references: meta
            .owner_references
            .iter()
            .flatten()
            .map(owner_reference_to_transport)
            .collect(),
        managed_fields: map_list(
            "managedFields",
            meta.managed_fields.as_deref().unwrap_or_default(),
            managed_fields_to_transport,
        )?,
    })
}

fn owner_reference_to_platform(owner: &VmOwnerReference) -> Result<OwnerReference> {
    Ok(OwnerReference {
        api_version: required(&owner.api_version, "apiVersion")?,
        kind: required(&owner.kind, "kind")?,
        name: required(&owner.name, "name")?,
        uid: required(&owner.uid, "uid")?,
        controller: owner.controller,
        block_owner_deletion: owner.block_owner_deletion,
    })
}

fn owner_reference_to_transport(owner: &OwnerReference) -> VmOwnerReference {
    VmOwnerReference {
        api_version: Some(owner.api_version.clone()),
        kind: Some(owner.kind.clone()),
        name: Some(owner.name.clone()),
        uid: Some(owner.uid.clone()),
        controller: owner.controller,
        block_owner_deletion: owner.block_owner_deletion,
    }
}

/// Accept `Apply` and `Update`; anything else is treated as `Apply`
pub fn managed_fields_operation(operation: Option<&str>) -> Option<String> {
    match operation {
        None => None,
        Some(op @ (OPERATION_APPLY | OPERATION_UPDATE)) => Some(op.to_string()),
        Some(other) => {
            warn!(operation = other, "Unknown managed-fields operation, using Apply");
            Some(OPERATION_APPLY.to_string())
        }
    }
}

fn managed_fields_to_platform(entry: &VmManagedFieldsEntry) -> Result<ManagedFieldsEntry> {
    let fields_v1 = match &entry.fields_v1 {
        Some(fields) if !fields.raw.is_empty() => {
            let bytes = decode_chunks("fieldsV1", &fields.raw)?;
            let value = serde_json::from_slice(&bytes).map_err(|source| {
                ConvertError::Unmarshal {
                    what: "fieldsV1".to_string(),
                    source,
                }
            })?;
            Some(FieldsV1(value))
        }
        _ => None,
    };

    Ok(ManagedFieldsEntry {
        manager: entry.manager.clone(),
        operation: managed_fields_operation(entry.operation.as_deref()),
        api_version: entry.api_version.clone(),
        time: entry
            .time
            .as_deref()
            .map(|t| to_k8s_time("time", t))
            .transpose()?,
        fields_type: entry.fields_type.clone(),
        fields_v1,
        subresource: entry.subresource.clone(),
    })
}

fn managed_fields_to_transport(entry: &ManagedFieldsEntry) -> Result<VmManagedFieldsEntry> {
    let fields_v1 = entry
        .fields_v1
        .as_ref()
        .map(|fields| {
            serde_json::to_vec(&fields.0)
                .map(|bytes| VmFieldsV1 {
                    raw: encode_chunks(&bytes),
                })
                .map_err(|source| ConvertError::Marshal {
                    what: "fieldsV1".to_string(),
                    source,
                })
        })
        .transpose()?;

    Ok(VmManagedFieldsEntry {
        manager: entry.manager.clone(),
        operation: entry.operation.clone(),
        api_version: entry.api_version.clone(),
        time: entry
            .time
            .as_ref()
            .map(|t| from_k8s_time("time", t))
            .transpose()?,
        fields_type: entry.fields_type.clone(),
        fields_v1,
        subresource: entry.subresource.clone(),
    })
}
