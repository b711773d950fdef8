//! Observed VM status
//!
//! Condition `type`/`status` and state-change `action` distinguish an absent
//! value from an empty string, so they bypass the empty-as-absent getters.

use super::{expand_block, expand_blocks, flatten_opt, int_field};
use crate::codec::validate_rfc3339;
use crate::error::{ConvertError, Result};
use crate::state::{Attr, AttrMap, Fields, MapBuilder};
use crate::transport::vm::*;

/// String value that keeps an explicit empty string
fn raw_string(fields: &Fields<'_>, key: &str) -> Result<Option<String>> {
    match fields.get(key) {
        None => Ok(None),
        Some(Attr::Str(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConvertError::TypeMismatch {
            field: key.to_string(),
            expected: "string",
        }),
    }
}

fn raw_str(builder: MapBuilder, key: &str, value: Option<&str>) -> MapBuilder {
    match value {
        Some(value) => builder.set(key, value),
        None => builder,
    }
}

fn timestamp(fields: &Fields<'_>, key: &str) -> Result<Option<String>> {
    let value = fields.string(key)?;
    if let Some(value) = &value {
        validate_rfc3339(key, value)?;
    }
    Ok(value)
}

pub fn expand_status(fields: &Fields<'_>) -> Result<VmStatus> {
    Ok(VmStatus {
        created: fields.bool("created")?,
        ready: fields.bool("ready")?,
        printable_status: fields.string("printable_status")?,
        conditions: expand_blocks(fields, "conditions", expand_condition)?,
        state_change_requests: expand_blocks(fields, "state_change_requests", |request| {
            Ok(VmStateChangeRequest {
                action: raw_string(request, "action")?,
                data: request.string_map("data")?,
                uid: request.string("uid")?,
            })
        })?,
        restore_in_progress: fields.string("restore_in_progress")?,
        snapshot_in_progress: fields.string("snapshot_in_progress")?,
        start_failure: expand_block(fields, "start_failure", |failure| {
            Ok(VmStartFailure {
                consecutive_fail_count: int_field(failure, "consecutive_fail_count")?,
                last_failed_vmi_uid: failure.string("last_failed_vmi_uid")?,
                retry_after_timestamp: timestamp(failure, "retry_after_timestamp")?,
            })
        })?,
        observed_generation: fields.int("observed_generation")?,
        desired_generation: fields.int("desired_generation")?,
    })
}

fn expand_condition(fields: &Fields<'_>) -> Result<VmCondition> {
    Ok(VmCondition {
        type_: raw_string(fields, "type")?,
        status: raw_string(fields, "status")?,
        reason: fields.string("reason")?,
        message: fields.string("message")?,
        last_probe_time: timestamp(fields, "last_probe_time")?,
        last_transition_time: timestamp(fields, "last_transition_time")?,
    })
}

pub fn flatten_status(status: &VmStatus) -> AttrMap {
    let conditions = status
        .conditions
        .iter()
        .map(|condition| {
            let builder = raw_str(MapBuilder::new(), "type", condition.type_.as_deref());
            raw_str(builder, "status", condition.status.as_deref())
                .str("reason", condition.reason.as_deref())
                .str("message", condition.message.as_deref())
                .str("last_probe_time", condition.last_probe_time.as_deref())
                .str("last_transition_time", condition.last_transition_time.as_deref())
                .build()
        })
        .collect();

    let requests = status
        .state_change_requests
        .iter()
        .map(|request| {
            raw_str(MapBuilder::new(), "action", request.action.as_deref())
                .string_map("data", &request.data)
                .str("uid", request.uid.as_deref())
                .build()
        })
        .collect();

    MapBuilder::new()
        .bool("created", status.created)
        .bool("ready", status.ready)
        .str("printable_status", status.printable_status.as_deref())
        .blocks("conditions", conditions)
        .blocks("state_change_requests", requests)
        .str("restore_in_progress", status.restore_in_progress.as_deref())
        .str("snapshot_in_progress", status.snapshot_in_progress.as_deref())
        .block(
            "start_failure",
            flatten_opt(status.start_failure.as_ref(), |failure| {
                MapBuilder::new()
                    .int("consecutive_fail_count", failure.consecutive_fail_count)
                    .str("last_failed_vmi_uid", failure.last_failed_vmi_uid.as_deref())
                    .str("retry_after_timestamp", failure.retry_after_timestamp.as_deref())
                    .build()
            }),
        )
        .int("observed_generation", status.observed_generation)
        .int("desired_generation", status.desired_generation)
        .build()
}
