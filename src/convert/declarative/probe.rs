//! Liveness and readiness probes

use super::{expand_block, expand_blocks, flatten_opt, int_ok_field};
use crate::error::{ConvertError, Result};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::scheduling::*;
use crate::transport::Marker;
use crate::union;

pub fn expand_probe(fields: &Fields<'_>) -> Result<VmProbe> {
    let exec = fields.block("exec")?;
    let http_get = fields.block("http_get")?;
    let tcp_socket = fields.block("tcp_socket")?;
    let guest_agent_ping = fields.block("guest_agent_ping")?;
    union::variant(
        "probe_handler",
        [
            ("exec", exec.is_some()),
            ("http_get", http_get.is_some()),
            ("tcp_socket", tcp_socket.is_some()),
            ("guest_agent_ping", guest_agent_ping.is_some()),
        ],
    )?;

    Ok(VmProbe {
        exec: expand_block(fields, "exec", |exec| {
            Ok(VmExecAction {
                command: exec.strings("command")?,
            })
        })?,
        http_get: expand_block(fields, "http_get", expand_http_get)?,
        tcp_socket: expand_block(fields, "tcp_socket", |tcp| {
            Ok(VmTcpSocketAction {
                port: Some(required_port(tcp)?),
                host: tcp.string("host")?,
            })
        })?,
        guest_agent_ping: guest_agent_ping.map(|_| Marker {}),
        initial_delay_seconds: int_ok_field(fields, "initial_delay_seconds")?,
        timeout_seconds: int_ok_field(fields, "timeout_seconds")?,
        period_seconds: int_ok_field(fields, "period_seconds")?,
        success_threshold: int_ok_field(fields, "success_threshold")?,
        failure_threshold: int_ok_field(fields, "failure_threshold")?,
    })
}

/// A port is a number or a named container port
fn required_port(fields: &Fields<'_>) -> Result<String> {
    fields
        .string("port")?
        .ok_or_else(|| ConvertError::MissingField("port".to_string()))
}

fn expand_http_get(fields: &Fields<'_>) -> Result<VmHttpGetAction> {
    Ok(VmHttpGetAction {
        path: fields.string("path")?,
        port: Some(required_port(fields)?),
        host: fields.string("host")?,
        scheme: fields.string("scheme")?,
        http_headers: expand_blocks(fields, "http_header", |header| {
            Ok(VmHttpHeader {
                name: header.string("name")?,
                value: header.string("value")?,
            })
        })?,
    })
}

pub fn flatten_probe(probe: &VmProbe) -> Result<AttrMap> {
    union::variant(
        "probe_handler",
        [
            ("exec", probe.exec.is_some()),
            ("http_get", probe.http_get.is_some()),
            ("tcp_socket", probe.tcp_socket.is_some()),
            ("guest_agent_ping", probe.guest_agent_ping.is_some()),
        ],
    )?;

    Ok(MapBuilder::new()
        .block(
            "exec",
            flatten_opt(probe.exec.as_ref(), |exec| {
                MapBuilder::new().strings("command", &exec.command).build()
            }),
        )
        .block("http_get", flatten_opt(probe.http_get.as_ref(), flatten_http_get))
        .block(
            "tcp_socket",
            flatten_opt(probe.tcp_socket.as_ref(), |tcp| {
                MapBuilder::new()
                    .str("port", tcp.port.as_deref())
                    .str("host", tcp.host.as_deref())
                    .build()
            }),
        )
        .block(
            "guest_agent_ping",
            probe.guest_agent_ping.map(|_| AttrMap::new()),
        )
        .int("initial_delay_seconds", probe.initial_delay_seconds)
        .int("timeout_seconds", probe.timeout_seconds)
        .int("period_seconds", probe.period_seconds)
        .int("success_threshold", probe.success_threshold)
        .int("failure_threshold", probe.failure_threshold)
        .build())
}

fn flatten_http_get(http: &VmHttpGetAction) -> AttrMap {
    MapBuilder::new()
        .str("path", http.path.as_deref())
        .str("port", http.port.as_deref())
        .str("host", http.host.as_deref())
        .str("scheme", http.scheme.as_deref())
        .blocks(
            "http_header",
            http.http_headers
                .iter()
                .map(|header| {
                    MapBuilder::new()
                        .str("name", header.name.as_deref())
                        .str("value", header.value.as_deref())
                        .build()
                })
                .collect(),
        )
        .build()
}
