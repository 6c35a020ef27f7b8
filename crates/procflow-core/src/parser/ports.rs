//! ポート・ヘルスチェックノードのパース

use super::{arguments, required_name, string_arguments, string_property, to_u16, to_u32};
use crate::error::{ProcessError, Result};
use crate::model::{
    ExecAction, HttpGetAction, Probe, ProbeHandler, Probes, Protocol, TcpSocketAction,
};
use crate::ports::PortDeclaration;
use kdl::{KdlDocument, KdlNode};

/// ports ノードをパース
///
/// ```kdl
/// ports {
///     process "web" {
///         port 80 target=8080 name="http" protocol="tcp"
///     }
/// }
/// ```
pub fn parse_port_declarations(node: &KdlNode) -> Result<Vec<(String, Vec<PortDeclaration>)>> {
    let mut result = Vec::new();
    let Some(children) = node.children() else {
        return Ok(result);
    };

    for process_node in children.nodes() {
        if process_node.name().value() != "process" {
            continue;
        }
        let name = required_name(process_node, "ports.process")?;
        let mut decls = Vec::new();
        if let Some(ports) = process_node.children() {
            for port_node in ports.nodes() {
                if port_node.name().value() == "port" {
                    decls.push(parse_port(port_node)?);
                }
            }
        }
        result.push((name, decls));
    }
    Ok(result)
}

/// port ノードをパース
///
/// サポートされる形式:
/// - 位置引数: port 80
/// - 名前付き引数: port port=80 target=8080
fn parse_port(node: &KdlNode) -> Result<PortDeclaration> {
    let port = match node.get("port").or_else(|| arguments(node).next()) {
        Some(value) => to_u16(value, "port")?,
        None => {
            return Err(ProcessError::InvalidConfig(
                "port requires a port number".to_string(),
            ));
        }
    };

    let target_port = node
        .get("target")
        .or_else(|| node.get("target_port"))
        .map(|v| to_u16(v, "target"))
        .transpose()?;

    let protocol = match string_property(node, "protocol") {
        Some(s) => Protocol::parse(&s)
            .ok_or_else(|| ProcessError::InvalidConfig(format!("未知のプロトコル: {}", s)))?,
        None => Protocol::default(),
    };

    Ok(PortDeclaration {
        name: string_property(node, "name"),
        protocol,
        port,
        target_port,
    })
}

/// exposed-ports ノードをパース（イメージが公開するポート）
pub fn parse_exposed_ports(node: &KdlNode) -> Result<Vec<u16>> {
    arguments(node).map(|v| to_u16(v, "exposed-ports")).collect()
}

/// healthcheck ノードをパース
///
/// ```kdl
/// healthcheck {
///     readiness {
///         http-get path="/healthz" port=8080
///         period 10
///     }
///     liveness {
///         tcp-socket port=8080
///     }
/// }
/// ```
pub fn parse_healthcheck(node: &KdlNode) -> Result<Probes> {
    let mut probes = Probes::default();
    let Some(children) = node.children() else {
        return Ok(probes);
    };

    for child in children.nodes() {
        let kind = child.name().value();
        let slot = match kind {
            "readiness" => &mut probes.readiness,
            "liveness" => &mut probes.liveness,
            "startup" => &mut probes.startup,
            _ => continue,
        };
        let body = child.children().ok_or_else(|| {
            ProcessError::InvalidConfig(format!("{} プローブの内容がありません", kind))
        })?;
        *slot = Some(parse_probe(body, kind)?);
    }
    Ok(probes)
}

fn parse_probe(doc: &KdlDocument, kind: &str) -> Result<Probe> {
    let mut handler = None;
    let mut initial_delay = None;
    let mut period = None;
    let mut timeout = None;
    let mut success = None;
    let mut failure = None;

    for node in doc.nodes() {
        let first = || {
            arguments(node).next().ok_or_else(|| {
                ProcessError::InvalidConfig(format!(
                    "{}.{} requires a value",
                    kind,
                    node.name().value()
                ))
            })
        };
        match node.name().value() {
            "http-get" | "http_get" => {
                let port = node.get("port").map(|v| to_u16(v, "http-get port")).transpose()?;
                handler = Some(ProbeHandler::HttpGet(HttpGetAction {
                    path: string_property(node, "path").unwrap_or_else(|| "/".to_string()),
                    port: port.unwrap_or_default(),
                    scheme: string_property(node, "scheme"),
                }));
            }
            "tcp-socket" | "tcp_socket" => {
                let port = node.get("port").map(|v| to_u16(v, "tcp-socket port")).transpose()?;
                handler = Some(ProbeHandler::TcpSocket(TcpSocketAction {
                    port: port.unwrap_or_default(),
                }));
            }
            "exec" => {
                handler = Some(ProbeHandler::Exec(ExecAction {
                    command: string_arguments(node),
                }));
            }
            "initial-delay" | "initial_delay" => {
                initial_delay = Some(to_u32(first()?, "initial-delay")?)
            }
            "period" => period = Some(to_u32(first()?, "period")?),
            "timeout" => timeout = Some(to_u32(first()?, "timeout")?),
            "success-threshold" | "success_threshold" => {
                success = Some(to_u32(first()?, "success-threshold")?)
            }
            "failure-threshold" | "failure_threshold" => {
                failure = Some(to_u32(first()?, "failure-threshold")?)
            }
            _ => {}
        }
    }

    let handler = handler.ok_or_else(|| {
        ProcessError::InvalidConfig(format!(
            "{} プローブには http-get / tcp-socket / exec のいずれかが必要です",
            kind
        ))
    })?;

    Ok(Probe {
        handler,
        initial_delay_seconds: initial_delay,
        period_seconds: period,
        timeout_seconds: timeout,
        success_threshold: success,
        failure_threshold: failure,
    })
}
