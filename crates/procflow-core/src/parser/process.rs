//! プロセスノードのパース

use super::{
    arguments, bool_property, first_string, required_name, string_arguments, string_property,
    to_i64, to_u16, to_u32, value_to_string,
};
use crate::app::ProcessSpec;
use crate::error::{ProcessError, Result};
use crate::model::{
    EnvVar, Lifecycle, LifecycleHandler, NodeSelectorOperator, NodeSelectorRequirement,
    NodeSelectorTerm, ResourceRequirements, SecurityContext, Volume, VolumeMount, VolumeSource,
};
use kdl::{KdlDocument, KdlNode};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// process ノードをパース
///
/// ```kdl
/// process "web" routable=#true {
///     command "bundle" "exec" "puma"
///     units 3
///     env {
///         RAILS_ENV "production"
///     }
///     volume "data" pvc="data-claim"
///     volume-mount "data" path="/var/data" read-only=#true
/// }
/// ```
pub fn parse_process(node: &KdlNode) -> Result<ProcessSpec> {
    let mut spec = ProcessSpec {
        name: required_name(node, "process")?,
        routable: bool_property(node, "routable").unwrap_or(false),
        ..Default::default()
    };

    let Some(children) = node.children() else {
        return Ok(spec);
    };

    for child in children.nodes() {
        match child.name().value() {
            "command" | "cmd" => {
                spec.command = string_arguments(child);
            }
            "units" | "instances" => {
                if let Some(value) = arguments(child).next() {
                    let units = to_u32(value, "units")?;
                    if units == 0 {
                        return Err(ProcessError::InvalidConfig(format!(
                            "プロセス '{}' の units は 1 以上である必要があります",
                            spec.name
                        )));
                    }
                    spec.units = Some(units);
                }
            }
            "routable" => {
                spec.routable = arguments(child)
                    .next()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
            }
            // env と environment 両方をサポート
            "environment" | "env" => {
                if let Some(envs) = child.children() {
                    for env_node in envs.nodes() {
                        let value = arguments(env_node)
                            .next()
                            .and_then(value_to_string)
                            .unwrap_or_default();
                        spec.env.push(EnvVar::new(env_node.name().value(), value));
                    }
                } else if let Some(val) = first_string(child)
                    && let Some((k, v)) = val.split_once('=')
                {
                    // フラットな env "KEY=VALUE" 形式
                    spec.env.push(EnvVar::new(k.trim(), v.trim()));
                }
            }
            "security-context" | "security_context" => {
                spec.security_context = Some(parse_security_context(child)?);
            }
            "resources" => {
                if let Some(body) = child.children() {
                    spec.resources = Some(parse_resources(body));
                }
            }
            "node-selector" | "node_selector" => {
                if let Some(body) = child.children() {
                    spec.node_selector = parse_node_selector(body)?;
                }
            }
            "volume" => {
                spec.volumes.push(parse_volume(child)?);
            }
            "volume-mount" | "volume_mount" => {
                spec.volume_mounts.push(parse_volume_mount(child)?);
            }
            "lifecycle" => {
                if let Some(body) = child.children() {
                    spec.lifecycle = Some(parse_lifecycle(body)?);
                }
            }
            _ => {}
        }
    }

    Ok(spec)
}

fn parse_security_context(node: &KdlNode) -> Result<SecurityContext> {
    Ok(SecurityContext {
        run_as_user: node
            .get("run-as-user")
            .map(|v| to_i64(v, "run-as-user"))
            .transpose()?,
        run_as_group: node
            .get("run-as-group")
            .map(|v| to_i64(v, "run-as-group"))
            .transpose()?,
        run_as_non_root: bool_property(node, "run-as-non-root"),
        privileged: bool_property(node, "privileged"),
        read_only_root_filesystem: bool_property(node, "read-only-root-filesystem"),
        allow_privilege_escalation: bool_property(node, "allow-privilege-escalation"),
    })
}

/// resources ブロックをパース
fn parse_resources(doc: &KdlDocument) -> ResourceRequirements {
    let mut resources = ResourceRequirements::default();

    for node in doc.nodes() {
        let target = match node.name().value() {
            "limits" => &mut resources.limits,
            "requests" => &mut resources.requests,
            _ => continue,
        };
        if let Some(quantities) = node.children() {
            for q in quantities.nodes() {
                if let Some(value) = arguments(q).next().and_then(value_to_string) {
                    target.insert(q.name().value().to_string(), value);
                }
            }
        }
    }
    resources
}

/// node-selector ブロックをパース
///
/// ```kdl
/// node-selector {
///     term {
///         expression key="disktype" operator="In" "ssd" "nvme"
///         expression key="zone" operator="NotIn" {
///             values "us-east-1a"
///         }
///     }
/// }
/// ```
fn parse_node_selector(doc: &KdlDocument) -> Result<Vec<NodeSelectorTerm>> {
    let mut terms = Vec::new();

    for term_node in doc.nodes() {
        if term_node.name().value() != "term" {
            continue;
        }
        let mut term = NodeSelectorTerm::default();
        if let Some(exprs) = term_node.children() {
            for expr in exprs.nodes() {
                if expr.name().value() != "expression" {
                    continue;
                }
                let key = string_property(expr, "key").ok_or_else(|| {
                    ProcessError::InvalidConfig("expression requires key".to_string())
                })?;
                let op_str = string_property(expr, "operator").unwrap_or_else(|| "In".to_string());
                let operator = NodeSelectorOperator::parse(&op_str).ok_or_else(|| {
                    ProcessError::InvalidConfig(format!("未知のオペレーター: {}", op_str))
                })?;
                let mut values = string_arguments(expr);
                if let Some(children) = expr.children() {
                    for child in children.nodes() {
                        if child.name().value() == "values" {
                            values.extend(string_arguments(child));
                        }
                    }
                }
                if values.is_empty()
                    && matches!(operator, NodeSelectorOperator::In | NodeSelectorOperator::NotIn)
                {
                    return Err(ProcessError::InvalidConfig(format!(
                        "expression '{}' ({}) requires at least one value",
                        key, op_str
                    )));
                }
                term.match_expressions.push(NodeSelectorRequirement {
                    key,
                    operator,
                    values,
                });
            }
        }
        terms.push(term);
    }
    Ok(terms)
}

/// volume ノードをパース
///
/// ソースは pvc / config-map / secret / host-path / empty-dir のいずれか1つ。
fn parse_volume(node: &KdlNode) -> Result<Volume> {
    let name = required_name(node, "volume")?;

    let source = if let Some(claim) = string_property(node, "pvc") {
        VolumeSource::PersistentVolumeClaim { claim_name: claim }
    } else if let Some(cm) = string_property(node, "config-map") {
        VolumeSource::ConfigMap { name: cm }
    } else if let Some(secret) = string_property(node, "secret") {
        VolumeSource::Secret {
            secret_name: secret,
        }
    } else if let Some(path) = string_property(node, "host-path") {
        VolumeSource::HostPath {
            path: PathBuf::from(path),
        }
    } else {
        VolumeSource::EmptyDir {}
    };

    Ok(Volume { name, source })
}

/// volume-mount ノードをパース
fn parse_volume_mount(node: &KdlNode) -> Result<VolumeMount> {
    let name = required_name(node, "volume-mount")?;
    let mount_path = string_property(node, "path").ok_or_else(|| {
        ProcessError::InvalidConfig(format!("volume-mount '{}' requires path", name))
    })?;

    Ok(VolumeMount {
        name,
        mount_path: PathBuf::from(mount_path),
        read_only: bool_property(node, "read-only").unwrap_or(false),
        sub_path: string_property(node, "sub-path"),
    })
}

/// lifecycle ブロックをパース
fn parse_lifecycle(doc: &KdlDocument) -> Result<Lifecycle> {
    let mut lifecycle = Lifecycle::default();

    for node in doc.nodes() {
        let slot = match node.name().value() {
            "post-start" | "post_start" => &mut lifecycle.post_start,
            "pre-stop" | "pre_stop" => &mut lifecycle.pre_stop,
            _ => continue,
        };
        let Some(body) = node.children() else {
            continue;
        };
        for handler in body.nodes() {
            match handler.name().value() {
                "exec" => {
                    *slot = Some(LifecycleHandler::Exec {
                        command: string_arguments(handler),
                    });
                }
                "http-get" | "http_get" => {
                    let port = match handler.get("port") {
                        Some(v) => to_u16(v, "http-get port")?,
                        None => {
                            return Err(ProcessError::InvalidConfig(
                                "lifecycle http-get requires port".to_string(),
                            ));
                        }
                    };
                    *slot = Some(LifecycleHandler::HttpGet {
                        path: string_property(handler, "path").unwrap_or_else(|| "/".to_string()),
                        port,
                    });
                }
                _ => {}
            }
        }
    }
    Ok(lifecycle)
}
