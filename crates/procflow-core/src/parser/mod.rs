//! KDLパーサー
//!
//! procflowのKDL設定ファイルをパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod metadata;
mod ports;
mod process;

use metadata::parse_metadata_items;
use ports::{parse_exposed_ports, parse_healthcheck, parse_port_declarations};
use process::parse_process;

use crate::app::AppConfig;
use crate::error::{ProcessError, Result};
use crate::model::DeploymentVersion;
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてAppConfigを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| ProcessError::IoError {
        path: path.as_ref().to_path_buf(),
        message: e.to_string(),
    })?;
    let name = path
        .as_ref()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// KDL文字列をパース
///
/// `app` ノードがなければ `default_name` をアプリケーション名に使う。
/// `app` ノードを書く場合は名前が必須。
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<AppConfig> {
    let doc: KdlDocument = content.parse()?;

    let mut app = AppConfig {
        name: default_name,
        ..Default::default()
    };

    for node in doc.nodes() {
        match node.name().value() {
            "app" => {
                app.name = required_name(node, "app")?;
                if let Some(version) = node.get("version") {
                    app.deployment_version = DeploymentVersion(to_u32(version, "app version")?);
                }
            }
            "process" => {
                let spec = parse_process(node)?;
                if app.process(&spec.name).is_some() {
                    return Err(ProcessError::InvalidConfig(format!(
                        "プロセス '{}' が重複しています",
                        spec.name
                    )));
                }
                app.processes.push(spec);
            }
            "ports" => {
                for (process, decls) in parse_port_declarations(node)? {
                    app.ports.processes.entry(process).or_default().extend(decls);
                }
            }
            "exposed-ports" | "exposed_ports" => {
                app.ports.exposed_ports.extend(parse_exposed_ports(node)?);
            }
            "healthcheck" => {
                app.ports.healthcheck = parse_healthcheck(node)?;
            }
            "labels" => {
                app.labels.extend(parse_metadata_items(node)?);
            }
            "annotations" => {
                app.annotations.extend(parse_metadata_items(node)?);
            }
            _ => {}
        }
    }

    Ok(app)
}

/// 位置引数だけを取り出す（プロパティは除く）
pub(crate) fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

/// 最初の位置引数を文字列として取得
pub(crate) fn first_string(node: &KdlNode) -> Option<String> {
    arguments(node)
        .next()
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// 名前付きノードの名前を取得（必須）
pub(crate) fn required_name(node: &KdlNode, kind: &str) -> Result<String> {
    first_string(node)
        .ok_or_else(|| ProcessError::InvalidConfig(format!("{} requires a name", kind)))
}

/// 文字列の位置引数をすべて取得
pub(crate) fn string_arguments(node: &KdlNode) -> Vec<String> {
    arguments(node)
        .filter_map(|v| v.as_string().map(|s| s.to_string()))
        .collect()
}

/// プロパティを文字列として取得
pub(crate) fn string_property(node: &KdlNode, key: &str) -> Option<String> {
    node.get(key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// プロパティを真偽値として取得
pub(crate) fn bool_property(node: &KdlNode, key: &str) -> Option<bool> {
    node.get(key).and_then(|v| v.as_bool())
}

pub(crate) fn to_u16(value: &KdlValue, what: &str) -> Result<u16> {
    value
        .as_integer()
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| ProcessError::InvalidConfig(format!("{} は 0〜65535 の整数です: {}", what, value)))
}

pub(crate) fn to_u32(value: &KdlValue, what: &str) -> Result<u32> {
    value
        .as_integer()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ProcessError::InvalidConfig(format!("{} は 0 以上の整数です: {}", what, value)))
}

pub(crate) fn to_i64(value: &KdlValue, what: &str) -> Result<i64> {
    value
        .as_integer()
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| ProcessError::InvalidConfig(format!("{} は整数です: {}", what, value)))
}

/// 値を文字列として取得（数値・真偽値も文字列化する）
pub(crate) fn value_to_string(value: &KdlValue) -> Option<String> {
    if let Some(s) = value.as_string() {
        Some(s.to_string())
    } else if let Some(i) = value.as_integer() {
        Some(i.to_string())
    } else {
        value.as_bool().map(|b| b.to_string())
    }
}
