//! ポートとプローブの供給、およびポート環境変数の導出

use crate::error::Result;
use crate::model::{ContainerPort, EnvVar, Probes, Protocol, ServicePort};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// ポート・プローブ設定の供給元
///
/// ビルダーは値を受け取るだけで、供給元への参照は保持しない。
pub trait PortSource {
    /// プロセスのコンテナポート（返した順序が保持される）
    fn container_ports_for_process(&self, process: &str) -> Vec<ContainerPort>;
    /// プロセスのサービスポート
    fn service_ports_for_process(&self, process: &str) -> Vec<ServicePort>;
    /// ヘルスチェック設定（不正な場合はエラー）
    fn probes(&self) -> Result<Probes>;
}

/// コンテナポートを実行中のプロセスへ伝える環境変数を導出する
///
/// - ポートが1つだけなら `port` と `PORT`
/// - 1つ以上あれば `PORT_<process>` にカンマ区切りで全ポート
pub fn port_env_variables(process: &str, ports: &[ContainerPort]) -> Vec<EnvVar> {
    if ports.is_empty() {
        return Vec::new();
    }
    let mut envs = Vec::with_capacity(3);
    if let [single] = ports {
        let value = single.container_port.to_string();
        envs.push(EnvVar::new("port", value.clone()));
        envs.push(EnvVar::new("PORT", value));
    }
    let joined = ports
        .iter()
        .map(|p| p.container_port.to_string())
        .collect::<Vec<_>>()
        .join(",");
    envs.push(EnvVar::new(format!("PORT_{}", process), joined));
    envs
}

/// 設定ファイル上のポート宣言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub protocol: Protocol,
    /// Service で公開するポート
    pub port: u16,
    /// コンテナ側のポート（未指定なら port と同じ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
}

impl PortDeclaration {
    pub fn container_port(&self) -> u16 {
        self.target_port.unwrap_or(self.port)
    }
}

/// 設定ファイルに基づく PortSource
///
/// プロセスごとの宣言がなければ、イメージが公開するポートを使う。
#[derive(Debug, Clone, Default)]
pub struct PortConfig {
    pub processes: HashMap<String, Vec<PortDeclaration>>,
    pub exposed_ports: Vec<u16>,
    pub healthcheck: Probes,
}

impl PortConfig {
    fn declarations_for(&self, process: &str) -> Vec<PortDeclaration> {
        match self.processes.get(process) {
            Some(decls) if !decls.is_empty() => decls.clone(),
            _ => {
                debug!(process, exposed = ?self.exposed_ports, "Falling back to exposed ports");
                self.exposed_ports
                    .iter()
                    .map(|&port| PortDeclaration {
                        name: None,
                        protocol: Protocol::Tcp,
                        port,
                        target_port: Some(port),
                    })
                    .collect()
            }
        }
    }
}

impl PortSource for PortConfig {
    fn container_ports_for_process(&self, process: &str) -> Vec<ContainerPort> {
        let mut ports: Vec<ContainerPort> = Vec::new();
        for decl in self.declarations_for(process) {
            let number = decl.container_port();
            if ports.iter().any(|p| p.container_port == number) {
                continue;
            }
            ports.push(ContainerPort {
                name: decl.name,
                container_port: number,
                protocol: decl.protocol,
            });
        }
        ports
    }

    fn service_ports_for_process(&self, process: &str) -> Vec<ServicePort> {
        self.declarations_for(process)
            .into_iter()
            .map(|decl| ServicePort {
                target_port: Some(decl.container_port()),
                name: decl.name,
                port: decl.port,
                protocol: decl.protocol,
            })
            .collect()
    }

    fn probes(&self) -> Result<Probes> {
        self.healthcheck.validate()?;
        Ok(self.healthcheck.clone())
    }
}
