//! プロセス記述子

use super::metadata::ExtraMetadata;
use super::port::{ContainerPort, ServicePort};
use super::probe::Probe;
use super::runtime::{EnvVar, Lifecycle, NodeSelectorTerm, ResourceRequirements, SecurityContext};
use super::volume::{Volume, VolumeMount};
use serde::{Deserialize, Serialize};

/// インスタンス数のデフォルト値
pub const DEFAULT_INSTANCE_COUNT: u32 = 1;

/// ProcessDescriptor - 1プロセス分のデプロイ記述
///
/// アプリケーション内の1プロセス（web, worker など）を
/// Deployment / Service / Pod のマニフェストへ展開するための入力。
/// オーバーレイのパイプラインでのみ変更され、完成後は呼び出し側へ渡される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDescriptor {
    name: String,
    pub command: Vec<String>,
    pub instance_count: u32,
    routable: bool,
    pub container_ports: Vec<ContainerPort>,
    pub service_ports: Vec<ServicePort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_service_port: Option<u16>,
    pub environment: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_requirements: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_selector: Vec<NodeSelectorTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_hooks: Option<Lifecycle>,

    /// Deployment に付与するラベル・アノテーション
    #[serde(default)]
    pub deployment_metadata: ExtraMetadata,
    /// Service に付与するラベル・アノテーション
    #[serde(default)]
    pub service_metadata: ExtraMetadata,
    /// Pod に付与するラベル・アノテーション
    #[serde(default)]
    pub pod_metadata: ExtraMetadata,
}

impl ProcessDescriptor {
    /// 名前とルーティング可否だけを持つ空の記述子を作成
    pub(crate) fn new(name: impl Into<String>, routable: bool) -> Self {
        Self {
            name: name.into(),
            command: Vec::new(),
            instance_count: DEFAULT_INSTANCE_COUNT,
            routable,
            container_ports: Vec::new(),
            service_ports: Vec::new(),
            public_service_port: None,
            environment: Vec::new(),
            security_context: None,
            resource_requirements: None,
            node_selector: Vec::new(),
            volumes: Vec::new(),
            volume_mounts: Vec::new(),
            readiness_probe: None,
            liveness_probe: None,
            startup_probe: None,
            lifecycle_hooks: None,
            deployment_metadata: ExtraMetadata::default(),
            service_metadata: ExtraMetadata::default(),
            pod_metadata: ExtraMetadata::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_routable(&self) -> bool {
        self.routable
    }

    /// コンテナポートとサービスポートが両方あるか
    pub fn has_open_port(&self) -> bool {
        !self.container_ports.is_empty() && !self.service_ports.is_empty()
    }

    /// 環境変数を「最後の値が勝つ」規則で解決する
    pub fn env_value(&self, name: &str) -> Option<&str> {
        self.environment
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_descriptor_is_empty() {
        let p = ProcessDescriptor::new("web", true);
        assert_eq!(p.name(), "web");
        assert!(p.is_routable());
        assert_eq!(p.instance_count, DEFAULT_INSTANCE_COUNT);
        assert!(!p.has_open_port());
        assert!(p.deployment_metadata.is_empty());
        assert!(p.service_metadata.is_empty());
        assert!(p.pod_metadata.is_empty());
    }

    #[test]
    fn test_env_value_last_wins() {
        let mut p = ProcessDescriptor::new("web", false);
        p.environment.push(EnvVar::new("PORT", "3000"));
        p.environment.push(EnvVar::new("PORT", "8080"));
        assert_eq!(p.env_value("PORT"), Some("8080"));
        assert_eq!(p.env_value("MISSING"), None);
    }

    #[test]
    fn test_descriptor_serialization_uses_camel_case() {
        let mut p = ProcessDescriptor::new("worker", false);
        p.command = vec!["rake".to_string(), "jobs:work".to_string()];

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["name"], "worker");
        assert_eq!(json["instanceCount"], 1);
        assert_eq!(json["routable"], false);
        assert!(json["containerPorts"].as_array().unwrap().is_empty());
        assert!(json.get("publicServicePort").is_none());
        assert!(json["podMetadata"]["labels"].as_object().unwrap().is_empty());

        let back: ProcessDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
