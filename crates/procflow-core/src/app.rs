//! アプリケーション設定
//!
//! 設定ファイルから読み込んだ宣言を、プロセスごとのオーバーレイ列に変換します。

use crate::builder::{Overlay, new_process};
use crate::error::{ProcessError, Result};
use crate::model::{
    DeploymentVersion, EnvVar, Lifecycle, MetadataItem, NodeSelectorTerm, ProcessDescriptor,
    ResourceRequirements, SecurityContext, Volume, VolumeMount,
};
use crate::ports::PortConfig;
use tracing::debug;

/// App - アプリケーション全体の宣言
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// アプリケーション名
    pub name: String,
    /// 現在のデプロイメントバージョン
    pub deployment_version: DeploymentVersion,
    /// 宣言順のプロセス一覧
    pub processes: Vec<ProcessSpec>,
    /// ポート・ヘルスチェック設定
    pub ports: PortConfig,
    /// ラベルのオーバーレイ（宣言順）
    pub labels: Vec<MetadataItem>,
    /// アノテーションのオーバーレイ（宣言順）
    pub annotations: Vec<MetadataItem>,
}

/// プロセス単位の宣言
#[derive(Debug, Clone, Default)]
pub struct ProcessSpec {
    pub name: String,
    pub routable: bool,
    pub command: Vec<String>,
    pub units: Option<u32>,
    pub env: Vec<EnvVar>,
    pub security_context: Option<SecurityContext>,
    pub resources: Option<ResourceRequirements>,
    pub node_selector: Vec<NodeSelectorTerm>,
    pub lifecycle: Option<Lifecycle>,
    pub volumes: Vec<Volume>,
    pub volume_mounts: Vec<VolumeMount>,
}

impl AppConfig {
    /// 名前でプロセスを探す
    pub fn process(&self, name: &str) -> Option<&ProcessSpec> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// プロセスに適用するオーバーレイ列を組み立てる
    ///
    /// ポートの設定後にラベル、最後にアノテーションを適用する。
    pub fn overlays<'a>(
        &'a self,
        spec: &ProcessSpec,
        version: DeploymentVersion,
    ) -> Vec<Overlay<'a>> {
        vec![
            Overlay::Units(spec.units),
            Overlay::Command(spec.command.clone()),
            Overlay::Env(spec.env.clone()),
            Overlay::SecurityContext(spec.security_context.clone()),
            Overlay::ResourceRequirements(spec.resources.clone()),
            Overlay::NodeSelector(spec.node_selector.clone()),
            Overlay::Lifecycle(spec.lifecycle.clone()),
            Overlay::Volumes(spec.volumes.clone()),
            Overlay::VolumeMounts(spec.volume_mounts.clone()),
            Overlay::PortsAndProbes(&self.ports),
            Overlay::Labels {
                items: self.labels.clone(),
                version,
            },
            Overlay::Annotations {
                items: self.annotations.clone(),
                version,
            },
        ]
    }

    /// 1プロセス分の記述子を作成する
    ///
    /// `version` を指定すると設定ファイルのデプロイメントバージョンより優先される。
    pub fn build_process(
        &self,
        name: &str,
        version: Option<DeploymentVersion>,
    ) -> Result<ProcessDescriptor> {
        let spec = self
            .process(name)
            .ok_or_else(|| ProcessError::ProcessNotFound(name.to_string()))?;
        let version = version.unwrap_or(self.deployment_version);
        debug!(app = %self.name, process = name, %version, "Building process");
        new_process(&spec.name, spec.routable, self.overlays(spec, version))
    }

    /// 全プロセスを宣言順に作成する（結果はプロセスごと）
    pub fn build_all(
        &self,
        version: Option<DeploymentVersion>,
    ) -> Vec<(String, Result<ProcessDescriptor>)> {
        self.processes
            .iter()
            .map(|p| (p.name.clone(), self.build_process(&p.name, version)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Target;
    use crate::ports::PortDeclaration;

    fn sample_app() -> AppConfig {
        let mut ports = PortConfig::default();
        ports.processes.insert(
            "web".to_string(),
            vec![PortDeclaration {
                name: Some("http".to_string()),
                protocol: Default::default(),
                port: 80,
                target_port: Some(8080),
            }],
        );
        AppConfig {
            name: "shop".to_string(),
            deployment_version: DeploymentVersion(2),
            processes: vec![
                ProcessSpec {
                    name: "web".to_string(),
                    routable: true,
                    command: vec!["puma".to_string()],
                    units: Some(3),
                    env: vec![EnvVar::new("RAILS_ENV", "production")],
                    ..Default::default()
                },
                ProcessSpec {
                    name: "worker".to_string(),
                    command: vec!["sidekiq".to_string()],
                    ..Default::default()
                },
            ],
            ports,
            labels: vec![
                MetadataItem::new(Target::Deployment)
                    .with_version(2)
                    .set("release", "two"),
            ],
            annotations: vec![
                MetadataItem::new(Target::Pod)
                    .with_process("worker")
                    .set("queue", "default"),
            ],
        }
    }

    #[test]
    fn test_build_routable_process() {
        let app = sample_app();
        let web = app.build_process("web", None).unwrap();
        assert_eq!(web.instance_count, 3);
        assert_eq!(web.public_service_port, Some(80));
        assert_eq!(web.container_ports[0].container_port, 8080);
        assert_eq!(web.env_value("PORT"), Some("8080"));
        assert_eq!(web.deployment_metadata.labels["release"], "two");
        assert!(web.pod_metadata.annotations.is_empty());
    }

    #[test]
    fn test_version_override() {
        let app = sample_app();
        let web = app.build_process("web", Some(DeploymentVersion(3))).unwrap();
        assert!(web.deployment_metadata.labels.is_empty());
    }

    #[test]
    fn test_build_unknown_process() {
        let err = sample_app().build_process("clock", None).unwrap_err();
        assert!(matches!(err, ProcessError::ProcessNotFound(ref n) if n == "clock"));
    }

    #[test]
    fn test_build_all_keeps_declaration_order() {
        let results = sample_app().build_all(None);
        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["web", "worker"]);

        let worker = results[1].1.as_ref().unwrap();
        assert_eq!(worker.pod_metadata.annotations["queue"], "default");
        assert!(worker.container_ports.is_empty());
    }
}
