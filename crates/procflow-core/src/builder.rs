//! プロセス記述子のビルダー
//!
//! オーバーレイを指定された順に適用し、ポート環境変数を追加してから
//! ルーティング可能なプロセスのポートを検証する。

use crate::error::{ProcessError, Result};
use crate::model::{
    DeploymentVersion, EnvVar, Lifecycle, MetadataItem, MetadataKind, NodeSelectorTerm,
    ProcessDescriptor, ResourceRequirements, SecurityContext, Volume, VolumeMount,
};
use crate::ports::{PortSource, port_env_variables};
use crate::scope::apply_metadata;
use std::fmt;
use tracing::{debug, info, instrument};

/// 記述子を変更する1段分の操作
///
/// 各オーバーレイは自分の設定値だけを持ち、順番に適用される。
pub enum Overlay<'a> {
    /// None なら既定のインスタンス数のまま（0 はエラー）
    Units(Option<u32>),
    Command(Vec<String>),
    Env(Vec<EnvVar>),
    SecurityContext(Option<SecurityContext>),
    ResourceRequirements(Option<ResourceRequirements>),
    NodeSelector(Vec<NodeSelectorTerm>),
    Lifecycle(Option<Lifecycle>),
    Volumes(Vec<Volume>),
    VolumeMounts(Vec<VolumeMount>),
    PortsAndProbes(&'a dyn PortSource),
    Labels {
        items: Vec<MetadataItem>,
        version: DeploymentVersion,
    },
    Annotations {
        items: Vec<MetadataItem>,
        version: DeploymentVersion,
    },
}

impl Overlay<'_> {
    /// オーバーレイを記述子に適用する
    pub fn apply(&self, process: &mut ProcessDescriptor) -> Result<()> {
        match self {
            Overlay::Units(units) => match units {
                Some(0) => {
                    return Err(ProcessError::InvalidConfig(format!(
                        "プロセス '{}' のユニット数は1以上が必要です",
                        process.name()
                    )));
                }
                Some(units) => process.instance_count = *units,
                None => {}
            },
            Overlay::Command(cmd) => process.command = cmd.clone(),
            Overlay::Env(envs) => process.environment = envs.clone(),
            Overlay::SecurityContext(ctx) => process.security_context = ctx.clone(),
            Overlay::ResourceRequirements(rr) => process.resource_requirements = rr.clone(),
            Overlay::NodeSelector(terms) => process.node_selector = terms.clone(),
            Overlay::Lifecycle(lc) => process.lifecycle_hooks = lc.clone(),
            Overlay::Volumes(volumes) => process.volumes = volumes.clone(),
            Overlay::VolumeMounts(mounts) => process.volume_mounts = mounts.clone(),
            Overlay::PortsAndProbes(source) => wire_ports_and_probes(process, *source)?,
            Overlay::Labels { items, version } => {
                apply_metadata(process, items, MetadataKind::Label, *version)?
            }
            Overlay::Annotations { items, version } => {
                apply_metadata(process, items, MetadataKind::Annotation, *version)?
            }
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        match self {
            Overlay::Units(_) => "units",
            Overlay::Command(_) => "command",
            Overlay::Env(_) => "env",
            Overlay::SecurityContext(_) => "security-context",
            Overlay::ResourceRequirements(_) => "resources",
            Overlay::NodeSelector(_) => "node-selector",
            Overlay::Lifecycle(_) => "lifecycle",
            Overlay::Volumes(_) => "volumes",
            Overlay::VolumeMounts(_) => "volume-mounts",
            Overlay::PortsAndProbes(_) => "ports-and-probes",
            Overlay::Labels { .. } => "labels",
            Overlay::Annotations { .. } => "annotations",
        }
    }
}

impl fmt::Debug for Overlay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Port Source からポートを取得し、両方揃っていればプローブも設定する
fn wire_ports_and_probes(process: &mut ProcessDescriptor, source: &dyn PortSource) -> Result<()> {
    process.service_ports = source.service_ports_for_process(process.name());
    process.container_ports = source.container_ports_for_process(process.name());
    if !process.has_open_port() {
        return Ok(());
    }
    let probes = source.probes()?;
    process.public_service_port = process.service_ports.first().map(|p| p.port);
    process.readiness_probe = probes.readiness;
    process.liveness_probe = probes.liveness;
    process.startup_probe = probes.startup;
    Ok(())
}

/// オーバーレイを順に適用してプロセス記述子を作成する
///
/// 1つでも失敗すればその場で中断し、途中の記述子は返さない。
/// ルーティング可能なプロセスはコンテナポートとサービスポートが必須。
#[instrument(skip(name, overlays), fields(process = %name.as_ref()))]
pub fn new_process<'a>(
    name: impl AsRef<str>,
    routable: bool,
    overlays: impl IntoIterator<Item = Overlay<'a>>,
) -> Result<ProcessDescriptor> {
    let mut process = ProcessDescriptor::new(name.as_ref(), routable);

    for overlay in overlays {
        debug!(overlay = ?overlay, "Applying overlay");
        overlay.apply(&mut process)?;
    }

    let derived = port_env_variables(process.name(), &process.container_ports);
    process.environment.extend(derived);

    if process.is_routable() && !process.has_open_port() {
        return Err(ProcessError::MissingPorts {
            process: process.name().to_string(),
        });
    }

    info!(
        container_ports = process.container_ports.len(),
        service_ports = process.service_ports.len(),
        env = process.environment.len(),
        "Process descriptor built"
    );
    Ok(process)
}
