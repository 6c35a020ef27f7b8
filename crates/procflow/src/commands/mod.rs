pub mod build;
pub mod export;
pub mod validate;

use anyhow::Context;
use clap::ValueEnum;
use procflow_core::{DeploymentVersion, ProcessDescriptor};
use std::path::PathBuf;

/// 記述子の出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// 設定ファイルのパスを決定（指定がなければ自動検出）
pub fn resolve_config(config: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match config {
        Some(path) => Ok(path),
        None => {
            procflow_config::find_config_file().context("設定ファイルの検出に失敗しました")
        }
    }
}

/// プロセス記述子を作成
pub fn build_descriptor(
    process: &str,
    config: Option<PathBuf>,
    deployment_version: Option<u32>,
) -> anyhow::Result<ProcessDescriptor> {
    let path = resolve_config(config)?;
    let version = deployment_version.map(DeploymentVersion);
    procflow_core::load_process(&path, process, version)
        .with_context(|| format!("プロセス '{}' の作成に失敗しました", process))
}

/// 記述子を指定形式の文字列に変換
pub fn render(descriptor: &ProcessDescriptor, format: OutputFormat) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Yaml => serde_yaml::to_string(descriptor)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(descriptor)?;
            json.push('\n');
            json
        }
    };
    Ok(output)
}
