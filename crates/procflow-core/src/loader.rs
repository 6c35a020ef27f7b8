//! 統合ローダー
//!
//! 設定ファイルの読み込み、パース、記述子の作成を統合

use crate::app::AppConfig;
use crate::error::Result;
use crate::model::{DeploymentVersion, ProcessDescriptor};
use crate::parser::parse_kdl_file;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// 設定ファイルを読み込んでAppConfigを生成
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_app(path: &Path) -> Result<AppConfig> {
    debug!("Parsing config file");
    let app = parse_kdl_file(path)?;
    info!(
        app = %app.name,
        processes = app.processes.len(),
        labels = app.labels.len(),
        annotations = app.annotations.len(),
        "Config loaded"
    );
    Ok(app)
}

/// 設定ファイルから1プロセス分の記述子を作成
///
/// `version` を指定すると設定ファイルのデプロイメントバージョンより優先される。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_process(
    path: &Path,
    process: &str,
    version: Option<DeploymentVersion>,
) -> Result<ProcessDescriptor> {
    let app = load_app(path)?;
    app.build_process(process, version)
}

/// 設定ファイルの全プロセスを宣言順に作成
///
/// 失敗したプロセスがあっても残りの作成は続け、結果をプロセスごとに返す。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_all(
    path: &Path,
    version: Option<DeploymentVersion>,
) -> Result<Vec<(String, Result<ProcessDescriptor>)>> {
    let app = load_app(path)?;
    let results = app.build_all(version);
    for (name, result) in &results {
        if let Err(e) = result {
            warn!(process = %name, error = %e, "Process build failed");
        }
    }
    Ok(results)
}
