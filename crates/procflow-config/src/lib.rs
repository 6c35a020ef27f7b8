pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "PROCFLOW_CONFIG_PATH";

/// 検索する設定ファイル名（優先順）
const CANDIDATES: [&str; 4] = [
    "procflow.local.kdl",
    ".procflow.local.kdl",
    "procflow.kdl",
    ".procflow.kdl",
];

/// procflowのグローバル設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("procflow"))
}

/// カレントディレクトリを起点に設定ファイルを探す
pub fn find_config_file() -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    find_config_file_from(&current_dir)
}

/// 指定ディレクトリを起点に設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 PROCFLOW_CONFIG_PATH (直接パス指定)
/// 2. 指定ディレクトリ: procflow.local.kdl, .procflow.local.kdl, procflow.kdl, .procflow.kdl
/// 3. ./.procflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/procflow/procflow.kdl (グローバル設定)
pub fn find_config_file_from(dir: &Path) -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            debug!(path = %path.display(), "Using config from environment variable");
            return Ok(path);
        }
        return Err(ConfigError::EnvPathNotFound(config_path));
    }

    // 2. 指定ディレクトリで検索
    if let Some(path) = first_existing(dir) {
        return Ok(path);
    }

    // 3. ./.procflow/ ディレクトリで検索
    let procflow_dir = dir.join(".procflow");
    if procflow_dir.is_dir()
        && let Some(path) = first_existing(&procflow_dir)
    {
        return Ok(path);
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("procflow.kdl");
        if global_config.exists() {
            debug!(path = %global_config.display(), "Using global config");
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}
