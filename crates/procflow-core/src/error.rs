use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(
        "ルーティング対象のプロセス '{process}' にポートがありません\nヒント: コンテナポートとサービスポートを少なくとも1つずつ設定してください"
    )]
    MissingPorts { process: String },

    #[error(
        "無効なメタデータ項目{}: {reason}",
        key.as_ref().map(|k| format!(" '{}'", k)).unwrap_or_default()
    )]
    InvalidMetadataItem { key: Option<String>, reason: String },

    #[error("ポート設定エラー: {0}")]
    PortSource(String),

    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("プロセスが見つかりません: {0}")]
    ProcessNotFound(String),
}

impl ProcessError {
    pub(crate) fn invalid_item(key: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadataItem {
            key: key.map(str::to_string),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessError>;
