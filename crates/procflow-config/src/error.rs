use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: procflow.local.kdl, .procflow.local.kdl, procflow.kdl, .procflow.kdl\n\
        - ./.procflow/ ディレクトリ\n\
        - ~/.config/procflow/procflow.kdl\n\
        または PROCFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("PROCFLOW_CONFIG_PATH に指定されたファイルが存在しません: {0}")]
    EnvPathNotFound(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
