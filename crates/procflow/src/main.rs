mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procflow")]
#[command(about = "プロセス定義から、デプロイ記述子へ。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// プロセス記述子を作成して標準出力に表示
    Build {
        /// プロセス名 (web, worker など)
        process: String,
        /// 設定ファイルのパス（省略時は自動検出）
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// デプロイメントバージョン（省略時は設定ファイルの値）
        #[arg(short = 'v', long, env = "PROCFLOW_DEPLOYMENT_VERSION")]
        deployment_version: Option<u32>,
        /// 出力形式
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// プロセス記述子をファイルに書き出す
    Export {
        /// プロセス名 (web, worker など)
        process: String,
        /// 出力先ファイル（省略時は <プロセス名>.<形式>）
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// 設定ファイルのパス（省略時は自動検出）
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// デプロイメントバージョン（省略時は設定ファイルの値）
        #[arg(short = 'v', long, env = "PROCFLOW_DEPLOYMENT_VERSION")]
        deployment_version: Option<u32>,
        /// 出力形式
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// 設定を検証（全プロセスを作成してみる）
    Validate {
        /// 設定ファイルのパス（省略時は自動検出）
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// デプロイメントバージョン（省略時は設定ファイルの値）
        #[arg(short = 'v', long, env = "PROCFLOW_DEPLOYMENT_VERSION")]
        deployment_version: Option<u32>,
    },
    /// バージョン情報を表示
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 標準出力は記述子の出力に使うので、ログは標準エラーへ
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            process,
            config,
            deployment_version,
            format,
        } => commands::build::handle(&process, config, deployment_version, format),
        Commands::Export {
            process,
            file,
            config,
            deployment_version,
            format,
        } => commands::export::handle(&process, file, config, deployment_version, format),
        Commands::Validate {
            config,
            deployment_version,
        } => commands::validate::handle(config, deployment_version),
        Commands::Version => {
            println!("procflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
