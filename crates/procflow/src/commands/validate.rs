use colored::Colorize;
use procflow_core::DeploymentVersion;
use std::path::PathBuf;

pub fn handle(config: Option<PathBuf>, deployment_version: Option<u32>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let path = match super::resolve_config(config) {
        Ok(path) => path,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定ファイルが見つかりません".red().bold());
            eprintln!("  {:#}", e);
            std::process::exit(1);
        }
    };
    println!("設定ファイル: {}", path.display().to_string().cyan());

    let version = deployment_version.map(DeploymentVersion);
    let results = match procflow_core::load_all(&path, version) {
        Ok(results) => results,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("プロセス: {}個", results.len());
    let mut failures = 0;
    for (name, result) in &results {
        match result {
            Ok(descriptor) => println!(
                "  {} {} (ポート: {}個, 環境変数: {}個)",
                "✓".green(),
                name.cyan(),
                descriptor.container_ports.len(),
                descriptor.environment.len()
            ),
            Err(e) => {
                failures += 1;
                println!("  {} {}: {}", "✗".red(), name.cyan(), e);
            }
        }
    }

    println!();
    if failures > 0 {
        eprintln!(
            "{}",
            format!("✗ {}個のプロセスでエラーがあります", failures).red().bold()
        );
        std::process::exit(1);
    }
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());

    Ok(())
}
