use super::OutputFormat;
use anyhow::Context;
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub fn handle(
    process: &str,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    deployment_version: Option<u32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output =
        file.unwrap_or_else(|| PathBuf::from(format!("{}.{}", process, format.extension())));

    // 既存ファイルは上書きしない
    if output.exists() {
        anyhow::bail!("file already exists: {}", output.display());
    }

    let descriptor = super::build_descriptor(process, config, deployment_version)?;
    let rendered = super::render(&descriptor, format)?;

    let mut out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&output)
        .with_context(|| format!("ファイルを作成できません: {}", output.display()))?;
    out.write_all(rendered.as_bytes())
        .with_context(|| format!("ファイルに書き込めません: {}", output.display()))?;

    println!(
        "{} {} → {}",
        "✓".green(),
        process.cyan(),
        output.display().to_string().cyan()
    );
    Ok(())
}
