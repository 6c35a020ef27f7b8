use super::OutputFormat;
use std::path::PathBuf;

pub fn handle(
    process: &str,
    config: Option<PathBuf>,
    deployment_version: Option<u32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let descriptor = super::build_descriptor(process, config, deployment_version)?;
    print!("{}", super::render(&descriptor, format)?);
    Ok(())
}
