use colored::Colorize;
use std::path::Path;
use stratus_cloud::Provider;
use stratus_core::{Manifest, Naming};

pub async fn handle(
    manifest: &Manifest,
    project_root: &Path,
    function: Option<&str>,
    lines: usize,
) -> anyhow::Result<()> {
    if let Some(name) = function {
        manifest.function(name)?;
    }

    let naming = Naming::new(manifest);
    let provider = super::open_provider(manifest, project_root).await?;
    let logs = provider
        .fetch_logs(
            &naming.log_project_name(),
            &naming.log_store_name(),
            function,
            lines,
        )
        .await?;

    if logs.is_empty() {
        println!("{}", "No log lines found".yellow());
        return Ok(());
    }
    for line in logs {
        println!(
            "{} {} {}",
            line.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            line.function.cyan(),
            line.message
        );
    }
    Ok(())
}
