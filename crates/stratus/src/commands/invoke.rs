use colored::Colorize;
use std::path::Path;
use stratus_cloud::Provider;
use stratus_core::Manifest;

pub async fn handle(
    manifest: &Manifest,
    project_root: &Path,
    function: &str,
    data: &str,
) -> anyhow::Result<()> {
    // Fail on unknown names before touching the provider
    manifest.function(function)?;

    let provider = super::open_provider(manifest, project_root).await?;
    println!(
        "{}",
        format!("Invoking {}.{}...", manifest.scope(), function).blue()
    );

    let response = provider
        .invoke_function(&manifest.scope(), function, data.as_bytes())
        .await?;

    println!();
    match serde_json::from_slice::<serde_json::Value>(&response) {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&response)),
    }
    Ok(())
}
