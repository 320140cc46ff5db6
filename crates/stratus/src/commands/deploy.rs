use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use stratus_core::{GraphStore, Manifest};
use stratus_deploy::{ConsoleReporter, Deployer};

pub async fn handle(
    manifest: &Manifest,
    project_root: &Path,
    function: Option<String>,
) -> anyhow::Result<()> {
    match &function {
        Some(name) => println!(
            "{}",
            format!("Deploying function {} of {}...", name, manifest.scope())
                .blue()
                .bold()
        ),
        None => println!(
            "{}",
            format!("Deploying {}...", manifest.scope()).blue().bold()
        ),
    }
    println!();

    let pair = stratus_core::compile(manifest)?;
    GraphStore::new(project_root).save(&pair).await?;

    let provider = super::open_provider(manifest, project_root).await?;
    let deployer = Deployer::new(provider, Arc::new(ConsoleReporter));

    match function {
        Some(name) => deployer.deploy_function(&pair, &name).await?,
        None => deployer.deploy(&pair).await?,
    }

    println!();
    println!("{}", "Deploy complete.".green().bold());
    Ok(())
}
