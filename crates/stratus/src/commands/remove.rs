use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use stratus_core::{GraphStore, Manifest};
use stratus_deploy::{ConsoleReporter, Deployer, TeardownFlags};

pub async fn handle(
    manifest: &Manifest,
    project_root: &Path,
    remove_roles: bool,
    remove_logstore: bool,
    yes: bool,
) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Removing {}...", manifest.scope()).blue().bold()
    );

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: this deletes deployed functions, routes and artifacts.".yellow()
        );
        if remove_roles {
            println!("{}", "The exec and invoke roles will also be deleted.".yellow());
        }
        if remove_logstore {
            println!(
                "{}",
                "The log project and its stored logs will also be deleted.".yellow()
            );
        }
        println!("Pass --yes to proceed");
        return Ok(());
    }
    println!();

    // Prefer the graphs saved by the last deploy; they name exactly what
    // that deploy created. Fall back to compiling the current manifest.
    let store = GraphStore::new(project_root);
    let pair = if store.exists() {
        store.load().await?
    } else {
        stratus_core::compile(manifest)?
    };

    let provider = super::open_provider(manifest, project_root).await?;
    let deployer = Deployer::new(provider, Arc::new(ConsoleReporter));
    deployer
        .remove(
            &pair,
            TeardownFlags {
                remove_roles,
                remove_logstore,
            },
        )
        .await?;

    println!();
    println!("{}", "Remove complete.".green().bold());
    Ok(())
}
