use colored::Colorize;
use std::path::Path;
use stratus_cloud::Provider;
use stratus_core::Manifest;

/// Compare the compiled graphs against what the provider reports, and
/// print one line per resource with its deployment status.
pub async fn handle(manifest: &Manifest, project_root: &Path) -> anyhow::Result<()> {
    let pair = stratus_core::compile(manifest)?;
    let provider = super::open_provider(manifest, project_root).await?;

    println!("{}", format!("Service: {}", manifest.scope()).bold());
    println!("Region:  {}", manifest.provider.region);
    println!();

    let service_name = manifest.scope();
    match provider.get_service(&service_name).await? {
        Some(_) => println!("{} service {}", "✓".green(), service_name),
        None => println!("{} service {} (not deployed)", "✗".red(), service_name),
    }

    println!();
    println!("{}", "Functions:".bold());
    for function in pair.update.functions() {
        match provider.get_function(&function.service, &function.name).await? {
            Some(_) => println!("  {} {}", "✓".green(), function.name.cyan()),
            None => println!("  {} {} (not deployed)", "✗".red(), function.name),
        }
    }

    let apis = pair.update.apis();
    if !apis.is_empty() {
        println!();
        println!("{}", "Routes:".bold());
        let group = match pair.update.api_group() {
            Some(spec) => provider.get_api_group(&spec.name).await?,
            None => None,
        };
        for api in apis {
            match &group {
                Some(group) => println!(
                    "  {} http://{}{} -> {}.{}",
                    api.method,
                    group.sub_domain,
                    api.path,
                    api.service.cyan(),
                    api.function.cyan()
                ),
                None => println!(
                    "  {} {} -> {}.{} (group not deployed)",
                    api.method, api.path, api.service, api.function
                ),
            }
        }
    }

    let triggers = pair.update.triggers();
    if !triggers.is_empty() {
        println!();
        println!("{}", "Triggers:".bold());
        for trigger in triggers {
            let deployed = provider
                .get_trigger(&trigger.service, &trigger.function, &trigger.name)
                .await?
                .is_some();
            let marker = if deployed { "✓".green() } else { "✗".red() };
            println!(
                "  {} {} ({} on {})",
                marker,
                trigger.name.cyan(),
                trigger.source.events.join(", "),
                trigger.source.bucket
            );
        }
    }

    Ok(())
}
