use std::collections::BTreeMap;

use colored::Colorize;
use stratus_core::Manifest;

/// Compile the manifest and run the cross-reference checks without
/// touching any provider.
pub fn handle(manifest: &Manifest) -> anyhow::Result<()> {
    let pair = stratus_core::compile(manifest)?;
    pair.validate()?;

    println!("{}", "✓ Manifest is valid".green().bold());
    println!();
    println!("Service:   {}", manifest.scope().cyan());
    println!("Functions: {}", manifest.functions.len());
    println!(
        "Resources: {} bootstrap, {} per-deploy",
        pair.create.len(),
        pair.update.len()
    );

    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
    for (_, resource) in pair.create.iter().chain(pair.update.iter()) {
        *by_kind.entry(resource.kind().to_string()).or_default() += 1;
    }
    for (kind, count) in &by_kind {
        println!("  {:<12} {}", kind, count);
    }
    Ok(())
}
