pub mod deploy;
pub mod info;
pub mod invoke;
pub mod logs;
pub mod remove;
pub mod validate;

use std::path::Path;
use std::sync::Arc;
use stratus_cloud_local::LocalProvider;
use stratus_core::Manifest;

/// Open the provider the manifest asks for. Only the local file-backed
/// provider ships in this workspace; SDK-backed providers plug in through
/// the same trait.
pub async fn open_provider(
    manifest: &Manifest,
    project_root: &Path,
) -> anyhow::Result<Arc<LocalProvider>> {
    tracing::debug!(
        region = %manifest.provider.region,
        root = %project_root.display(),
        "opening local provider"
    );
    Ok(Arc::new(
        LocalProvider::open(project_root, &manifest.provider.region).await?,
    ))
}
