//! Manifest discovery and loading

use crate::error::{CoreError, Result};
use crate::model::Manifest;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "stratus.yaml";

/// Walk upwards from the current directory until a `stratus.yaml` is found.
pub fn find_project_root() -> Result<PathBuf> {
    let start = std::env::current_dir()?;
    let mut dir: &Path = &start;
    loop {
        if dir.join(MANIFEST_FILE).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return Err(CoreError::ProjectRootNotFound(start)),
        }
    }
}

/// Load and parse the manifest at a project root.
pub fn load_manifest(project_root: impl AsRef<Path>) -> Result<Manifest> {
    let path = project_root.as_ref().join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path)?;
    let manifest: Manifest = serde_yaml::from_str(&content)?;

    if manifest.service.is_empty() {
        return Err(CoreError::InvalidManifest(
            "service name must not be empty".to_string(),
        ));
    }
    tracing::debug!(
        service = %manifest.service,
        stage = %manifest.stage,
        functions = manifest.functions.len(),
        "loaded manifest"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_manifest_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"
service: svc
provider:
  region: cn-shanghai
  runtime: nodejs10
functions:
  f:
    handler: index.f
"#,
        )
        .unwrap();

        let manifest = load_manifest(dir.path()).unwrap();
        assert_eq!(manifest.service, "svc");
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"
service: ""
provider:
  region: cn-shanghai
  runtime: nodejs10
functions: {}
"#,
        )
        .unwrap();

        assert!(matches!(
            load_manifest(dir.path()),
            Err(CoreError::InvalidManifest(_))
        ));
    }
}
