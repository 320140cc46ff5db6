use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Project root not found\nsearched from: {0}\nhint: run inside a directory containing stratus.yaml"
    )]
    ProjectRootNotFound(PathBuf),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Function '{function}' declares an unsupported event type: {event}")]
    UnsupportedEvent { function: String, event: String },

    #[error("Invalid resource graph: {0}")]
    InvalidGraph(String),

    #[error("Graph file not found: {path}\nhint: run `stratus deploy` first, or re-run with a manifest present")]
    GraphNotFound { path: PathBuf },

    #[error("Function not found in manifest: {0}")]
    FunctionNotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
