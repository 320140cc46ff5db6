//! Reconciliation errors
//!
//! No retries and no rollback: the first provider error aborts the run.
//! Re-running converges because every step re-checks remote state first.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Cloud(#[from] stratus_cloud::CloudError),

    #[error(transparent)]
    Core(#[from] stratus_core::CoreError),

    /// The graph pair is missing a resource a phase requires (e.g. the
    /// create graph has no service spec). Indicates a graph compiled by
    /// something other than the compiler.
    #[error("Resource graph is missing a required {0} spec")]
    MissingResource(&'static str),

    #[error("Function not found in update graph: {0}")]
    UnknownFunction(String),
}

pub type Result<T> = std::result::Result<T, DeployError>;
