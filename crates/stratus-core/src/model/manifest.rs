//! Service manifest definition
//!
//! The manifest (`stratus.yaml`) is the declarative source of truth a
//! deployment reconciles towards.

use super::event::Event;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use stratus_cloud::PolicySpec;

/// Top-level service manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Service name, the root of every derived resource name
    pub service: String,
    #[serde(default = "default_stage")]
    pub stage: String,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub package: PackageConfig,
    /// Functions keyed by name. BTreeMap keeps compilation order stable
    /// across runs, which keeps logical ids and progress output stable.
    pub functions: BTreeMap<String, FunctionDef>,
}

fn default_stage() -> String {
    "dev".to_string()
}

impl Manifest {
    /// `{service}-{stage}`, the scope every physical resource name hangs off
    pub fn scope(&self) -> String {
        format!("{}-{}", self.service, self.stage)
    }

    pub fn function(&self, name: &str) -> Result<&FunctionDef> {
        self.functions
            .get(name)
            .ok_or_else(|| CoreError::FunctionNotFound(name.to_string()))
    }
}

/// Provider-level settings and per-function defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub region: String,
    pub runtime: String,
    /// Default memory in MB, overridable per function
    #[serde(default = "default_memory")]
    pub memory_size: u32,
    /// Default timeout in seconds, overridable per function
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Custom policies to attach to the exec role, in addition to the
    /// log-write policy the compiler always grants
    #[serde(default)]
    pub exec_policies: Vec<PolicySpec>,
}

fn default_memory() -> u32 {
    128
}

fn default_timeout() -> u32 {
    30
}

/// Packaging settings (the artifact itself is built out of band)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Path to the pre-built code artifact
    #[serde(default)]
    pub artifact: Option<PathBuf>,
}

/// One declared function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub handler: String,
    /// Overrides the provider default when set
    #[serde(default)]
    pub memory_size: Option<u32>,
    /// Overrides the provider default when set
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub events: Vec<Event>,
}
