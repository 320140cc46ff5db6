//! Typed resource specifications
//!
//! Every resource a deployment can own is one variant of [`Resource`], a
//! tagged union serialized as `{"Type": ..., "Properties": {...}}` so the
//! compiled graph documents stay readable and diffable on disk. Validation
//! happens once, when a graph is compiled, not at every consumption site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A resource specification tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum Resource {
    Bucket(BucketSpec),
    Object(ObjectSpec),
    Service(ServiceSpec),
    Function(FunctionSpec),
    Role(RoleSpec),
    LogProject(LogProjectSpec),
    LogStore(LogStoreSpec),
    LogIndex(LogIndexSpec),
    ApiGroup(ApiGroupSpec),
    Api(ApiSpec),
    Trigger(TriggerSpec),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Bucket(_) => ResourceKind::Bucket,
            Resource::Object(_) => ResourceKind::Object,
            Resource::Service(_) => ResourceKind::Service,
            Resource::Function(_) => ResourceKind::Function,
            Resource::Role(_) => ResourceKind::Role,
            Resource::LogProject(_) => ResourceKind::LogProject,
            Resource::LogStore(_) => ResourceKind::LogStore,
            Resource::LogIndex(_) => ResourceKind::LogIndex,
            Resource::ApiGroup(_) => ResourceKind::ApiGroup,
            Resource::Api(_) => ResourceKind::Api,
            Resource::Trigger(_) => ResourceKind::Trigger,
        }
    }
}

/// Resource kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Bucket,
    Object,
    Service,
    Function,
    Role,
    LogProject,
    LogStore,
    LogIndex,
    ApiGroup,
    Api,
    Trigger,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Bucket => "Bucket",
            ResourceKind::Object => "Object",
            ResourceKind::Service => "Service",
            ResourceKind::Function => "Function",
            ResourceKind::Role => "Role",
            ResourceKind::LogProject => "LogProject",
            ResourceKind::LogStore => "LogStore",
            ResourceKind::LogIndex => "LogIndex",
            ResourceKind::ApiGroup => "ApiGroup",
            ResourceKind::Api => "Api",
            ResourceKind::Trigger => "Trigger",
        };
        write!(f, "{}", s)
    }
}

/// Artifact bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub name: String,
    pub region: String,
}

/// A code artifact stored in the bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub bucket: String,
    /// Object key, prefixed with a per-deployment timestamp directory
    pub key: String,
    /// Local file to upload
    pub source: PathBuf,
}

/// Compute service hosting the functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub log_project: String,
    pub log_store: String,
}

/// A single compute function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub service: String,
    pub handler: String,
    pub runtime: String,
    /// Memory in MB
    pub memory_size: u32,
    /// Timeout in seconds
    pub timeout: u32,
    /// Code artifact pointer (bucket + object key)
    pub code_bucket: String,
    pub code_key: String,
}

/// IAM-style role with its declared policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    pub assume_role_policy: serde_json::Value,
    #[serde(default)]
    pub policies: Vec<PolicySpec>,
}

/// A policy declared on a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    pub name: String,
    pub kind: PolicyKind,
    /// Policy document, only meaningful for `Custom` policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<serde_json::Value>,
}

/// System policies are assumed pre-existing and only ever attached;
/// custom policies are created on first deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    System,
    Custom,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::System => write!(f, "System"),
            PolicyKind::Custom => write!(f, "Custom"),
        }
    }
}

/// Log pipeline: project -> store -> index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogProjectSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStoreSpec {
    pub project: String,
    pub name: String,
    pub ttl_days: u32,
    pub shard_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogIndexSpec {
    pub project: String,
    pub store: String,
}

/// API gateway group, the shared parent of all HTTP routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiGroupSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One HTTP route fronting a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub name: String,
    pub group: String,
    pub method: String,
    pub path: String,
    /// Invoke role granting the gateway permission to call the function
    pub role: String,
    pub service: String,
    pub function: String,
}

/// Event-source trigger wired directly to a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub name: String,
    pub service: String,
    pub function: String,
    /// Invoke role assumed by the event source
    pub role: String,
    pub source: StorageEventSource,
}

/// Object-storage event source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEventSource {
    pub bucket: String,
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}
