//! Stratus cloud provider abstraction
//!
//! This crate defines the seam between the reconciliation engine and any
//! concrete cloud backend. The engine only ever talks to the [`Provider`]
//! trait: per-kind get/create/update/delete plus policy attachment, API
//! deployment and a `sleep` primitive for propagation windows.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              stratus CLI                    │
//! │        (deploy / remove / info)             │
//! └──────────────────┬─────────────────────────┘
//!                    │
//! ┌──────────────────▼─────────────────────────┐
//! │             stratus-deploy                  │
//! │        reconciliation engine                │
//! └──────────────────┬─────────────────────────┘
//!                    │  trait Provider
//! ┌──────────────────▼─────────────────────────┐
//! │  stratus-cloud-local │ real SDK bindings    │
//! └────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod resource;

pub use error::{CloudError, Result};
pub use provider::{
    AttachedPolicy, LogLine, Provider, RemoteApi, RemoteApiGroup, RemoteBucket, RemoteFunction,
    RemoteLogIndex, RemoteLogProject, RemoteLogStore, RemotePolicy, RemoteRole, RemoteService,
    RemoteTrigger,
};
pub use resource::{
    ApiGroupSpec, ApiSpec, BucketSpec, FunctionSpec, LogIndexSpec, LogProjectSpec, LogStoreSpec,
    ObjectSpec, PolicyKind, PolicySpec, Resource, ResourceKind, RoleSpec, ServiceSpec,
    StorageEventSource, TriggerSpec,
};
