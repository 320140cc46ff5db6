//! Cloud provider trait definition

use crate::error::Result;
use crate::resource::{
    ApiGroupSpec, ApiSpec, BucketSpec, FunctionSpec, LogIndexSpec, LogProjectSpec, LogStoreSpec,
    ObjectSpec, PolicyKind, PolicySpec, RoleSpec, ServiceSpec, TriggerSpec,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloud provider abstraction trait
///
/// All providers implement this trait to expose a uniform CRUD surface per
/// resource kind. Absence is a value, not an error: every `get_*` returns
/// `Ok(None)` when the resource does not exist, and any `Err` from a `get_*`
/// means the lookup itself failed.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g. "local", "fc")
    fn name(&self) -> &str;

    /// Region this provider handle is bound to
    fn region(&self) -> &str;

    /// Wait out a propagation window. Providers with no propagation lag
    /// (emulators, test doubles) may return immediately.
    async fn sleep(&self, delay: Duration);

    // --- log pipeline ---

    async fn get_log_project(&self, name: &str) -> Result<Option<RemoteLogProject>>;
    async fn create_log_project(&self, spec: &LogProjectSpec) -> Result<RemoteLogProject>;
    async fn delete_log_project(&self, name: &str) -> Result<()>;

    async fn get_log_store(&self, project: &str, name: &str) -> Result<Option<RemoteLogStore>>;
    async fn create_log_store(&self, spec: &LogStoreSpec) -> Result<RemoteLogStore>;
    async fn delete_log_store(&self, project: &str, name: &str) -> Result<()>;

    async fn get_log_index(&self, project: &str, store: &str) -> Result<Option<RemoteLogIndex>>;
    async fn create_log_index(&self, spec: &LogIndexSpec) -> Result<RemoteLogIndex>;
    async fn delete_log_index(&self, project: &str, store: &str) -> Result<()>;

    // --- roles and policies ---

    async fn get_role(&self, name: &str) -> Result<Option<RemoteRole>>;
    async fn create_role(&self, spec: &RoleSpec) -> Result<RemoteRole>;
    async fn delete_role(&self, name: &str) -> Result<()>;

    async fn get_policy(&self, name: &str, kind: PolicyKind) -> Result<Option<RemotePolicy>>;
    async fn create_policy(&self, spec: &PolicySpec) -> Result<RemotePolicy>;

    /// Policies currently attached to a role
    async fn list_role_policies(&self, role: &str) -> Result<Vec<AttachedPolicy>>;
    async fn attach_policy(&self, role: &str, name: &str, kind: PolicyKind) -> Result<()>;
    async fn detach_policy(&self, role: &str, name: &str, kind: PolicyKind) -> Result<()>;

    // --- compute service and functions ---

    async fn get_service(&self, name: &str) -> Result<Option<RemoteService>>;
    /// Create the service. `role_arn` is the resolved exec role, which must
    /// exist before this call.
    async fn create_service(&self, spec: &ServiceSpec, role_arn: &str) -> Result<RemoteService>;
    async fn delete_service(&self, name: &str) -> Result<()>;

    async fn get_function(&self, service: &str, name: &str) -> Result<Option<RemoteFunction>>;
    async fn create_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction>;
    async fn update_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction>;
    async fn delete_function(&self, service: &str, name: &str) -> Result<()>;
    async fn list_functions(&self, service: &str) -> Result<Vec<RemoteFunction>>;

    // --- artifact storage ---

    async fn get_bucket(&self, name: &str) -> Result<Option<RemoteBucket>>;
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<RemoteBucket>;
    async fn delete_bucket(&self, name: &str) -> Result<()>;

    /// Point the object-storage client at a bucket. Subsequent object
    /// operations address this bucket.
    async fn select_bucket(&self, name: &str) -> Result<()>;
    async fn upload_object(&self, spec: &ObjectSpec) -> Result<()>;
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;

    // --- api gateway ---

    async fn get_api_group(&self, name: &str) -> Result<Option<RemoteApiGroup>>;
    async fn create_api_group(&self, spec: &ApiGroupSpec) -> Result<RemoteApiGroup>;
    async fn delete_api_group(&self, name: &str) -> Result<()>;

    async fn list_apis(&self, group: &str) -> Result<Vec<RemoteApi>>;
    async fn create_api(
        &self,
        group: &RemoteApiGroup,
        role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi>;
    /// Update an existing API in place, keeping its remote identifier.
    async fn update_api(
        &self,
        group: &RemoteApiGroup,
        api_id: &str,
        role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi>;
    async fn delete_api(&self, group: &str, api_id: &str) -> Result<()>;

    /// Publish an API so the route is live. Creating or updating alone does
    /// not make a route reachable.
    async fn deploy_api(&self, group: &RemoteApiGroup, api_id: &str) -> Result<()>;
    async fn abolish_api(&self, group: &str, api_id: &str) -> Result<()>;

    // --- triggers ---

    async fn get_trigger(
        &self,
        service: &str,
        function: &str,
        name: &str,
    ) -> Result<Option<RemoteTrigger>>;
    async fn create_trigger(&self, spec: &TriggerSpec, role_arn: &str) -> Result<RemoteTrigger>;
    async fn update_trigger(&self, spec: &TriggerSpec, role_arn: &str) -> Result<RemoteTrigger>;
    async fn delete_trigger(&self, service: &str, function: &str, name: &str) -> Result<()>;
    async fn list_triggers(&self, service: &str, function: &str) -> Result<Vec<RemoteTrigger>>;

    // --- read-only consumers (info / logs / invoke commands) ---

    async fn invoke_function(
        &self,
        service: &str,
        function: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>>;
    async fn fetch_logs(
        &self,
        project: &str,
        store: &str,
        function: Option<&str>,
        limit: usize,
    ) -> Result<Vec<LogLine>>;
}

/// Remote role as resolved by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRole {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePolicy {
    pub name: String,
    pub kind: PolicyKind,
}

/// A policy attachment as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedPolicy {
    pub name: String,
    pub kind: PolicyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteService {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFunction {
    pub service: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBucket {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLogProject {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLogStore {
    pub project: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLogIndex {
    pub project: String,
    pub store: String,
}

/// API group, carrying the subdomain routes are served under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteApiGroup {
    pub name: String,
    pub id: String,
    pub sub_domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteApi {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTrigger {
    pub name: String,
}

/// One log line as returned by `fetch_logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub function: String,
    pub message: String,
}
