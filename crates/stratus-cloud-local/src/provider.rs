//! The local provider
//!
//! Implements the full [`Provider`] surface against the on-disk account
//! state, so `deploy`, `remove`, `info`, `invoke` and `logs` all work
//! without cloud credentials. Mutations are serialized through one lock and
//! every successful mutation is persisted before returning, so the state
//! file always reflects what a re-run will observe.

use crate::state::{
    AccountState, ApiGroupRecord, ApiRecord, BucketRecord, FunctionRecord, LogProjectRecord,
    LogStoreRecord, RoleRecord, ServiceRecord, StateStore, TriggerRecord,
};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use stratus_cloud::{
    ApiGroupSpec, ApiSpec, AttachedPolicy, BucketSpec, CloudError, FunctionSpec, LogIndexSpec,
    LogLine, LogProjectSpec, LogStoreSpec, ObjectSpec, PolicyKind, PolicySpec, Provider,
    RemoteApi, RemoteApiGroup, RemoteBucket, RemoteFunction, RemoteLogIndex, RemoteLogProject,
    RemoteLogStore, RemotePolicy, RemoteRole, RemoteService, RemoteTrigger, Result, RoleSpec,
    ServiceSpec, TriggerSpec,
};
use tokio::sync::Mutex;

pub const PROVIDER_NAME: &str = "local";

pub struct LocalProvider {
    region: String,
    store: StateStore,
    state: Mutex<AccountState>,
    selected_bucket: std::sync::Mutex<Option<String>>,
}

impl LocalProvider {
    /// Open (or initialize) the account state under `root`.
    pub async fn open(root: impl AsRef<Path>, region: &str) -> Result<Self> {
        let store = StateStore::new(root);
        let state = store.load().await?;
        Ok(Self {
            region: region.to_string(),
            store,
            state: Mutex::new(state),
            selected_bucket: std::sync::Mutex::new(None),
        })
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut AccountState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock().await;
        let out = f(&mut state)?;
        state.updated_at = Utc::now();
        self.store.save(&state).await?;
        Ok(out)
    }

    fn role_arn(name: &str) -> String {
        format!("acs:ram::local:role/{}", name)
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn region(&self) -> &str {
        &self.region
    }

    /// The emulated account is consistent immediately.
    async fn sleep(&self, _delay: Duration) {}

    async fn get_log_project(&self, name: &str) -> Result<Option<RemoteLogProject>> {
        let state = self.state.lock().await;
        Ok(state.log_projects.get(name).map(|_| RemoteLogProject {
            name: name.to_string(),
        }))
    }

    async fn create_log_project(&self, spec: &LogProjectSpec) -> Result<RemoteLogProject> {
        self.mutate(|state| {
            if state.log_projects.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            state.log_projects.insert(
                spec.name.clone(),
                LogProjectRecord {
                    description: spec.description.clone(),
                    stores: Default::default(),
                },
            );
            Ok(RemoteLogProject {
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn delete_log_project(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            state
                .log_projects
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))
        })
        .await
    }

    async fn get_log_store(&self, project: &str, name: &str) -> Result<Option<RemoteLogStore>> {
        let state = self.state.lock().await;
        let found = state
            .log_projects
            .get(project)
            .and_then(|p| p.stores.get(name));
        Ok(found.map(|_| RemoteLogStore {
            project: project.to_string(),
            name: name.to_string(),
        }))
    }

    async fn create_log_store(&self, spec: &LogStoreSpec) -> Result<RemoteLogStore> {
        self.mutate(|state| {
            let project = state
                .log_projects
                .get_mut(&spec.project)
                .ok_or_else(|| CloudError::ResourceNotFound(spec.project.clone()))?;
            if project.stores.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            project.stores.insert(
                spec.name.clone(),
                LogStoreRecord {
                    ttl_days: spec.ttl_days,
                    shard_count: spec.shard_count,
                    indexed: false,
                },
            );
            Ok(RemoteLogStore {
                project: spec.project.clone(),
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn delete_log_store(&self, project: &str, name: &str) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .log_projects
                .get_mut(project)
                .ok_or_else(|| CloudError::ResourceNotFound(project.to_string()))?;
            record
                .stores
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))
        })
        .await
    }

    async fn get_log_index(&self, project: &str, store: &str) -> Result<Option<RemoteLogIndex>> {
        let state = self.state.lock().await;
        let indexed = state
            .log_projects
            .get(project)
            .and_then(|p| p.stores.get(store))
            .is_some_and(|s| s.indexed);
        Ok(indexed.then(|| RemoteLogIndex {
            project: project.to_string(),
            store: store.to_string(),
        }))
    }

    async fn create_log_index(&self, spec: &LogIndexSpec) -> Result<RemoteLogIndex> {
        self.mutate(|state| {
            let store = state
                .log_projects
                .get_mut(&spec.project)
                .and_then(|p| p.stores.get_mut(&spec.store))
                .ok_or_else(|| CloudError::ResourceNotFound(spec.store.clone()))?;
            if store.indexed {
                return Err(CloudError::ResourceAlreadyExists(spec.store.clone()));
            }
            store.indexed = true;
            Ok(RemoteLogIndex {
                project: spec.project.clone(),
                store: spec.store.clone(),
            })
        })
        .await
    }

    async fn delete_log_index(&self, project: &str, store: &str) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .log_projects
                .get_mut(project)
                .and_then(|p| p.stores.get_mut(store))
                .ok_or_else(|| CloudError::ResourceNotFound(store.to_string()))?;
            record.indexed = false;
            Ok(())
        })
        .await
    }

    async fn get_role(&self, name: &str) -> Result<Option<RemoteRole>> {
        let state = self.state.lock().await;
        Ok(state.roles.get(name).map(|r| RemoteRole {
            name: name.to_string(),
            arn: r.arn.clone(),
        }))
    }

    async fn create_role(&self, spec: &RoleSpec) -> Result<RemoteRole> {
        self.mutate(|state| {
            if state.roles.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            let arn = Self::role_arn(&spec.name);
            state.roles.insert(
                spec.name.clone(),
                RoleRecord {
                    arn: arn.clone(),
                    assume_role_policy: spec.assume_role_policy.clone(),
                    attached: Vec::new(),
                },
            );
            Ok(RemoteRole {
                name: spec.name.clone(),
                arn,
            })
        })
        .await
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .roles
                .get(name)
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))?;
            if !record.attached.is_empty() {
                return Err(CloudError::ApiError(format!(
                    "role {} still has {} attached policies",
                    name,
                    record.attached.len()
                )));
            }
            state.roles.remove(name);
            Ok(())
        })
        .await
    }

    async fn get_policy(&self, name: &str, kind: PolicyKind) -> Result<Option<RemotePolicy>> {
        let state = self.state.lock().await;
        // System policies are part of the platform and always resolve.
        let present = match kind {
            PolicyKind::System => true,
            PolicyKind::Custom => state.custom_policies.contains_key(name),
        };
        Ok(present.then(|| RemotePolicy {
            name: name.to_string(),
            kind,
        }))
    }

    async fn create_policy(&self, spec: &PolicySpec) -> Result<RemotePolicy> {
        if spec.kind == PolicyKind::System {
            return Err(CloudError::InvalidConfig(format!(
                "system policy {} cannot be created",
                spec.name
            )));
        }
        self.mutate(|state| {
            if state.custom_policies.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            let document = spec
                .document
                .clone()
                .ok_or_else(|| CloudError::InvalidConfig(format!(
                    "custom policy {} has no document",
                    spec.name
                )))?;
            state.custom_policies.insert(spec.name.clone(), document);
            Ok(RemotePolicy {
                name: spec.name.clone(),
                kind: spec.kind,
            })
        })
        .await
    }

    async fn list_role_policies(&self, role: &str) -> Result<Vec<AttachedPolicy>> {
        let state = self.state.lock().await;
        Ok(state
            .roles
            .get(role)
            .map(|r| r.attached.clone())
            .unwrap_or_default())
    }

    async fn attach_policy(&self, role: &str, name: &str, kind: PolicyKind) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .roles
                .get_mut(role)
                .ok_or_else(|| CloudError::ResourceNotFound(role.to_string()))?;
            if record.attached.iter().any(|p| p.name == name) {
                return Err(CloudError::ResourceAlreadyExists(name.to_string()));
            }
            record.attached.push(AttachedPolicy {
                name: name.to_string(),
                kind,
            });
            Ok(())
        })
        .await
    }

    async fn detach_policy(&self, role: &str, name: &str, _kind: PolicyKind) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .roles
                .get_mut(role)
                .ok_or_else(|| CloudError::ResourceNotFound(role.to_string()))?;
            record.attached.retain(|p| p.name != name);
            Ok(())
        })
        .await
    }

    async fn get_service(&self, name: &str) -> Result<Option<RemoteService>> {
        let state = self.state.lock().await;
        Ok(state.services.get(name).map(|s| RemoteService {
            name: name.to_string(),
            id: s.id.clone(),
        }))
    }

    async fn create_service(&self, spec: &ServiceSpec, role_arn: &str) -> Result<RemoteService> {
        self.mutate(|state| {
            if state.services.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            let id = state.fresh_id("svc");
            state.services.insert(
                spec.name.clone(),
                ServiceRecord {
                    id: id.clone(),
                    description: spec.description.clone(),
                    role_arn: role_arn.to_string(),
                    log_project: spec.log_project.clone(),
                    log_store: spec.log_store.clone(),
                },
            );
            Ok(RemoteService {
                name: spec.name.clone(),
                id,
            })
        })
        .await
    }

    async fn delete_service(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            let prefix = format!("{}/", name);
            if state.functions.keys().any(|k| k.starts_with(&prefix)) {
                return Err(CloudError::ApiError(format!(
                    "service {} still has functions",
                    name
                )));
            }
            state
                .services
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))
        })
        .await
    }

    async fn get_function(&self, service: &str, name: &str) -> Result<Option<RemoteFunction>> {
        let state = self.state.lock().await;
        let key = AccountState::function_key(service, name);
        Ok(state.functions.get(&key).map(|_| RemoteFunction {
            service: service.to_string(),
            name: name.to_string(),
        }))
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction> {
        self.mutate(|state| {
            if !state.services.contains_key(&spec.service) {
                return Err(CloudError::ResourceNotFound(spec.service.clone()));
            }
            let key = AccountState::function_key(&spec.service, &spec.name);
            if state.functions.contains_key(&key) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            state.functions.insert(key, function_record(spec));
            Ok(RemoteFunction {
                service: spec.service.clone(),
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn update_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction> {
        self.mutate(|state| {
            let key = AccountState::function_key(&spec.service, &spec.name);
            if !state.functions.contains_key(&key) {
                return Err(CloudError::ResourceNotFound(spec.name.clone()));
            }
            state.functions.insert(key, function_record(spec));
            Ok(RemoteFunction {
                service: spec.service.clone(),
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn delete_function(&self, service: &str, name: &str) -> Result<()> {
        self.mutate(|state| {
            let key = AccountState::function_key(service, name);
            state
                .functions
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))
        })
        .await
    }

    async fn list_functions(&self, service: &str) -> Result<Vec<RemoteFunction>> {
        let state = self.state.lock().await;
        let prefix = format!("{}/", service);
        Ok(state
            .functions
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|name| RemoteFunction {
                service: service.to_string(),
                name: name.to_string(),
            })
            .collect())
    }

    async fn get_bucket(&self, name: &str) -> Result<Option<RemoteBucket>> {
        let state = self.state.lock().await;
        Ok(state.buckets.get(name).map(|b| RemoteBucket {
            name: name.to_string(),
            region: b.region.clone(),
        }))
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<RemoteBucket> {
        self.mutate(|state| {
            if state.buckets.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            state.buckets.insert(
                spec.name.clone(),
                BucketRecord {
                    region: spec.region.clone(),
                    objects: Default::default(),
                },
            );
            Ok(RemoteBucket {
                name: spec.name.clone(),
                region: spec.region.clone(),
            })
        })
        .await
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .buckets
                .get(name)
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))?;
            if !record.objects.is_empty() {
                return Err(CloudError::ApiError(format!(
                    "bucket {} is not empty",
                    name
                )));
            }
            state.buckets.remove(name);
            Ok(())
        })
        .await
    }

    async fn select_bucket(&self, name: &str) -> Result<()> {
        let state = self.state.lock().await;
        if !state.buckets.contains_key(name) {
            return Err(CloudError::ResourceNotFound(name.to_string()));
        }
        *self.selected_bucket.lock().unwrap() = Some(name.to_string());
        Ok(())
    }

    async fn upload_object(&self, spec: &ObjectSpec) -> Result<()> {
        let selected = self.selected_bucket.lock().unwrap().clone();
        if selected.as_deref() != Some(spec.bucket.as_str()) {
            return Err(CloudError::InvalidConfig(format!(
                "bucket {} is not selected",
                spec.bucket
            )));
        }
        let size = tokio::fs::metadata(&spec.source).await?.len();
        self.mutate(|state| {
            let bucket = state
                .buckets
                .get_mut(&spec.bucket)
                .ok_or_else(|| CloudError::ResourceNotFound(spec.bucket.clone()))?;
            bucket.objects.insert(spec.key.clone(), size);
            Ok(())
        })
        .await
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        let record = state
            .buckets
            .get(bucket)
            .ok_or_else(|| CloudError::ResourceNotFound(bucket.to_string()))?;
        Ok(record
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .buckets
                .get_mut(bucket)
                .ok_or_else(|| CloudError::ResourceNotFound(bucket.to_string()))?;
            for key in keys {
                record.objects.remove(key);
            }
            Ok(())
        })
        .await
    }

    async fn get_api_group(&self, name: &str) -> Result<Option<RemoteApiGroup>> {
        let state = self.state.lock().await;
        Ok(state.api_groups.get(name).map(|g| RemoteApiGroup {
            name: name.to_string(),
            id: g.id.clone(),
            sub_domain: g.sub_domain.clone(),
        }))
    }

    async fn create_api_group(&self, spec: &ApiGroupSpec) -> Result<RemoteApiGroup> {
        self.mutate(|state| {
            if state.api_groups.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            let id = state.fresh_id("group");
            let sub_domain = format!("{}.gateway.local", spec.name);
            state.api_groups.insert(
                spec.name.clone(),
                ApiGroupRecord {
                    id: id.clone(),
                    sub_domain: sub_domain.clone(),
                    apis: Default::default(),
                },
            );
            Ok(RemoteApiGroup {
                name: spec.name.clone(),
                id,
                sub_domain,
            })
        })
        .await
    }

    async fn delete_api_group(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            let record = state
                .api_groups
                .get(name)
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))?;
            if !record.apis.is_empty() {
                return Err(CloudError::ApiError(format!(
                    "api group {} still has apis",
                    name
                )));
            }
            state.api_groups.remove(name);
            Ok(())
        })
        .await
    }

    async fn list_apis(&self, group: &str) -> Result<Vec<RemoteApi>> {
        let state = self.state.lock().await;
        let record = state
            .api_groups
            .values()
            .find(|g| g.id == group)
            .ok_or_else(|| CloudError::ResourceNotFound(group.to_string()))?;
        Ok(record
            .apis
            .iter()
            .map(|(name, api)| RemoteApi {
                name: name.clone(),
                id: api.id.clone(),
            })
            .collect())
    }

    async fn create_api(
        &self,
        group: &RemoteApiGroup,
        _role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi> {
        let group_name = group.name.clone();
        self.mutate(move |state| {
            let id = state.fresh_id("api");
            let record = state
                .api_groups
                .get_mut(&group_name)
                .ok_or_else(|| CloudError::ResourceNotFound(group_name.clone()))?;
            if record.apis.contains_key(&spec.name) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            record.apis.insert(
                spec.name.clone(),
                ApiRecord {
                    id: id.clone(),
                    method: spec.method.clone(),
                    path: spec.path.clone(),
                    service: spec.service.clone(),
                    function: spec.function.clone(),
                    deployed: false,
                },
            );
            Ok(RemoteApi {
                name: spec.name.clone(),
                id,
            })
        })
        .await
    }

    async fn update_api(
        &self,
        group: &RemoteApiGroup,
        api_id: &str,
        _role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi> {
        let group_name = group.name.clone();
        self.mutate(move |state| {
            let record = state
                .api_groups
                .get_mut(&group_name)
                .ok_or_else(|| CloudError::ResourceNotFound(group_name.clone()))?;
            let api = record
                .apis
                .get_mut(&spec.name)
                .filter(|api| api.id == api_id)
                .ok_or_else(|| CloudError::ResourceNotFound(spec.name.clone()))?;
            api.method = spec.method.clone();
            api.path = spec.path.clone();
            api.service = spec.service.clone();
            api.function = spec.function.clone();
            Ok(RemoteApi {
                name: spec.name.clone(),
                id: api_id.to_string(),
            })
        })
        .await
    }

    async fn delete_api(&self, group: &str, api_id: &str) -> Result<()> {
        let group = group.to_string();
        let api_id = api_id.to_string();
        self.mutate(move |state| {
            let record = state
                .api_groups
                .values_mut()
                .find(|g| g.id == group)
                .ok_or_else(|| CloudError::ResourceNotFound(group.clone()))?;
            record.apis.retain(|_, api| api.id != api_id);
            Ok(())
        })
        .await
    }

    async fn deploy_api(&self, group: &RemoteApiGroup, api_id: &str) -> Result<()> {
        let group_name = group.name.clone();
        let api_id = api_id.to_string();
        self.mutate(move |state| {
            let record = state
                .api_groups
                .get_mut(&group_name)
                .ok_or_else(|| CloudError::ResourceNotFound(group_name.clone()))?;
            let api = record
                .apis
                .values_mut()
                .find(|api| api.id == api_id)
                .ok_or_else(|| CloudError::ResourceNotFound(api_id.clone()))?;
            api.deployed = true;
            Ok(())
        })
        .await
    }

    async fn abolish_api(&self, group: &str, api_id: &str) -> Result<()> {
        let group = group.to_string();
        let api_id = api_id.to_string();
        self.mutate(move |state| {
            let record = state
                .api_groups
                .values_mut()
                .find(|g| g.id == group)
                .ok_or_else(|| CloudError::ResourceNotFound(group.clone()))?;
            let api = record
                .apis
                .values_mut()
                .find(|api| api.id == api_id)
                .ok_or_else(|| CloudError::ResourceNotFound(api_id.clone()))?;
            api.deployed = false;
            Ok(())
        })
        .await
    }

    async fn get_trigger(
        &self,
        service: &str,
        function: &str,
        name: &str,
    ) -> Result<Option<RemoteTrigger>> {
        let state = self.state.lock().await;
        let key = AccountState::trigger_key(service, function, name);
        Ok(state.triggers.get(&key).map(|_| RemoteTrigger {
            name: name.to_string(),
        }))
    }

    async fn create_trigger(&self, spec: &TriggerSpec, role_arn: &str) -> Result<RemoteTrigger> {
        self.mutate(|state| {
            let key = AccountState::trigger_key(&spec.service, &spec.function, &spec.name);
            if state.triggers.contains_key(&key) {
                return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
            }
            state.triggers.insert(key, trigger_record(spec, role_arn));
            Ok(RemoteTrigger {
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn update_trigger(&self, spec: &TriggerSpec, role_arn: &str) -> Result<RemoteTrigger> {
        self.mutate(|state| {
            let key = AccountState::trigger_key(&spec.service, &spec.function, &spec.name);
            if !state.triggers.contains_key(&key) {
                return Err(CloudError::ResourceNotFound(spec.name.clone()));
            }
            state.triggers.insert(key, trigger_record(spec, role_arn));
            Ok(RemoteTrigger {
                name: spec.name.clone(),
            })
        })
        .await
    }

    async fn delete_trigger(&self, service: &str, function: &str, name: &str) -> Result<()> {
        self.mutate(|state| {
            let key = AccountState::trigger_key(service, function, name);
            state
                .triggers
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| CloudError::ResourceNotFound(name.to_string()))
        })
        .await
    }

    async fn list_triggers(&self, service: &str, function: &str) -> Result<Vec<RemoteTrigger>> {
        let state = self.state.lock().await;
        let prefix = format!("{}/{}/", service, function);
        Ok(state
            .triggers
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|name| RemoteTrigger {
                name: name.to_string(),
            })
            .collect())
    }

    async fn invoke_function(
        &self,
        service: &str,
        function: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        self.mutate(|state| {
            let key = AccountState::function_key(service, function);
            let record = state
                .functions
                .get(&key)
                .ok_or_else(|| CloudError::ResourceNotFound(function.to_string()))?;
            let response = serde_json::json!({
                "function": function,
                "handler": record.handler,
                "payload_bytes": payload.len(),
            });
            state.logs.push(LogLine {
                timestamp: Utc::now(),
                function: function.to_string(),
                message: format!("invoked with {} byte payload", payload.len()),
            });
            Ok(serde_json::to_vec(&response)?)
        })
        .await
    }

    async fn fetch_logs(
        &self,
        _project: &str,
        _store: &str,
        function: Option<&str>,
        limit: usize,
    ) -> Result<Vec<LogLine>> {
        let state = self.state.lock().await;
        let matching: Vec<LogLine> = state
            .logs
            .iter()
            .filter(|line| function.is_none_or(|f| line.function == f))
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }
}

fn function_record(spec: &FunctionSpec) -> FunctionRecord {
    FunctionRecord {
        handler: spec.handler.clone(),
        runtime: spec.runtime.clone(),
        memory_size: spec.memory_size,
        timeout: spec.timeout,
        code_bucket: spec.code_bucket.clone(),
        code_key: spec.code_key.clone(),
        updated_at: Utc::now(),
    }
}

fn trigger_record(spec: &TriggerSpec, role_arn: &str) -> TriggerRecord {
    TriggerRecord {
        role_arn: role_arn.to_string(),
        bucket: spec.source.bucket.clone(),
        events: spec.source.events.clone(),
        prefix: spec.source.prefix.clone(),
    }
}
