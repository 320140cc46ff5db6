//! Shared test doubles: an in-memory provider that records every call,
//! and a reporter that records every progress line.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stratus_cloud::{
    ApiGroupSpec, ApiSpec, AttachedPolicy, BucketSpec, CloudError, FunctionSpec, LogIndexSpec,
    LogLine, LogProjectSpec, LogStoreSpec, ObjectSpec, PolicyKind, PolicySpec, Provider,
    RemoteApi, RemoteApiGroup, RemoteBucket, RemoteFunction, RemoteLogIndex, RemoteLogProject,
    RemoteLogStore, RemotePolicy, RemoteRole, RemoteService, RemoteTrigger, Result, RoleSpec,
    ServiceSpec, TriggerSpec,
};
use stratus_core::{compile_at, GraphPair, Manifest};
use stratus_deploy::{ConsistencyDelay, Deployer, Reporter};

pub const SCENARIO_MANIFEST: &str = r#"
service: my-service
stage: dev
provider:
  region: cn-shanghai
  runtime: nodejs10
  memory_size: 128
  timeout: 30
package:
  artifact: dist/my-service.zip
functions:
  postTest:
    handler: index.postHandler
    events:
      - http:
          method: POST
          path: /baz
"#;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn scenario_pair() -> GraphPair {
    let manifest: Manifest = serde_yaml::from_str(SCENARIO_MANIFEST).unwrap();
    compile_at(&manifest, fixed_now()).unwrap()
}

pub fn deployer(provider: Arc<MockProvider>, reporter: Arc<RecordingReporter>) -> Deployer {
    Deployer::new(provider, reporter).with_delay(ConsistencyDelay::none())
}

/// Collects progress lines in order
#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl Reporter for RecordingReporter {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

#[derive(Default)]
struct MockState {
    log_projects: HashMap<String, RemoteLogProject>,
    log_stores: HashMap<(String, String), RemoteLogStore>,
    log_indexes: HashMap<(String, String), RemoteLogIndex>,
    roles: HashMap<String, RemoteRole>,
    policies: HashSet<(String, PolicyKind)>,
    attachments: HashMap<String, Vec<AttachedPolicy>>,
    services: HashMap<String, RemoteService>,
    functions: HashMap<(String, String), RemoteFunction>,
    buckets: HashMap<String, RemoteBucket>,
    objects: HashMap<String, Vec<String>>,
    selected_bucket: Option<String>,
    groups: HashMap<String, RemoteApiGroup>,
    apis: HashMap<String, Vec<RemoteApi>>,
    deployed: HashSet<(String, String)>,
    triggers: HashMap<(String, String, String), RemoteTrigger>,
    next_id: u64,
}

impl MockState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// In-memory provider that records every call it receives
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every provider call so far, as "method name" strings
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make the named method fail with an ApiError on its next use
    pub fn fail_on(&self, method: &str) {
        *self.fail_on.lock().unwrap() = Some(method.to_string());
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("create_"))
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("delete_") || c.starts_with("detach_") || c.starts_with("abolish_")
            })
            .collect()
    }

    /// Index of the first call whose record starts with `prefix`
    pub fn call_index(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    fn record(&self, method: &str, detail: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, detail).trim().to_string());
        let should_fail = self
            .fail_on
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|m| m == method);
        if should_fail {
            return Err(CloudError::ApiError(format!("injected failure in {method}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn region(&self) -> &str {
        "cn-shanghai"
    }

    async fn sleep(&self, _delay: Duration) {
        let _ = self.record("sleep", "");
    }

    async fn get_log_project(&self, name: &str) -> Result<Option<RemoteLogProject>> {
        self.record("get_log_project", name)?;
        Ok(self.state.lock().unwrap().log_projects.get(name).cloned())
    }

    async fn create_log_project(&self, spec: &LogProjectSpec) -> Result<RemoteLogProject> {
        self.record("create_log_project", &spec.name)?;
        let remote = RemoteLogProject {
            name: spec.name.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .log_projects
            .insert(spec.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_log_project(&self, name: &str) -> Result<()> {
        self.record("delete_log_project", name)?;
        self.state.lock().unwrap().log_projects.remove(name);
        Ok(())
    }

    async fn get_log_store(&self, project: &str, name: &str) -> Result<Option<RemoteLogStore>> {
        self.record("get_log_store", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .log_stores
            .get(&(project.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_log_store(&self, spec: &LogStoreSpec) -> Result<RemoteLogStore> {
        self.record("create_log_store", &spec.name)?;
        let remote = RemoteLogStore {
            project: spec.project.clone(),
            name: spec.name.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .log_stores
            .insert((spec.project.clone(), spec.name.clone()), remote.clone());
        Ok(remote)
    }

    async fn delete_log_store(&self, project: &str, name: &str) -> Result<()> {
        self.record("delete_log_store", name)?;
        self.state
            .lock()
            .unwrap()
            .log_stores
            .remove(&(project.to_string(), name.to_string()));
        Ok(())
    }

    async fn get_log_index(&self, project: &str, store: &str) -> Result<Option<RemoteLogIndex>> {
        self.record("get_log_index", store)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .log_indexes
            .get(&(project.to_string(), store.to_string()))
            .cloned())
    }

    async fn create_log_index(&self, spec: &LogIndexSpec) -> Result<RemoteLogIndex> {
        self.record("create_log_index", &spec.store)?;
        let remote = RemoteLogIndex {
            project: spec.project.clone(),
            store: spec.store.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .log_indexes
            .insert((spec.project.clone(), spec.store.clone()), remote.clone());
        Ok(remote)
    }

    async fn delete_log_index(&self, project: &str, store: &str) -> Result<()> {
        self.record("delete_log_index", store)?;
        self.state
            .lock()
            .unwrap()
            .log_indexes
            .remove(&(project.to_string(), store.to_string()));
        Ok(())
    }

    async fn get_role(&self, name: &str) -> Result<Option<RemoteRole>> {
        self.record("get_role", name)?;
        Ok(self.state.lock().unwrap().roles.get(name).cloned())
    }

    async fn create_role(&self, spec: &RoleSpec) -> Result<RemoteRole> {
        self.record("create_role", &spec.name)?;
        let remote = RemoteRole {
            name: spec.name.clone(),
            arn: format!("acs:ram::1234:role/{}", spec.name),
        };
        self.state
            .lock()
            .unwrap()
            .roles
            .insert(spec.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        self.record("delete_role", name)?;
        self.state.lock().unwrap().roles.remove(name);
        Ok(())
    }

    async fn get_policy(&self, name: &str, kind: PolicyKind) -> Result<Option<RemotePolicy>> {
        self.record("get_policy", name)?;
        let present = self
            .state
            .lock()
            .unwrap()
            .policies
            .contains(&(name.to_string(), kind));
        Ok(present.then(|| RemotePolicy {
            name: name.to_string(),
            kind,
        }))
    }

    async fn create_policy(&self, spec: &PolicySpec) -> Result<RemotePolicy> {
        self.record("create_policy", &spec.name)?;
        self.state
            .lock()
            .unwrap()
            .policies
            .insert((spec.name.clone(), spec.kind));
        Ok(RemotePolicy {
            name: spec.name.clone(),
            kind: spec.kind,
        })
    }

    async fn list_role_policies(&self, role: &str) -> Result<Vec<AttachedPolicy>> {
        self.record("list_role_policies", role)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .attachments
            .get(role)
            .cloned()
            .unwrap_or_default())
    }

    async fn attach_policy(&self, role: &str, name: &str, kind: PolicyKind) -> Result<()> {
        self.record("attach_policy", &format!("{} {}", role, name))?;
        self.state
            .lock()
            .unwrap()
            .attachments
            .entry(role.to_string())
            .or_default()
            .push(AttachedPolicy {
                name: name.to_string(),
                kind,
            });
        Ok(())
    }

    async fn detach_policy(&self, role: &str, name: &str, _kind: PolicyKind) -> Result<()> {
        self.record("detach_policy", &format!("{} {}", role, name))?;
        if let Some(attached) = self.state.lock().unwrap().attachments.get_mut(role) {
            attached.retain(|p| p.name != name);
        }
        Ok(())
    }

    async fn get_service(&self, name: &str) -> Result<Option<RemoteService>> {
        self.record("get_service", name)?;
        Ok(self.state.lock().unwrap().services.get(name).cloned())
    }

    async fn create_service(&self, spec: &ServiceSpec, role_arn: &str) -> Result<RemoteService> {
        self.record("create_service", &spec.name)?;
        assert!(!role_arn.is_empty(), "service created without a role arn");
        let mut state = self.state.lock().unwrap();
        let id = state.fresh_id("svc");
        let remote = RemoteService {
            name: spec.name.clone(),
            id,
        };
        state.services.insert(spec.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_service(&self, name: &str) -> Result<()> {
        self.record("delete_service", name)?;
        self.state.lock().unwrap().services.remove(name);
        Ok(())
    }

    async fn get_function(&self, service: &str, name: &str) -> Result<Option<RemoteFunction>> {
        self.record("get_function", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .functions
            .get(&(service.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction> {
        self.record("create_function", &spec.name)?;
        let remote = RemoteFunction {
            service: spec.service.clone(),
            name: spec.name.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .functions
            .insert((spec.service.clone(), spec.name.clone()), remote.clone());
        Ok(remote)
    }

    async fn update_function(&self, spec: &FunctionSpec) -> Result<RemoteFunction> {
        self.record("update_function", &spec.name)?;
        let key = (spec.service.clone(), spec.name.clone());
        let state = self.state.lock().unwrap();
        state
            .functions
            .get(&key)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(spec.name.clone()))
    }

    async fn delete_function(&self, service: &str, name: &str) -> Result<()> {
        self.record("delete_function", name)?;
        self.state
            .lock()
            .unwrap()
            .functions
            .remove(&(service.to_string(), name.to_string()));
        Ok(())
    }

    async fn list_functions(&self, service: &str) -> Result<Vec<RemoteFunction>> {
        self.record("list_functions", service)?;
        let mut functions: Vec<RemoteFunction> = self
            .state
            .lock()
            .unwrap()
            .functions
            .iter()
            .filter(|((svc, _), _)| svc == service)
            .map(|(_, f)| f.clone())
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(functions)
    }

    async fn get_bucket(&self, name: &str) -> Result<Option<RemoteBucket>> {
        self.record("get_bucket", name)?;
        Ok(self.state.lock().unwrap().buckets.get(name).cloned())
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<RemoteBucket> {
        self.record("create_bucket", &spec.name)?;
        let remote = RemoteBucket {
            name: spec.name.clone(),
            region: spec.region.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .buckets
            .insert(spec.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.record("delete_bucket", name)?;
        self.state.lock().unwrap().buckets.remove(name);
        Ok(())
    }

    async fn select_bucket(&self, name: &str) -> Result<()> {
        self.record("select_bucket", name)?;
        self.state.lock().unwrap().selected_bucket = Some(name.to_string());
        Ok(())
    }

    async fn upload_object(&self, spec: &ObjectSpec) -> Result<()> {
        self.record("upload_object", &spec.key)?;
        let mut state = self.state.lock().unwrap();
        assert_eq!(
            state.selected_bucket.as_deref(),
            Some(spec.bucket.as_str()),
            "upload before bucket selection"
        );
        state
            .objects
            .entry(spec.bucket.clone())
            .or_default()
            .push(spec.key.clone());
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        self.record("list_objects", bucket)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .objects
            .get(bucket)
            .map(|keys| {
                keys.iter()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.record("delete_objects", bucket)?;
        if let Some(stored) = self.state.lock().unwrap().objects.get_mut(bucket) {
            stored.retain(|k| !keys.contains(k));
        }
        Ok(())
    }

    async fn get_api_group(&self, name: &str) -> Result<Option<RemoteApiGroup>> {
        self.record("get_api_group", name)?;
        Ok(self.state.lock().unwrap().groups.get(name).cloned())
    }

    async fn create_api_group(&self, spec: &ApiGroupSpec) -> Result<RemoteApiGroup> {
        self.record("create_api_group", &spec.name)?;
        let mut state = self.state.lock().unwrap();
        let id = state.fresh_id("group");
        let remote = RemoteApiGroup {
            name: spec.name.clone(),
            id,
            sub_domain: format!("{}.gateway.example", spec.name),
        };
        state.groups.insert(spec.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_api_group(&self, name: &str) -> Result<()> {
        self.record("delete_api_group", name)?;
        self.state.lock().unwrap().groups.remove(name);
        Ok(())
    }

    async fn list_apis(&self, group: &str) -> Result<Vec<RemoteApi>> {
        self.record("list_apis", group)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .apis
            .get(group)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_api(
        &self,
        group: &RemoteApiGroup,
        role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi> {
        self.record("create_api", &spec.name)?;
        assert!(!role_arn.is_empty(), "api created without a role arn");
        let mut state = self.state.lock().unwrap();
        let id = state.fresh_id("api");
        let remote = RemoteApi {
            name: spec.name.clone(),
            id,
        };
        state
            .apis
            .entry(group.id.clone())
            .or_default()
            .push(remote.clone());
        Ok(remote)
    }

    async fn update_api(
        &self,
        group: &RemoteApiGroup,
        api_id: &str,
        _role_arn: &str,
        spec: &ApiSpec,
    ) -> Result<RemoteApi> {
        self.record("update_api", &spec.name)?;
        let state = self.state.lock().unwrap();
        state
            .apis
            .get(&group.id)
            .and_then(|apis| apis.iter().find(|a| a.id == api_id))
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(spec.name.clone()))
    }

    async fn delete_api(&self, group: &str, api_id: &str) -> Result<()> {
        self.record("delete_api", api_id)?;
        if let Some(apis) = self.state.lock().unwrap().apis.get_mut(group) {
            apis.retain(|a| a.id != api_id);
        }
        Ok(())
    }

    async fn deploy_api(&self, group: &RemoteApiGroup, api_id: &str) -> Result<()> {
        self.record("deploy_api", api_id)?;
        self.state
            .lock()
            .unwrap()
            .deployed
            .insert((group.id.clone(), api_id.to_string()));
        Ok(())
    }

    async fn abolish_api(&self, group: &str, api_id: &str) -> Result<()> {
        self.record("abolish_api", api_id)?;
        self.state
            .lock()
            .unwrap()
            .deployed
            .remove(&(group.to_string(), api_id.to_string()));
        Ok(())
    }

    async fn get_trigger(
        &self,
        service: &str,
        function: &str,
        name: &str,
    ) -> Result<Option<RemoteTrigger>> {
        self.record("get_trigger", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .triggers
            .get(&(service.to_string(), function.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_trigger(&self, spec: &TriggerSpec, role_arn: &str) -> Result<RemoteTrigger> {
        self.record("create_trigger", &spec.name)?;
        assert!(!role_arn.is_empty(), "trigger created without a role arn");
        let remote = RemoteTrigger {
            name: spec.name.clone(),
        };
        self.state.lock().unwrap().triggers.insert(
            (
                spec.service.clone(),
                spec.function.clone(),
                spec.name.clone(),
            ),
            remote.clone(),
        );
        Ok(remote)
    }

    async fn update_trigger(&self, spec: &TriggerSpec, _role_arn: &str) -> Result<RemoteTrigger> {
        self.record("update_trigger", &spec.name)?;
        let key = (
            spec.service.clone(),
            spec.function.clone(),
            spec.name.clone(),
        );
        let state = self.state.lock().unwrap();
        state
            .triggers
            .get(&key)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(spec.name.clone()))
    }

    async fn delete_trigger(&self, service: &str, function: &str, name: &str) -> Result<()> {
        self.record("delete_trigger", name)?;
        self.state.lock().unwrap().triggers.remove(&(
            service.to_string(),
            function.to_string(),
            name.to_string(),
        ));
        Ok(())
    }

    async fn list_triggers(&self, service: &str, function: &str) -> Result<Vec<RemoteTrigger>> {
        self.record("list_triggers", function)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .triggers
            .iter()
            .filter(|((svc, func, _), _)| svc == service && func == function)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn invoke_function(
        &self,
        _service: &str,
        function: &str,
        _payload: &[u8],
    ) -> Result<Vec<u8>> {
        self.record("invoke_function", function)?;
        Ok(b"ok".to_vec())
    }

    async fn fetch_logs(
        &self,
        _project: &str,
        _store: &str,
        _function: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<LogLine>> {
        self.record("fetch_logs", "")?;
        Ok(Vec::new())
    }
}
