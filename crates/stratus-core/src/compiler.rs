//! Resource graph compiler
//!
//! Turns a [`Manifest`] into the create/update [`GraphPair`]. Logical ids
//! and physical names are pure functions of service name + stage, so
//! compiling the same manifest twice yields identical identifiers. That
//! determinism is what makes reconciliation idempotent across runs.

use crate::error::{CoreError, Result};
use crate::graph::{GraphPair, LogicalGraph};
use crate::model::{Event, FunctionDef, Manifest};
use chrono::{DateTime, Utc};
use serde_json::json;
use stratus_cloud::{
    ApiGroupSpec, ApiSpec, BucketSpec, FunctionSpec, LogIndexSpec, LogProjectSpec, LogStoreSpec,
    ObjectSpec, PolicyKind, PolicySpec, Resource, RoleSpec, ServiceSpec, StorageEventSource,
    TriggerSpec,
};

/// System policy every invoke role needs for HTTP routes
pub const API_INVOKE_POLICY: &str = "ApiGatewayInvocationAccess";
/// System policy granting storage event sources function-invoke access
pub const STORAGE_INVOKE_POLICY: &str = "StorageEventAccess";

/// Deterministic naming for one service + stage
pub struct Naming<'a> {
    manifest: &'a Manifest,
    scope: String,
}

impl<'a> Naming<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        let scope = manifest.scope();
        Self { manifest, scope }
    }

    pub fn logical_id(&self, suffix: &str) -> String {
        format!("{}-{}", self.scope, suffix)
    }

    pub fn service_name(&self) -> String {
        self.scope.clone()
    }

    pub fn bucket_name(&self) -> String {
        format!("{}-artifacts", self.scope)
    }

    pub fn log_project_name(&self) -> String {
        format!("{}-logs", self.scope)
    }

    pub fn log_store_name(&self) -> String {
        "function-logs".to_string()
    }

    pub fn exec_role_name(&self) -> String {
        format!("{}-exec-role", self.scope)
    }

    pub fn log_policy_name(&self) -> String {
        format!("{}-log-write", self.scope)
    }

    pub fn invoke_role_name(&self) -> String {
        format!("{}-invoke-role", self.scope)
    }

    /// API gateway group names reject dashes
    pub fn api_group_name(&self) -> String {
        format!("{}_api", self.scope.replace('-', "_"))
    }

    pub fn api_name(&self, function: &str, method: &str) -> String {
        format!(
            "{}_{}_{}",
            self.scope.replace('-', "_"),
            function,
            method.to_lowercase()
        )
    }

    pub fn trigger_name(&self, function: &str, bucket: &str) -> String {
        format!("{}-{}-{}", self.scope, function, bucket)
    }

    /// Object key under a per-deployment timestamp directory
    pub fn artifact_key(&self, now: DateTime<Utc>, file_name: &str) -> String {
        format!(
            "artifacts/{}/{}/{}",
            self.scope,
            now.format("%Y%m%d%H%M%S"),
            file_name
        )
    }

    fn region(&self) -> &str {
        &self.manifest.provider.region
    }
}

/// Compile the manifest into its create/update graph pair.
pub fn compile(manifest: &Manifest) -> Result<GraphPair> {
    compile_at(manifest, Utc::now())
}

/// Compile with an explicit timestamp for the artifact prefix. `compile`
/// passes the current time; tests pass a fixed one.
pub fn compile_at(manifest: &Manifest, now: DateTime<Utc>) -> Result<GraphPair> {
    // Reject unsupported event types before anything else runs. This is the
    // compile-time validation gate: no graph, no provider calls.
    for (name, function) in &manifest.functions {
        for event in &function.events {
            if let Event::Other(_) = event {
                return Err(CoreError::UnsupportedEvent {
                    function: name.clone(),
                    event: event.type_name(),
                });
            }
        }
    }

    let naming = Naming::new(manifest);
    let pair = GraphPair {
        create: compile_create_graph(manifest, &naming),
        update: compile_update_graph(manifest, &naming, now)?,
    };
    pair.validate()?;
    tracing::debug!(
        create = pair.create.len(),
        update = pair.update.len(),
        "compiled resource graphs"
    );
    Ok(pair)
}

/// Bootstrap resources: log pipeline, exec role, service, bucket.
fn compile_create_graph(manifest: &Manifest, naming: &Naming) -> LogicalGraph {
    let mut graph = LogicalGraph::new();

    let project = naming.log_project_name();
    let store = naming.log_store_name();

    graph.insert(
        naming.logical_id("log-project"),
        Resource::LogProject(LogProjectSpec {
            name: project.clone(),
            description: Some(format!("logs for {}", naming.service_name())),
        }),
    );
    graph.insert(
        naming.logical_id("log-store"),
        Resource::LogStore(LogStoreSpec {
            project: project.clone(),
            name: store.clone(),
            ttl_days: 7,
            shard_count: 1,
        }),
    );
    graph.insert(
        naming.logical_id("log-index"),
        Resource::LogIndex(LogIndexSpec {
            project: project.clone(),
            store: store.clone(),
        }),
    );

    // The exec role always gets log-write access, merged with whatever
    // custom policies the manifest declares so those survive compilation.
    let log_policy = PolicySpec {
        name: naming.log_policy_name(),
        kind: PolicyKind::Custom,
        document: Some(json!({
            "Version": "1",
            "Statement": [{
                "Effect": "Allow",
                "Action": ["log:PostLogStoreLogs"],
                "Resource": format!("acs:log:*:*:project/{}/logstore/{}", project, store),
            }],
        })),
    };
    let mut policies = manifest.provider.exec_policies.clone();
    if !policies.iter().any(|p| p.name == log_policy.name) {
        policies.push(log_policy);
    }
    graph.insert(
        naming.logical_id("exec-role"),
        Resource::Role(RoleSpec {
            name: naming.exec_role_name(),
            assume_role_policy: assume_role_document("compute.cloud"),
            policies,
        }),
    );

    graph.insert(
        naming.logical_id("service"),
        Resource::Service(ServiceSpec {
            name: naming.service_name(),
            description: Some(format!("stage {} of {}", manifest.stage, manifest.service)),
            log_project: project,
            log_store: store,
        }),
    );
    graph.insert(
        naming.logical_id("bucket"),
        Resource::Bucket(BucketSpec {
            name: naming.bucket_name(),
            region: naming.region().to_string(),
        }),
    );

    graph
}

/// Per-deploy resources: artifact object, functions, invoke role, API
/// group + routes, triggers.
fn compile_update_graph(
    manifest: &Manifest,
    naming: &Naming,
    now: DateTime<Utc>,
) -> Result<LogicalGraph> {
    let mut graph = LogicalGraph::new();
    let bucket = naming.bucket_name();
    let service = naming.service_name();

    let artifact_key = match &manifest.package.artifact {
        Some(path) => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    CoreError::InvalidManifest(format!(
                        "package.artifact has no file name: {}",
                        path.display()
                    ))
                })?;
            let key = naming.artifact_key(now, file_name);
            graph.insert(
                naming.logical_id("artifact"),
                Resource::Object(ObjectSpec {
                    bucket: bucket.clone(),
                    key: key.clone(),
                    source: path.clone(),
                }),
            );
            key
        }
        None => String::new(),
    };

    for (name, function) in &manifest.functions {
        graph.insert(
            naming.logical_id(&format!("function-{}", name)),
            Resource::Function(function_spec(
                manifest,
                naming,
                name,
                function,
                &bucket,
                &artifact_key,
            )),
        );
    }

    let invoke_role_id = naming.logical_id("invoke-role");
    let group_id = naming.logical_id("api-group");

    for (name, function) in &manifest.functions {
        for event in &function.events {
            match event {
                Event::Http(http) => {
                    // The first http event bootstraps the invoke role and
                    // the shared API group.
                    ensure_invoke_role(&mut graph, &invoke_role_id, naming, API_INVOKE_POLICY);
                    if !graph.contains(&group_id) {
                        graph.insert(
                            group_id.clone(),
                            Resource::ApiGroup(ApiGroupSpec {
                                name: naming.api_group_name(),
                                description: Some(format!("api group for {}", service)),
                            }),
                        );
                    }
                    graph.insert(
                        naming.logical_id(&format!(
                            "api-{}-{}",
                            name,
                            http.method.to_lowercase()
                        )),
                        Resource::Api(ApiSpec {
                            name: naming.api_name(name, &http.method),
                            group: naming.api_group_name(),
                            method: http.method.to_uppercase(),
                            path: http.path.clone(),
                            role: naming.invoke_role_name(),
                            service: service.clone(),
                            function: name.clone(),
                        }),
                    );
                }
                Event::Storage(storage) => {
                    // The first storage event grants the invoke role access
                    // to the event source.
                    ensure_invoke_role(&mut graph, &invoke_role_id, naming, STORAGE_INVOKE_POLICY);
                    graph.insert(
                        naming.logical_id(&format!("trigger-{}-{}", name, storage.bucket)),
                        Resource::Trigger(TriggerSpec {
                            name: naming.trigger_name(name, &storage.bucket),
                            service: service.clone(),
                            function: name.clone(),
                            role: naming.invoke_role_name(),
                            source: StorageEventSource {
                                bucket: storage.bucket.clone(),
                                events: storage.events.clone(),
                                prefix: storage.prefix.clone(),
                            },
                        }),
                    );
                }
                Event::Other(_) => unreachable!("rejected before compilation"),
            }
        }
    }

    Ok(graph)
}

fn function_spec(
    manifest: &Manifest,
    naming: &Naming,
    name: &str,
    function: &FunctionDef,
    bucket: &str,
    artifact_key: &str,
) -> FunctionSpec {
    let provider = &manifest.provider;
    FunctionSpec {
        name: name.to_string(),
        service: naming.service_name(),
        handler: function.handler.clone(),
        runtime: provider.runtime.clone(),
        // Function-level values win over provider defaults.
        memory_size: function.memory_size.unwrap_or(provider.memory_size),
        timeout: function.timeout.unwrap_or(provider.timeout),
        code_bucket: bucket.to_string(),
        code_key: artifact_key.to_string(),
    }
}

/// Insert the invoke role if missing, or merge `policy` into the existing
/// spec so a role shared by http and storage events carries both grants.
fn ensure_invoke_role(graph: &mut LogicalGraph, logical_id: &str, naming: &Naming, policy: &str) {
    let policy = PolicySpec {
        name: policy.to_string(),
        kind: PolicyKind::System,
        document: None,
    };
    match graph.get_mut(logical_id) {
        Some(Resource::Role(role)) => {
            if !role.policies.iter().any(|p| p.name == policy.name) {
                role.policies.push(policy);
            }
        }
        _ => {
            graph.insert(
                logical_id.to_string(),
                Resource::Role(RoleSpec {
                    name: naming.invoke_role_name(),
                    assume_role_policy: assume_role_document("apigateway.cloud"),
                    policies: vec![policy],
                }),
            );
        }
    }
}

fn assume_role_document(principal: &str) -> serde_json::Value {
    json!({
        "Version": "1",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": [principal] },
        }],
    })
}
